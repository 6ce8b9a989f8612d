//! Facebook Graph API access: page token management and Instant Articles
//! insights.

pub mod insights;
mod token;

pub use insights::InsightsCollector;
pub use token::{TokenManager, PAGE_TOKEN_KIND};

use url::Url;

use crate::config::Config;

/// Root and version of the Graph API every request is built against.
#[derive(Debug, Clone)]
pub struct GraphApi {
    base_url: String,
    version: String,
}

impl GraphApi {
    pub fn new(base_url: &str, version: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            version: version.trim_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.graph_api_url, &config.graph_api_version)
    }

    /// Unversioned endpoint, e.g. `oauth/access_token`.
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Versioned node URL. An empty node addresses the root, which takes
    /// the object id as a query parameter.
    fn node(&self, node: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.version, node)
    }
}

/// Request URL with the access token masked, for log lines.
fn redacted(url: &Url) -> String {
    let mut url = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "access_token" || k == "client_secret" || k == "fb_exchange_token" {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    if !pairs.is_empty() {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_versioned_and_plain_urls() {
        let api = GraphApi::new("http://127.0.0.1:9000/", "/v2.6/");
        assert_eq!(api.endpoint("oauth/access_token"), "http://127.0.0.1:9000/oauth/access_token");
        assert_eq!(api.node("somepage/"), "http://127.0.0.1:9000/v2.6/somepage/");
        assert_eq!(api.node(""), "http://127.0.0.1:9000/v2.6/");
    }

    #[test]
    fn masks_secrets_in_logged_urls() {
        let url = Url::parse("https://graph.facebook.com/v2.6/?id=http%3A%2F%2Fx%2F1&access_token=secret").unwrap();
        let logged = redacted(&url);
        assert!(!logged.contains("secret"));
        assert!(logged.contains("access_token=***"));
        assert!(logged.contains("id=http"));
    }
}
