use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// RSS feed Facebook reads the Instant Articles from.
    #[serde(default)]
    pub feed_url: String,

    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// Short-lived user token with `read_insights`, only needed until a
    /// page token has been cached.
    #[serde(default)]
    pub user_token: String,

    #[serde(default = "default_page_id")]
    pub page_id: String,

    #[serde(default = "default_graph_api_url")]
    pub graph_api_url: String,
    #[serde(default = "default_graph_api_version")]
    pub graph_api_version: String,

    #[serde(default)]
    pub slack_api_key: String,
    #[serde(default = "default_slack_api_url")]
    pub slack_api_url: String,
    #[serde(default = "default_slack_channels")]
    pub slack_channels: Vec<String>,

    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default = "default_csv_path")]
    pub csv_path: String,
}

fn default_page_id() -> String {
    "dallasmorningnews".to_string()
}

fn default_graph_api_url() -> String {
    "https://graph.facebook.com".to_string()
}

fn default_graph_api_version() -> String {
    "v2.6".to_string()
}

fn default_slack_api_url() -> String {
    "https://slack.com/api".to_string()
}

fn default_slack_channels() -> Vec<String> {
    vec!["C0KF7RARL".to_string()]
}

fn default_db_path() -> String {
    "fbia.sqlite".to_string()
}

fn default_csv_path() -> String {
    "fbia.csv".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            user_token: String::new(),
            page_id: default_page_id(),
            graph_api_url: default_graph_api_url(),
            graph_api_version: default_graph_api_version(),
            slack_api_key: String::new(),
            slack_api_url: default_slack_api_url(),
            slack_channels: default_slack_channels(),
            db_path: default_db_path(),
            csv_path: default_csv_path(),
        }
    }
}

impl Config {
    /// Loads `.env`, then the optional TOML file, then environment overrides.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_path = Self::config_path();
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("FBIA_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fbia-insights")
            .join("config.toml")
    }

    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let overrides: [(&str, &mut String); 8] = [
            ("FEED_URL", &mut self.feed_url),
            ("FB_CLIENT_ID", &mut self.client_id),
            ("FB_CLIENT_SECRET", &mut self.client_secret),
            ("FB_USER_TOKEN", &mut self.user_token),
            ("FB_PAGE_ID", &mut self.page_id),
            ("SLACK_API_KEY", &mut self.slack_api_key),
            ("FBIA_DB_PATH", &mut self.db_path),
            ("FBIA_CSV_PATH", &mut self.csv_path),
        ];
        for (key, field) in overrides {
            if let Some(value) = lookup(key) {
                *field = value;
            }
        }

        if let Some(channels) = lookup("SLACK_CHANNELS") {
            self.slack_channels = channels
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
    }

    // Credentials are left for the remote services to reject.
    fn validate(&self) -> Result<()> {
        if self.feed_url.trim().is_empty() {
            return Err(AppError::Config("FEED_URL is not set".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_point_at_live_services() {
        let config = Config::default();
        assert_eq!(config.graph_api_url, "https://graph.facebook.com");
        assert_eq!(config.graph_api_version, "v2.6");
        assert_eq!(config.slack_channels, vec!["C0KF7RARL".to_string()]);
        assert_eq!(config.db_path, "fbia.sqlite");
        assert_eq!(config.csv_path, "fbia.csv");
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config: Config = toml::from_str(
            r#"
            feed_url = "http://file/feed.xml"
            page_id = "somepage"
            "#,
        )
        .unwrap();

        let env: HashMap<&str, &str> = [
            ("FEED_URL", "http://env/feed.xml"),
            ("SLACK_CHANNELS", "C1, C2,,"),
            ("FB_USER_TOKEN", "seed"),
        ]
        .into_iter()
        .collect();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.feed_url, "http://env/feed.xml");
        assert_eq!(config.page_id, "somepage");
        assert_eq!(config.user_token, "seed");
        assert_eq!(config.slack_channels, vec!["C1", "C2"]);
    }

    #[test]
    fn missing_feed_url_is_rejected() {
        let config = Config::default();
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn missing_credentials_are_not_rejected() {
        let config = Config {
            feed_url: "http://x/feed".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }
}
