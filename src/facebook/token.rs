use reqwest::Client;
use serde::Deserialize;

use crate::config::Config;
use crate::db::Repository;
use crate::error::{AppError, Result};

use super::{redacted, GraphApi};

/// Credential kind the page token is cached under.
pub const PAGE_TOKEN_KIND: &str = "page_token";

#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: Option<String>,
}

/// Hands out a page access token, exchanging the configured user token
/// only when none has been cached yet. Page tokens derived from a
/// long-lived user token do not expire, so a cached one is never refreshed.
pub struct TokenManager {
    client: Client,
    api: GraphApi,
    page_id: String,
    client_id: String,
    client_secret: String,
    user_token: String,
}

impl TokenManager {
    pub fn new(client: Client, api: GraphApi, config: &Config) -> Self {
        Self {
            client,
            api,
            page_id: config.page_id.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            user_token: config.user_token.clone(),
        }
    }

    pub async fn get_page_access_token(&self, repo: &Repository) -> Result<String> {
        tracing::info!("Getting a Facebook page access token");
        if let Some(token) = repo.get_credential(PAGE_TOKEN_KIND).await? {
            return Ok(token);
        }

        tracing::info!("Fetching a new Facebook page access token");
        let user_token = self.get_long_lived_user_token().await?;

        let response = self
            .client
            .get(self.api.node(&format!("{}/", self.page_id)))
            .query(&[("fields", "access_token"), ("access_token", user_token.as_str())])
            .send()
            .await?;
        let url = redacted(response.url());
        let body = response.text().await?;

        let page_token = serde_json::from_str::<AccessTokenResponse>(&body)
            .ok()
            .and_then(|r| r.access_token)
            .filter(|t| !t.is_empty());

        match page_token {
            Some(token) => {
                repo.save_credential(PAGE_TOKEN_KIND, &token).await?;
                Ok(token)
            }
            None => {
                tracing::debug!("Failed to fetch a page access token from \"{}\". Response: \"{}\"", url, body);
                Err(AppError::TokenExchange { stage: "page", body })
            }
        }
    }

    /// Swaps the short-lived user token for a long-lived one.
    async fn get_long_lived_user_token(&self) -> Result<String> {
        tracing::info!("Exchanging the provided user token for a long-lived token");
        let response = self
            .client
            .get(self.api.endpoint("oauth/access_token"))
            .query(&[
                ("grant_type", "fb_exchange_token"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("fb_exchange_token", self.user_token.as_str()),
            ])
            .send()
            .await?;
        let url = redacted(response.url());
        let body = response.text().await?;

        parse_user_token(&body).ok_or_else(|| {
            tracing::debug!("Failed to fetch a long-lived user token from \"{}\". Response: \"{}\"", url, body);
            AppError::TokenExchange { stage: "long-lived user", body }
        })
    }
}

/// Newer API versions answer with JSON, older ones with
/// `access_token=...&expires=...`.
fn parse_user_token(body: &str) -> Option<String> {
    let token = match serde_json::from_str::<AccessTokenResponse>(body) {
        Ok(response) => response.access_token,
        Err(_) => url::form_urlencoded::parse(body.trim().as_bytes())
            .find(|(key, _)| key == "access_token")
            .map(|(_, value)| value.into_owned()),
    };
    token.filter(|t| !t.is_empty())
}
