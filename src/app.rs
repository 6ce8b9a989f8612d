use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;

use crate::config::Config;
use crate::db::Repository;
use crate::error::Result;
use crate::facebook::{GraphApi, InsightsCollector, TokenManager};
use crate::feed::FeedFetcher;
use crate::report::Reporter;
use crate::services::SlackClient;

/// What a successful run did, for the final log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub articles_collected: usize,
    pub rows_reported: usize,
}

/// The whole job: token, feed, insights, report. Each stage runs once and
/// the first error stops the run.
pub struct Pipeline {
    feed_url: String,
    repository: Repository,
    tokens: TokenManager,
    fetcher: FeedFetcher,
    collector: InsightsCollector,
    reporter: Reporter,
}

impl Pipeline {
    pub async fn new(config: &Config) -> Result<Self> {
        let client = build_http_client()?;
        let repository = Repository::new(&config.db_path).await?;
        let api = GraphApi::from_config(config);

        let slack = SlackClient::new(
            client.clone(),
            &config.slack_api_url,
            config.slack_api_key.clone(),
        );

        Ok(Self {
            feed_url: config.feed_url.clone(),
            repository,
            tokens: TokenManager::new(client.clone(), api.clone(), config),
            fetcher: FeedFetcher::new(client.clone()),
            collector: InsightsCollector::new(client, api),
            reporter: Reporter::new(
                slack,
                PathBuf::from(&config.csv_path),
                config.slack_channels.clone(),
            ),
        })
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let token = self.tokens.get_page_access_token(&self.repository).await?;
        let items = self.fetcher.fetch_feed(&self.feed_url).await?;
        let articles_collected = self
            .collector
            .collect_insights(&items, &token, &self.repository)
            .await?;
        let rows_reported = self.reporter.publish_report(&self.repository).await?;

        Ok(RunSummary {
            articles_collected,
            rows_reported,
        })
    }
}

fn build_http_client() -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(concat!("fbia-insights/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}
