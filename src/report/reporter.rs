use std::path::PathBuf;

use chrono::{Local, NaiveDate};

use crate::db::Repository;
use crate::error::Result;
use crate::services::{SlackClient, SlackUpload};

use super::write_csv;

const INITIAL_COMMENT: &str =
    "Here are the latest :chart_with_upwards_trend: numbers for our Facebook Instant Articles.";

/// Freezes the insights table to CSV and shares it in Slack.
pub struct Reporter {
    slack: SlackClient,
    csv_path: PathBuf,
    channels: Vec<String>,
}

impl Reporter {
    pub fn new(slack: SlackClient, csv_path: PathBuf, channels: Vec<String>) -> Self {
        Self {
            slack,
            csv_path,
            channels,
        }
    }

    pub async fn publish_report(&self, repo: &Repository) -> Result<usize> {
        tracing::info!("Writing results to CSV");
        let rows = repo.all_insights().await?;
        write_csv(&self.csv_path, &rows)?;

        tracing::info!("Pushing insights to Slack");
        self.slack
            .upload_file(SlackUpload {
                path: &self.csv_path,
                channels: &self.channels,
                title: report_title(Local::now().date_naive()),
                initial_comment: INITIAL_COMMENT.to_string(),
            })
            .await?;

        Ok(rows.len())
    }
}

fn report_title(today: NaiveDate) -> String {
    format!("Facebook Insights report for {}", today.format("%b %d, %Y"))
}
