use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::db::Repository;
use crate::error::{AppError, Result};
use crate::models::{FeedItem, InsightRow};

use super::{redacted, GraphApi};

pub const TOTAL_VIEWS: &str = "all_views";
pub const AVERAGE_VIEW_DURATION: &str = "all_view_durations_average";
pub const AVERAGE_SCROLL_DEPTH: &str = "all_scrolls_average";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    Week,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
        }
    }
}

/// Granularity and earliest available date of an insights metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricConfig {
    pub period: Period,
    /// `YYYY-MM-DD`
    pub since: &'static str,
}

const DEFAULT_METRIC: MetricConfig = MetricConfig {
    period: Period::Week,
    since: "2016-01-15",
};

const METRICS: &[(&str, MetricConfig)] = &[
    (
        TOTAL_VIEWS,
        MetricConfig {
            period: Period::Day,
            since: "2016-01-15",
        },
    ),
    (
        AVERAGE_VIEW_DURATION,
        MetricConfig {
            period: Period::Week,
            since: "2016-03-24",
        },
    ),
];

impl MetricConfig {
    pub fn for_metric(metric: &str) -> Self {
        METRICS
            .iter()
            .find(|(name, _)| *name == metric)
            .map(|(_, config)| *config)
            .unwrap_or(DEFAULT_METRIC)
    }

    /// Field expansion asking for the whole history of `metric`.
    pub fn query(&self, metric: &str) -> String {
        format!(
            "instant_article{{insights.metric({}).period({}).since({})}}",
            metric,
            self.period.as_str(),
            self.since
        )
    }
}

pub struct InsightsCollector {
    client: Client,
    api: GraphApi,
}

impl InsightsCollector {
    pub fn new(client: Client, api: GraphApi) -> Self {
        Self { client, api }
    }

    /// Sums every datapoint the API has for `metric` on the article.
    /// Articles without data for the metric count as 0.
    pub async fn get_metric_total(&self, article_url: &str, metric: &str, token: &str) -> Result<i64> {
        let fields = MetricConfig::for_metric(metric).query(metric);

        let response = self
            .client
            .get(self.api.node(""))
            .query(&[
                ("fields", fields.as_str()),
                ("id", article_url),
                ("access_token", token),
            ])
            .send()
            .await?;

        let url = redacted(response.url());
        let status = response.status();
        if status != StatusCode::OK {
            tracing::debug!("HTTP {} fetching \"{}\" from Facebook API", status, url);
            return Err(AppError::InsightsHttp {
                url,
                status: status.as_u16(),
            });
        }

        let body: Value = response.json().await?;
        let Some(datapoints) = body
            .pointer("/instant_article/insights/data")
            .and_then(Value::as_array)
        else {
            tracing::info!("No data for \"{}\" metric from \"{}\"", metric, url);
            return Ok(0);
        };

        datapoints.iter().try_fold(0i64, |total, datapoint| -> Result<i64> {
            let value = datapoint.get("value").ok_or_else(|| {
                AppError::MalformedResponse(format!("datapoint without value for \"{}\": {}", metric, datapoint))
            })?;
            total.checked_add(datapoint_value(value)?).ok_or_else(|| {
                AppError::MalformedResponse(format!("\"{}\" total overflows: {}", metric, datapoint))
            })
        })
    }

    pub async fn collect_article(&self, item: &FeedItem, token: &str) -> Result<InsightRow> {
        let views = self.get_metric_total(&item.link, TOTAL_VIEWS, token).await?;
        let duration = self.get_metric_total(&item.link, AVERAGE_VIEW_DURATION, token).await?;
        let scroll = self.get_metric_total(&item.link, AVERAGE_SCROLL_DEPTH, token).await?;
        Ok(InsightRow::from_item(item, views, duration, scroll))
    }

    /// Collects and upserts every feed item, in feed order. Returns the
    /// number of rows written.
    pub async fn collect_insights(&self, items: &[FeedItem], token: &str, repo: &Repository) -> Result<usize> {
        tracing::info!("Fetching insights from Facebook API");
        for item in items {
            tracing::info!("Getting data for instant article \"{}\"", item.title);
            let row = self.collect_article(item, token).await?;
            repo.upsert_insight(row).await?;
        }
        Ok(items.len())
    }
}

/// Datapoint values come back as strings or numbers depending on metric.
fn datapoint_value(value: &Value) -> Result<i64> {
    let parsed = match value {
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        _ => None,
    };
    match parsed {
        Some(n) if n >= 0 => Ok(n),
        _ => Err(AppError::MalformedResponse(format!("unexpected datapoint value {}", value))),
    }
}
