use serde::{Deserialize, Serialize};

use super::FeedItem;

/// Cached metrics for a single article, keyed by the feed guid.
///
/// The serde names double as the CSV header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightRow {
    pub id: String,
    #[serde(rename = "Headline")]
    pub headline: String,
    #[serde(rename = "Publication date")]
    pub publication_date: String,
    #[serde(rename = "Author")]
    pub author: String,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Total views")]
    pub total_views: i64,
    #[serde(rename = "Average view duration")]
    pub average_view_duration: i64,
    #[serde(rename = "Average scroll depth")]
    pub average_scroll_depth: i64,
}

impl InsightRow {
    pub fn from_item(
        item: &FeedItem,
        total_views: i64,
        average_view_duration: i64,
        average_scroll_depth: i64,
    ) -> Self {
        Self {
            id: item.guid.clone(),
            headline: item.title.clone(),
            publication_date: item.pub_date.clone(),
            author: item.author.clone(),
            url: item.link.clone(),
            total_views,
            average_view_duration,
            average_scroll_depth,
        }
    }
}
