use serde::{Deserialize, Serialize};

/// One `<item>` of the source feed. Parsed fresh on every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    pub guid: String,
    pub title: String,
    pub pub_date: String,
    pub author: String,
    pub link: String,
}
