use feed_rs::model::Entry;
use feed_rs::parser;
use reqwest::Client;

use crate::error::Result;
use crate::models::FeedItem;

/// Downloads the feed Facebook builds Instant Articles from. Its links are
/// the canonical article URLs the insights queries are keyed on.
pub struct FeedFetcher {
    client: Client,
}

impl FeedFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn fetch_feed(&self, url: &str) -> Result<Vec<FeedItem>> {
        tracing::info!("Getting article URLs from RSS feed \"{}\"", url);
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!("Failed to fetch feed: HTTP {}", response.status()).into());
        }

        let bytes = response.bytes().await?;
        let items = parse_feed(&bytes)?;
        tracing::debug!("Parsed {} items from {}", items.len(), url);
        Ok(items)
    }
}

pub(crate) fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedItem>> {
    let feed = parser::parse(bytes)?;
    let mut raw_dates = raw_pub_dates(bytes, feed.entries.len()).into_iter();

    Ok(feed
        .entries
        .into_iter()
        .map(|entry| item_from_entry(entry, raw_dates.next().flatten()))
        .collect())
}

/// `<pubDate>` text as the feed wrote it, one slot per item. feed-rs only
/// keeps the parsed UTC date, which drops the offset and anything it could
/// not parse. Empty when the body is not RSS or the item counts disagree.
fn raw_pub_dates(bytes: &[u8], expected: usize) -> Vec<Option<String>> {
    match rss::Channel::read_from(bytes) {
        Ok(channel) if channel.items().len() == expected => channel
            .items()
            .iter()
            .map(|item| {
                item.pub_date()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn item_from_entry(entry: Entry, raw_pub_date: Option<String>) -> FeedItem {
    let pub_date = raw_pub_date.unwrap_or_else(|| {
        entry
            .published
            .or(entry.updated)
            .map(|dt| dt.to_rfc2822())
            .unwrap_or_default()
    });

    FeedItem {
        guid: entry.id,
        title: entry.title.map(|t| t.content).unwrap_or_default(),
        pub_date,
        author: entry
            .authors
            .first()
            .map(|a| a.name.clone())
            .unwrap_or_default(),
        link: entry
            .links
            .first()
            .map(|l| l.href.clone())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>News</title>
    <link>http://x/</link>
    <description>Instant Articles</description>
    <item>
      <guid>A1</guid>
      <title>First story</title>
      <pubDate>Mon, 04 Apr 2016 10:00:00 +0000</pubDate>
      <author>desk@example.com</author>
      <link>http://x/1</link>
    </item>
    <item>
      <guid>B2</guid>
      <title>Second story</title>
      <link>http://x/2</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn maps_rss_items_in_feed_order() {
        let items = parse_feed(FEED.as_bytes()).unwrap();
        assert_eq!(items.len(), 2);

        let first = &items[0];
        assert_eq!(first.guid, "A1");
        assert_eq!(first.title, "First story");
        assert_eq!(first.link, "http://x/1");
        assert_eq!(first.author, "desk@example.com");
        assert_eq!(first.pub_date, "Mon, 04 Apr 2016 10:00:00 +0000");

        let second = &items[1];
        assert_eq!(second.guid, "B2");
        assert_eq!(second.author, "");
        assert_eq!(second.pub_date, "");
    }

    #[test]
    fn keeps_pub_date_as_written() {
        let feed = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>News</title><link>http://x/</link><description>d</description>
<item><guid>A1</guid><title>Offset</title><link>http://x/1</link><pubDate>Mon, 04 Apr 2016 05:00:00 -0500</pubDate></item>
<item><guid>B2</guid><title>Free form</title><link>http://x/2</link><pubDate>April 4th 2016</pubDate></item>
</channel></rss>"#;

        let items = parse_feed(feed.as_bytes()).unwrap();
        assert_eq!(items[0].pub_date, "Mon, 04 Apr 2016 05:00:00 -0500");
        assert_eq!(items[1].pub_date, "April 4th 2016");
    }

    #[test]
    fn atom_entries_fall_back_to_parsed_date() {
        let feed = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>News</title>
  <id>urn:news</id>
  <updated>2016-04-04T10:00:00Z</updated>
  <entry>
    <id>urn:a1</id>
    <title>Atom story</title>
    <link href="http://x/1"/>
    <published>2016-04-04T10:00:00Z</published>
    <updated>2016-04-04T10:00:00Z</updated>
  </entry>
</feed>"#;

        let items = parse_feed(feed.as_bytes()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].guid, "urn:a1");
        assert!(items[0].pub_date.contains("Apr 2016 10:00:00"));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(parse_feed(b"not a feed").is_err());
    }

    #[tokio::test]
    async fn fetches_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed.xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string(FEED))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = FeedFetcher::new(Client::new());
        let items = fetcher
            .fetch_feed(&format!("{}/feed.xml", server.uri()))
            .await
            .unwrap();
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn http_failure_is_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let fetcher = FeedFetcher::new(Client::new());
        assert!(fetcher.fetch_feed(&server.uri()).await.is_err());
    }
}
