use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

/// One entry pulled from a feed. The link doubles as the dedup key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
}

/// A feed source that could not be fetched or parsed this cycle.
#[derive(Debug, Clone)]
pub struct FetchFailure {
    pub source: String,
    pub reason: String,
}

/// Result of polling every configured source: items in source-list order,
/// plus one failure per source that yielded nothing.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub items: Vec<FeedItem>,
    pub failures: Vec<FetchFailure>,
}

#[async_trait]
pub trait FetchFeeds: Send + Sync {
    async fn fetch_all(&self, sources: &[String]) -> FetchOutcome;
}

/// Retrieves feeds over HTTP and parses them with feed-rs.
pub struct FeedFetcher {
    client: Client,
    items_per_feed: usize,
}

impl FeedFetcher {
    pub fn new(items_per_feed: usize) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("newsbot/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            items_per_feed,
        })
    }

    async fn fetch_one(&self, url: &str) -> Result<Vec<FeedItem>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request failed: {}", url))?
            .error_for_status()
            .with_context(|| format!("Bad status from: {}", url))?;
        let body = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read body from: {}", url))?;
        parse_items(&body, self.items_per_feed)
            .with_context(|| format!("Failed to parse feed: {}", url))
    }
}

#[async_trait]
impl FetchFeeds for FeedFetcher {
    /// Best-effort poll of every source. A source that fails contributes zero
    /// items and a recorded failure; the remaining sources are still fetched.
    async fn fetch_all(&self, sources: &[String]) -> FetchOutcome {
        let mut outcome = FetchOutcome::default();
        for url in sources {
            match self.fetch_one(url).await {
                Ok(items) => {
                    debug!("Fetched {} item(s) from {}", items.len(), url);
                    outcome.items.extend(items);
                }
                Err(e) => {
                    warn!(source = %url, error = format!("{:#}", e), "Feed fetch failed");
                    outcome.failures.push(FetchFailure {
                        source: url.clone(),
                        reason: format!("{:#}", e),
                    });
                }
            }
        }
        outcome
    }
}

/// Parse a feed document into at most `limit` items, in feed order.
/// Entries without a link are skipped; entries without a title keep a stub.
pub fn parse_items(bytes: &[u8], limit: usize) -> Result<Vec<FeedItem>> {
    let feed = feed_rs::parser::parse(bytes).context("Malformed feed document")?;

    let items = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let link = entry.links.first()?.href.clone();
            let title = entry
                .title
                .map(|t| t.content)
                .unwrap_or_else(|| "Untitled".to_string());
            Some(FeedItem { title, link })
        })
        .take(limit)
        .collect();

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rss_with_items(items: &[(&str, &str)]) -> String {
        let mut body = String::from(
            "<?xml version=\"1.0\"?><rss version=\"2.0\"><channel><title>Test</title>",
        );
        for (title, link) in items {
            body.push_str(&format!(
                "<item><title>{}</title><link>{}</link></item>",
                title, link
            ));
        }
        body.push_str("</channel></rss>");
        body
    }

    #[test]
    fn test_parse_preserves_feed_order() {
        let rss = rss_with_items(&[
            ("First", "https://example.com/1"),
            ("Second", "https://example.com/2"),
        ]);
        let items = parse_items(rss.as_bytes(), 3).unwrap();
        assert_eq!(
            items,
            vec![
                FeedItem {
                    title: "First".to_string(),
                    link: "https://example.com/1".to_string(),
                },
                FeedItem {
                    title: "Second".to_string(),
                    link: "https://example.com/2".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_caps_at_limit() {
        let rss = rss_with_items(&[
            ("One", "https://example.com/1"),
            ("Two", "https://example.com/2"),
            ("Three", "https://example.com/3"),
            ("Four", "https://example.com/4"),
        ]);
        let items = parse_items(rss.as_bytes(), 3).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[2].link, "https://example.com/3");
    }

    #[test]
    fn test_parse_skips_linkless_entries() {
        let rss = "<?xml version=\"1.0\"?><rss version=\"2.0\"><channel><title>T</title>\
                   <item><title>No link here</title></item>\
                   <item><title>Ok</title><link>https://example.com/ok</link></item>\
                   </channel></rss>";
        let items = parse_items(rss.as_bytes(), 3).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].link, "https://example.com/ok");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_items(b"not a feed at all", 3).is_err());
    }

    #[tokio::test]
    async fn test_fetch_all_records_failures() {
        let fetcher = FeedFetcher::new(3).unwrap();
        let sources = vec!["not-a-valid-url".to_string()];
        let outcome = fetcher.fetch_all(&sources).await;
        assert!(outcome.items.is_empty());
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].source, "not-a-valid-url");
    }
}
