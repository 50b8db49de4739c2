use anyhow::{bail, Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub digest: DigestConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TelegramConfig {
    /// Bot API token. If empty, falls back to the BOT_TOKEN environment variable.
    #[serde(default)]
    pub bot_token: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DigestConfig {
    #[serde(default = "default_feeds")]
    pub feeds: Vec<String>,
    #[serde(default = "default_items_per_feed")]
    pub items_per_feed: usize,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Times of day ("HH:MM") at which a digest cycle fires.
    #[serde(default = "default_post_times")]
    pub post_times: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub database_path: PathBuf,
}

fn default_feeds() -> Vec<String> {
    vec![
        "https://feeds.feedburner.com/TheHackersNews".to_string(),
        "https://www.bleepingcomputer.com/feed/".to_string(),
        "https://krebsonsecurity.com/feed/".to_string(),
    ]
}

fn default_items_per_feed() -> usize {
    3
}

fn default_timezone() -> String {
    "Asia/Kolkata".to_string()
}

fn default_post_times() -> Vec<String> {
    vec![
        "09:00".to_string(),
        "14:00".to_string(),
        "21:00".to_string(),
    ]
}

fn default_db_path() -> PathBuf {
    PathBuf::from("news.db")
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            feeds: default_feeds(),
            items_per_feed: default_items_per_feed(),
            timezone: default_timezone(),
            post_times: default_post_times(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_db_path(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if config.telegram.bot_token.is_empty() {
            config.telegram.bot_token = std::env::var("BOT_TOKEN").unwrap_or_default();
        }
        if config.telegram.bot_token.is_empty() {
            bail!("No bot token: set [telegram] bot_token or the BOT_TOKEN environment variable");
        }
        if config.digest.feeds.is_empty() {
            bail!("No feed sources configured under [digest] feeds");
        }

        // Fail at startup rather than at the first scheduled fire.
        config.posting_timezone()?;
        for time in &config.digest.post_times {
            crate::scheduler::post_time_to_cron(time)
                .with_context(|| format!("Invalid post time: {}", time))?;
        }

        Ok(config)
    }

    pub fn posting_timezone(&self) -> Result<Tz> {
        self.digest
            .timezone
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("Invalid timezone '{}': {}", self.digest.timezone, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.digest.feeds.len(), 3);
        assert_eq!(config.digest.items_per_feed, 3);
        assert_eq!(config.digest.timezone, "Asia/Kolkata");
        assert_eq!(config.digest.post_times, vec!["09:00", "14:00", "21:00"]);
        assert_eq!(config.storage.database_path, PathBuf::from("news.db"));
    }

    #[test]
    fn test_overrides() {
        let config: Config = toml::from_str(
            r#"
            [digest]
            feeds = ["https://example.com/feed.xml"]
            items_per_feed = 5
            timezone = "Europe/Berlin"

            [storage]
            database_path = "/tmp/other.db"
            "#,
        )
        .unwrap();
        assert_eq!(config.digest.feeds, vec!["https://example.com/feed.xml"]);
        assert_eq!(config.digest.items_per_feed, 5);
        assert_eq!(config.posting_timezone().unwrap(), chrono_tz::Europe::Berlin);
    }

    #[test]
    fn test_bad_timezone_rejected() {
        let config: Config = toml::from_str("[digest]\ntimezone = \"Mars/Olympus\"\n").unwrap();
        assert!(config.posting_timezone().is_err());
    }
}
