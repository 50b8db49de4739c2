mod bot;
mod broadcast;
mod config;
mod cycle;
mod digest;
mod feeds;
mod scheduler;
mod store;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use teloxide::Bot;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::broadcast::TelegramTransport;
use crate::config::Config;
use crate::cycle::Poster;
use crate::feeds::FeedFetcher;
use crate::scheduler::Scheduler;
use crate::store::Store;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,newsbot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Configuration loaded successfully");
    info!("  Feeds: {}", config.digest.feeds.len());
    info!(
        "  Post times: {:?} ({})",
        config.digest.post_times, config.digest.timezone
    );
    info!("  Database: {}", config.storage.database_path.display());

    let store = Store::open(&config.storage.database_path)?;
    let bot = Bot::new(&config.telegram.bot_token);

    let fetcher = Arc::new(FeedFetcher::new(config.digest.items_per_feed)?);
    let transport = Arc::new(TelegramTransport::new(bot.clone()));
    let poster = Arc::new(Poster::new(
        store.clone(),
        fetcher,
        transport,
        config.digest.feeds.clone(),
    ));

    // Schedule the daily digest cycles
    let tz = config.posting_timezone()?;
    let sched = Scheduler::new().await?;
    for time in &config.digest.post_times {
        let cron = scheduler::post_time_to_cron(time)?;
        let poster = poster.clone();
        sched
            .add_cron_job(&cron, tz, &format!("digest-{}", time), move || {
                let poster = poster.clone();
                Box::pin(async move {
                    if let Err(e) = poster.run_cycle().await {
                        error!("Scheduled cycle failed: {:#}", e);
                    }
                })
            })
            .await?;
    }
    sched.start().await?;

    // Run the Telegram bot
    info!("Bot is starting...");
    bot::run(bot, poster, store).await?;

    Ok(())
}
