use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use tracing::{error, info, warn};

use crate::cycle::Poster;
use crate::store::Store;

/// Start the Telegram bot
pub async fn run(bot: Bot, poster: Arc<Poster>, store: Store) -> Result<()> {
    info!("Starting Telegram bot...");

    let handler = Update::filter_message()
        .branch(
            dptree::filter(|msg: Message| msg.text().map(is_postnow).unwrap_or(false))
                .endpoint(handle_postnow),
        )
        .branch(dptree::endpoint(track_chat));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![poster, store])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("bot"))
        .build()
        .dispatch()
        .await;

    Ok(())
}

/// Matches "/postnow" and the group form "/postnow@BotName".
fn is_postnow(text: &str) -> bool {
    let first = text.split_whitespace().next().unwrap_or("");
    first == "/postnow" || first.starts_with("/postnow@")
}

async fn handle_postnow(bot: Bot, msg: Message, poster: Arc<Poster>) -> ResponseResult<()> {
    info!("Manual /postnow from chat {}", msg.chat.id);

    match poster.run_cycle().await {
        Ok(report) => {
            info!(
                "Manual cycle: {} new item(s), {}/{} chat(s) reached",
                report.new_items, report.delivered, report.destinations
            );
            bot.send_message(msg.chat.id, "✅ News posted to all groups.")
                .await?;
        }
        Err(e) => {
            error!("Manual cycle failed: {:#}", e);
            bot.send_message(msg.chat.id, format!("Error: {}", e))
                .await?;
        }
    }

    Ok(())
}

/// Inbound observation hook: any message from a group chat registers that
/// chat as a broadcast destination.
async fn track_chat(msg: Message, store: Store) -> ResponseResult<()> {
    if msg.chat.is_group() || msg.chat.is_supergroup() {
        if let Err(e) = store.register_chat(msg.chat.id.0).await {
            error!("Failed to register chat {}: {:#}", msg.chat.id, e);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postnow_matching() {
        assert!(is_postnow("/postnow"));
        assert!(is_postnow("/postnow@SecurityNewsBot"));
        assert!(is_postnow("/postnow  trailing words"));
        assert!(!is_postnow("/postnowish"));
        assert!(!is_postnow("postnow"));
        assert!(!is_postnow("hello /postnow"));
    }
}
