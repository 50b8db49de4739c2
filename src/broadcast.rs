use anyhow::Result;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, LinkPreviewOptions, ParseMode};
use tracing::warn;

/// Delivery seam: one message to one chat.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn deliver(&self, chat_id: i64, text: &str) -> Result<()>;
}

/// Sends digests through the Telegram Bot API.
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn deliver(&self, chat_id: i64, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .parse_mode(ParseMode::Markdown)
            .link_preview_options(LinkPreviewOptions {
                is_disabled: true,
                url: None,
                prefer_small_media: false,
                prefer_large_media: false,
                show_above_text: false,
            })
            .await?;
        Ok(())
    }
}

/// Fan a message out to every chat. A failed chat is logged and skipped;
/// the rest are still attempted. Returns how many deliveries succeeded.
pub async fn broadcast(transport: &dyn Transport, chats: &[i64], text: &str) -> usize {
    let mut delivered = 0;
    for &chat_id in chats {
        match transport.deliver(chat_id, text).await {
            Ok(()) => delivered += 1,
            Err(e) => warn!(chat_id, error = format!("{:#}", e), "Failed to deliver digest"),
        }
    }
    delivered
}
