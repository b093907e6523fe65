//! Telegram notifier

use async_trait::async_trait;
use pe_engine::notify::Notifier;
use pe_engine::EngineError;
use teloxide::prelude::*;
use tracing::debug;

/// Sends every notification to one chat
pub struct TelegramNotifier {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramNotifier {
    pub fn new(bot_token: &str, chat_id: i64) -> Self {
        Self {
            bot: Bot::new(bot_token),
            chat_id: ChatId(chat_id),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, text: &str) -> pe_engine::Result<()> {
        self.bot
            .send_message(self.chat_id, text)
            .await
            .map_err(|e| EngineError::Notification(e.to_string()))?;
        debug!("✅ Sent to chat {}", self.chat_id.0);
        Ok(())
    }
}
