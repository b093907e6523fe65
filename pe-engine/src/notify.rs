//! Outbound notifications
//!
//! Delivery is best-effort: a failed notification must never abort a
//! trading decision, so the engine only sends through [`notify_best_effort`].

use async_trait::async_trait;
use tracing::{info, warn};

use crate::Result;

/// Messaging sink (e.g., a Telegram chat).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, text: &str) -> Result<()>;
}

/// Send `text`, logging and swallowing any failure.
pub async fn notify_best_effort(notifier: &dyn Notifier, text: &str) {
    if let Err(e) = notifier.notify(text).await {
        warn!("⚠️ Notification dropped ({}): {}", e, text);
    }
}

/// Writes notifications to the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, text: &str) -> Result<()> {
        info!("📣 {}", text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineError;

    struct Broken;

    #[async_trait]
    impl Notifier for Broken {
        async fn notify(&self, _text: &str) -> Result<()> {
            Err(EngineError::Notification("chat not found".to_string()))
        }
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        notify_best_effort(&Broken, "hello").await;
        notify_best_effort(&LogNotifier, "hello").await;
    }
}
