//! Console outbound sink

use async_trait::async_trait;
use colored::Colorize;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use turnstile_application::{OutboundError, OutboundSink};
use turnstile_domain::ConversationKey;

/// Prints each outbound fragment as a chat line on stdout.
pub struct ConsoleSink {
    bot_name: String,
    color: bool,
    sent: AtomicU64,
}

impl ConsoleSink {
    pub fn new(bot_name: impl Into<String>) -> Self {
        Self {
            bot_name: bot_name.into(),
            color: true,
            sent: AtomicU64::new(0),
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Format one fragment line
    pub fn format_line(&self, target: &ConversationKey, text: &str) -> String {
        let speaker = format!("[{}] {}:", target, self.bot_name);
        if self.color {
            format!("{} {}", speaker.green().bold(), text)
        } else {
            format!("{} {}", speaker, text)
        }
    }
}

#[async_trait]
impl OutboundSink for ConsoleSink {
    async fn send(
        &self,
        target: &ConversationKey,
        text: &str,
    ) -> Result<Option<String>, OutboundError> {
        let line = self.format_line(target, text);
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", line)
            .and_then(|_| stdout.flush())
            .map_err(|e| OutboundError::Delivery {
                target: target.to_string(),
                message: e.to_string(),
            })?;

        let n = self.sent.fetch_add(1, Ordering::Relaxed);
        Ok(Some(format!("console-{}", n)))
    }
}
