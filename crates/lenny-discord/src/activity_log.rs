//! Activity logging to the configured log channel
//!
//! All log and report output funnels through one sink so every entry has
//! the same shape. Failures here go to local diagnostics only and never
//! interrupt event handling.

use std::sync::OnceLock;

use serenity::all::ChannelId;
use serenity::http::Http;
use tracing::{info, warn};

use crate::error::{DiscordError, Result};

/// Mailbox glyph prefixing direct-message log lines.
const DM_PREFIX: char = '✉';

/// Format one log line: `[guild] author - content` for guild messages,
/// `✉ author - content` for direct messages.
pub fn format_line(guild: Option<&str>, author: &str, content: &str) -> String {
    match guild {
        Some(guild) => format!("[{}] {} - {}", guild, author, content),
        None => format!("{} {} - {}", DM_PREFIX, author, content),
    }
}

/// The log-channel sink.
///
/// The channel id comes from configuration; the reference is resolved
/// once at ready and is read-only afterwards. Invariant: `try_send`
/// refuses to run before resolution succeeded.
pub struct ActivityLog {
    target: ChannelId,
    resolved: OnceLock<ChannelId>,
}

impl ActivityLog {
    pub fn new(channel_id: u64) -> Self {
        Self {
            target: ChannelId::new(channel_id),
            resolved: OnceLock::new(),
        }
    }

    /// Resolve the log channel, verifying it is visible to the session.
    ///
    /// A failed resolution leaves the sink unresolved; log calls then fail
    /// gracefully instead of crashing message handling.
    pub async fn resolve(&self, http: &Http) {
        if self.resolved.get().is_some() {
            return;
        }

        match self.target.to_channel(http).await {
            Ok(_) => {
                let _ = self.resolved.set(self.target);
                info!("log channel {} resolved", self.target);
            }
            Err(e) => warn!(error = %e, "could not resolve log channel {}", self.target),
        }
    }

    /// Send a line to the log channel.
    pub async fn try_send(&self, http: &Http, line: &str) -> Result<()> {
        let channel = self
            .resolved
            .get()
            .ok_or(DiscordError::LogChannelUnresolved)?;
        channel.say(http, line).await?;
        Ok(())
    }

    /// Best-effort send: failures go to local diagnostics only.
    pub async fn send(&self, http: &Http, line: &str) {
        if let Err(e) = self.try_send(http, line).await {
            warn!(error = %e, "failed to log: {}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guild_lines_carry_the_guild_name() {
        let line = format_line(Some("Test Guild"), "isk", "lennyface");
        assert_eq!(line, "[Test Guild] isk - lennyface");
    }

    #[test]
    fn direct_lines_use_the_mailbox_glyph() {
        let line = format_line(None, "isk", "hello");
        assert_eq!(line, "✉ isk - hello");
    }

    #[tokio::test]
    async fn unresolved_sink_fails_gracefully() {
        let log = ActivityLog::new(42);
        let http = Http::new("");

        let err = log.try_send(&http, "line").await.unwrap_err();
        assert!(matches!(err, DiscordError::LogChannelUnresolved));
    }
}
