//! Bot-list statistics reporting
//!
//! Pushes guild statistics to the bot-list API after connect and on guild
//! membership changes. Reporting is disabled entirely when no API key is
//! configured.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::debug;

use crate::error::Result;

/// Fixed bot-list API root.
const DISCORD_BOTS_API: &str = "https://bots.discord.pw/api";

/// Request timeout for statistics posts.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Statistics payload expected by the bot-list API.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GuildStats {
    pub server_count: usize,
    pub shard_id: u64,
    pub shard_count: u64,
}

/// Outcome of a delivered statistics report.
#[derive(Debug)]
pub struct ReportOutcome {
    pub status: StatusCode,
    pub payload: String,
}

/// Client for the external bot-list statistics endpoint.
pub struct StatsReporter {
    client: Client,
    key: Option<String>,
}

impl StatsReporter {
    /// Create a reporter; passing `None` disables reporting.
    pub fn new(key: Option<String>) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, key })
    }

    /// Whether a bot-list key is configured.
    pub fn is_enabled(&self) -> bool {
        self.key.is_some()
    }

    /// Endpoint for a bot's statistics document.
    fn endpoint(bot_id: u64) -> String {
        format!("{}/bots/{}/stats", DISCORD_BOTS_API, bot_id)
    }

    /// Push one statistics report.
    ///
    /// Returns `Ok(None)` without touching the network when reporting is
    /// disabled. Transport failures surface as errors for the caller to
    /// absorb; they are never retried here.
    pub async fn report(&self, bot_id: u64, stats: &GuildStats) -> Result<Option<ReportOutcome>> {
        let Some(key) = &self.key else {
            debug!("statistics reporting disabled (no bot-list key)");
            return Ok(None);
        };

        let payload = serde_json::to_string(stats)?;

        let response = self
            .client
            .post(Self::endpoint(bot_id))
            .header("authorization", key)
            .header("content-type", "application/json")
            .body(payload.clone())
            .send()
            .await?;

        Ok(Some(ReportOutcome {
            status: response.status(),
            payload,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_reporter_performs_no_network_calls() {
        let reporter = StatsReporter::new(None).unwrap();
        assert!(!reporter.is_enabled());

        let stats = GuildStats {
            server_count: 3,
            shard_id: 0,
            shard_count: 1,
        };
        let outcome = reporter.report(1, &stats).await.unwrap();
        assert!(outcome.is_none());
    }

    #[test]
    fn payload_uses_bot_list_field_names() {
        let stats = GuildStats {
            server_count: 42,
            shard_id: 2,
            shard_count: 8,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert_eq!(json, r#"{"server_count":42,"shard_id":2,"shard_count":8}"#);
    }

    #[test]
    fn endpoint_addresses_the_bot_document() {
        assert_eq!(
            StatsReporter::endpoint(7),
            "https://bots.discord.pw/api/bots/7/stats"
        );
    }
}
