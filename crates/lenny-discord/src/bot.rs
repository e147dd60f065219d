//! Discord Bot implementation using Serenity

use anyhow::Result;
use serenity::all::GatewayIntents;
use serenity::prelude::*;
use tokio::sync::broadcast;
use tracing::{info, warn};

use lenny_core::Config;

use crate::handler::Handler;

/// The Lenny bot session: configuration, lifecycle, and shutdown wiring.
pub struct LennyBot {
    config: Config,
    shutdown_tx: broadcast::Sender<()>,
}

impl LennyBot {
    /// Create a new bot session from loaded configuration.
    pub fn new(config: Config) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            shutdown_tx,
        }
    }

    /// Connect and run until the process is told to stop.
    ///
    /// Ctrl-C shuts the gateway down first, then releases the rotation
    /// task through the shutdown channel; the statistics HTTP session is
    /// dropped with the handler and needs no explicit teardown.
    pub async fn run(&self) -> Result<()> {
        // Guild and direct messages, plus content to match triggers on.
        let intents = GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;

        info!("Starting Lenny...");

        let handler = Handler::new(self.config.clone(), self.shutdown_tx.clone())?;

        let mut client = Client::builder(&self.config.token, intents)
            .event_handler(handler)
            .await?;

        let shard_manager = client.shard_manager.clone();
        let shutdown_tx = self.shutdown_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "could not install Ctrl-C handler");
                return;
            }
            info!("Shutting down...");
            shard_manager.shutdown_all().await;
            let _ = shutdown_tx.send(());
        });

        // The platform assigns each shard its slice of the guild set.
        client.start_autosharded().await?;

        Ok(())
    }
}
