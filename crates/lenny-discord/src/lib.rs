//! lenny-discord: the Lenny Discord session
//!
//! Connects to the Discord gateway through serenity 0.12 and dispatches
//! the bot's event handling: trigger replies, activity logging, presence
//! rotation, and bot-list statistics.

pub mod activity_log;
pub mod bot;
pub mod error;
pub mod handler;
pub mod stats;
pub mod status;
pub mod triage;

pub use bot::LennyBot;
pub use error::{DiscordError, Result};
