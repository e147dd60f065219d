//! Presence rotation
//!
//! Cycles the bot's activity text on a fixed interval until shutdown.

use std::time::Duration;

use serenity::all::{ActivityData, Context, OnlineStatus};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Presence texts the bot cycles through, in display order.
pub const STATUS_MESSAGES: [&str; 3] = ["@Lenny", "lennyface", "PM for help/info"];

/// Cycling counter over the fixed presence texts.
///
/// Owned exclusively by the rotation task; wraps back to the first entry
/// after the last one.
#[derive(Debug, Default)]
pub struct StatusCycle {
    current: usize,
}

impl StatusCycle {
    pub fn new() -> Self {
        Self { current: 0 }
    }

    /// Returns the presence text for this tick and advances the counter.
    pub fn next_message(&mut self) -> &'static str {
        let message = STATUS_MESSAGES[self.current];
        self.current += 1;
        if self.current >= STATUS_MESSAGES.len() {
            self.current = 0;
        }
        message
    }

    /// Current counter position.
    pub fn position(&self) -> usize {
        self.current
    }
}

/// Spawn the rotation task tied to the session lifecycle.
///
/// The task sets the presence, waits for `interval`, and repeats until a
/// shutdown signal arrives; cancellation is expected and absorbed.
pub fn spawn_rotation(
    ctx: Context,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("status rotation started ({}s per step)", interval.as_secs());
        let mut cycle = StatusCycle::new();

        loop {
            let message = cycle.next_message();
            ctx.set_presence(Some(ActivityData::playing(message)), OnlineStatus::Online);

            tokio::select! {
                _ = shutdown.recv() => {
                    debug!("status rotation stopped");
                    break;
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_visits_all_three_messages_in_order() {
        let mut cycle = StatusCycle::new();
        assert_eq!(cycle.next_message(), "@Lenny");
        assert_eq!(cycle.next_message(), "lennyface");
        assert_eq!(cycle.next_message(), "PM for help/info");
        // and repeats
        assert_eq!(cycle.next_message(), "@Lenny");
    }

    #[test]
    fn cycle_position_never_exceeds_two() {
        let mut cycle = StatusCycle::new();
        for _ in 0..100 {
            assert!(cycle.position() <= 2);
            cycle.next_message();
        }
    }
}
