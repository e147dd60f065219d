//! lenny-gateway: Lenny Discord Bot Main Binary
//!
//! Main entry point for the Lenny bot.
//!
//! Usage:
//!   lenny-gateway            - Connect and run the bot
//!   lenny-gateway --help     - Show help
//!   lenny-gateway --version  - Show version

use lenny_core::Config;
use lenny_discord::LennyBot;
use tracing_subscriber::EnvFilter;

/// Run mode
enum RunMode {
    /// Connect and run the bot
    Run,
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match parse_args() {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("lenny-gateway {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        RunMode::Run => {}
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load().map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!("Starting lenny-gateway...");

    let bot = LennyBot::new(config);
    bot.run().await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Parse command line arguments
fn parse_args() -> RunMode {
    let args: Vec<String> = std::env::args().collect();

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-v" => return RunMode::Version,
            _ => {}
        }
    }

    RunMode::Run
}

/// Print help message
fn print_help() {
    println!("lenny-gateway - Lenny Discord Bot");
    println!();
    println!("Usage:");
    println!("  lenny-gateway            Connect and run the bot");
    println!("  lenny-gateway --help     Show this help message");
    println!("  lenny-gateway --version  Show version");
    println!();
    println!("Environment Variables:");
    println!("  token                Discord bot token (required)");
    println!("  owner                Owner user id (required)");
    println!("  logChannel           Log channel id (required)");
    println!("  invite_url           Invite link for the info card (required)");
    println!("  dbots_key            Bot-list API key (optional; disables");
    println!("                       statistics reporting when unset)");
    println!();
    println!("A lenny.toml file in the working directory is read first;");
    println!("environment variables override its values.");
}
