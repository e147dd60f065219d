//! Configuration management
//!
//! Settings are loaded with the following precedence:
//! 1. Environment variables
//! 2. `lenny.toml` configuration file
//! 3. Default values
//!
//! Inside the configuration file, `${VAR_NAME}` strings expand to
//! environment variable values.

use serde::Deserialize;
use std::path::Path;

use crate::Error;

/// Environment variable holding the gateway credential.
pub const TOKEN_VAR: &str = "token";
/// Environment variable holding the owner user id.
pub const OWNER_VAR: &str = "owner";
/// Environment variable holding the log channel id.
pub const LOG_CHANNEL_VAR: &str = "logChannel";
/// Environment variable holding the invite link.
pub const INVITE_URL_VAR: &str = "invite_url";
/// Environment variable holding the bot-list API key (optional).
pub const DBOTS_KEY_VAR: &str = "dbots_key";

fn default_status_interval() -> u64 {
    20
}

/// Main configuration for the Lenny gateway
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord bot token
    pub token: String,

    /// Owner user id
    pub owner: u64,

    /// Channel receiving activity logs and reports
    pub log_channel: u64,

    /// Invite link shown in the info card
    pub invite_url: String,

    /// Bot-list API key; `None` disables statistics reporting
    pub dbots_key: Option<String>,

    /// Presence rotation period in seconds
    pub status_interval_secs: u64,
}

impl Config {
    /// Expand environment variables inside a configuration file.
    ///
    /// `${VAR_NAME}` strings are replaced with the variable's value, or
    /// with the empty string when the variable is not set.
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next(); // consume '{'

                let mut var_name = String::new();
                while let Some(&c) = chars.peek() {
                    if c == '}' {
                        chars.next(); // consume '}'
                        break;
                    }
                    var_name.push(chars.next().unwrap());
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Load configuration from a TOML file.
    ///
    /// `${VAR_NAME}` strings in the file are expanded before parsing, and
    /// existing environment variables override file values afterwards.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();

        let toml_content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let expanded_content = Self::expand_env_vars(&toml_content);

        let toml_config: TomlConfig = toml::from_str(&expanded_content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        let mut draft = Draft::from_toml(toml_config);
        draft.apply_env_overrides()?;
        draft.finish()
    }

    /// Load configuration from the default locations.
    ///
    /// Tries `./lenny.toml` first; when no file exists, configuration
    /// comes from environment variables alone.
    pub fn load() -> crate::Result<Self> {
        if Path::new("lenny.toml").exists() {
            tracing::info!("Loading configuration from lenny.toml");
            return Self::from_toml_file("lenny.toml");
        }

        Self::from_env()
    }

    /// Load configuration from environment variables only.
    pub fn from_env() -> crate::Result<Self> {
        let mut draft = Draft::default();
        draft.apply_env_overrides()?;
        draft.finish()
    }
}

/// Partially-resolved configuration, merged from file and environment.
#[derive(Debug, Default)]
struct Draft {
    token: Option<String>,
    owner: Option<u64>,
    log_channel: Option<u64>,
    invite_url: Option<String>,
    dbots_key: Option<String>,
    status_interval_secs: Option<u64>,
}

impl Draft {
    fn from_toml(toml: TomlConfig) -> Self {
        let discord = toml.discord.unwrap_or_default();
        let dbots = toml.dbots.unwrap_or_default();
        let status = toml.status.unwrap_or_default();

        Self {
            token: discord.token,
            owner: discord.owner,
            log_channel: discord.log_channel,
            invite_url: discord.invite_url,
            dbots_key: dbots.key,
            status_interval_secs: status.interval_secs,
        }
    }

    /// Override the draft with environment variables (environment wins).
    fn apply_env_overrides(&mut self) -> crate::Result<()> {
        if let Ok(token) = std::env::var(TOKEN_VAR) {
            self.token = Some(token);
        }

        if let Ok(owner) = std::env::var(OWNER_VAR) {
            self.owner = Some(parse_id(OWNER_VAR, &owner)?);
        }

        if let Ok(channel) = std::env::var(LOG_CHANNEL_VAR) {
            self.log_channel = Some(parse_id(LOG_CHANNEL_VAR, &channel)?);
        }

        if let Ok(url) = std::env::var(INVITE_URL_VAR) {
            self.invite_url = Some(url);
        }

        if let Ok(key) = std::env::var(DBOTS_KEY_VAR) {
            self.dbots_key = Some(key);
        }

        Ok(())
    }

    /// Validate required values and produce the final configuration.
    fn finish(self) -> crate::Result<Config> {
        // An empty bot-list key disables reporting, same as an absent one.
        let dbots_key = self.dbots_key.filter(|key| !key.is_empty());

        Ok(Config {
            token: require(self.token, TOKEN_VAR)?,
            owner: require(self.owner, OWNER_VAR)?,
            log_channel: require(self.log_channel, LOG_CHANNEL_VAR)?,
            invite_url: require(self.invite_url, INVITE_URL_VAR)?,
            dbots_key,
            status_interval_secs: self.status_interval_secs.unwrap_or_else(default_status_interval),
        })
    }
}

fn require<T>(value: Option<T>, var: &str) -> crate::Result<T> {
    value.ok_or_else(|| Error::Config(format!("required variable `{}` is not set", var)))
}

fn parse_id(var: &str, value: &str) -> crate::Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("variable `{}` is not a numeric id: {:?}", var, value)))
}

// ============================================================================
// TOML structure definitions (file parsing)
// ============================================================================

/// Top-level structure of `lenny.toml`
#[derive(Debug, Deserialize)]
struct TomlConfig {
    discord: Option<TomlDiscordConfig>,
    dbots: Option<TomlDbotsConfig>,
    status: Option<TomlStatusConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlDiscordConfig {
    token: Option<String>,
    owner: Option<u64>,
    log_channel: Option<u64>,
    invite_url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlDbotsConfig {
    key: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlStatusConfig {
    interval_secs: Option<u64>,
}
