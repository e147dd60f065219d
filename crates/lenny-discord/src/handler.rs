//! Discord event handler
//!
//! Owns the per-session state (start timestamp, log channel, rotation
//! task guard) and maps gateway events onto the triage actions.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serenity::all::{
    Context, CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter, CreateMessage, EventHandler,
    Guild, Message, Ready, ResumedEvent, UnavailableGuild, UserId,
};
use serenity::async_trait;
use serenity::cache::Cache;
use serenity::http::HttpError;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use lenny_core::Config;

use crate::activity_log::{self, ActivityLog};
use crate::error::Result;
use crate::stats::{GuildStats, StatsReporter};
use crate::status;
use crate::triage::{Action, EMOTICON, MessageFacts, triage};

/// Accent colour of the info card embed.
const EMBED_COLOUR: u32 = 0xD1526A;

/// Support server advertised under the info card.
const SUPPORT_SERVER_URL: &str = "https://discord.gg/nwYjRz4";

/// Event handler and session state for the Lenny bot.
pub struct Handler {
    config: Config,
    stats: StatsReporter,
    log: ActivityLog,
    started_at: OnceLock<DateTime<Utc>>,
    rotation_started: AtomicBool,
    shutdown: broadcast::Sender<()>,
}

impl Handler {
    pub fn new(config: Config, shutdown: broadcast::Sender<()>) -> Result<Self> {
        let stats = StatsReporter::new(config.dbots_key.clone())?;
        let log = ActivityLog::new(config.log_channel);

        Ok(Self {
            config,
            stats,
            log,
            started_at: OnceLock::new(),
            rotation_started: AtomicBool::new(false),
            shutdown,
        })
    }

    /// Push one statistics report and note the response in the log
    /// channel. Network failures stay local; nothing is retried.
    async fn report_statistics(&self, ctx: &Context) {
        let bot_id = ctx.cache.current_user().id;
        let stats = GuildStats {
            server_count: ctx.cache.guild_count(),
            shard_id: ctx.shard_id.0.into(),
            shard_count: ctx.cache.shard_count().into(),
        };

        match self.stats.report(bot_id.get(), &stats).await {
            Ok(Some(outcome)) => {
                let line = format!(
                    "DBots statistics returned {} for {}",
                    outcome.status, outcome.payload
                );
                self.log.send(&ctx.http, &line).await;
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "statistics report failed"),
        }
    }

    /// Owner command: totals across all guilds, sent to the log channel.
    async fn report_guild_totals(&self, ctx: &Context) {
        let (guilds, members) = guild_totals(&ctx.cache);
        self.log
            .send(&ctx.http, &guild_totals_line(guilds, members))
            .await;
    }

    /// One formatted line per message, to the log channel.
    async fn log_message(&self, ctx: &Context, msg: &Message) {
        let guild_name = msg.guild_id.and_then(|id| id.name(&ctx.cache));
        let clean = msg.content_safe(&ctx.cache);
        let line = activity_log::format_line(guild_name.as_deref(), &msg.author.name, &clean);
        self.log.send(&ctx.http, &line).await;
    }

    /// The invite/info embed plus the support-server link, shown to
    /// direct conversations that did not trigger a reply.
    async fn send_info_card(&self, ctx: &Context, msg: &Message, bot_id: UserId) {
        let _ = msg.channel_id.broadcast_typing(&ctx.http).await;

        let (bot_name, bot_face) = {
            let me = ctx.cache.current_user();
            (me.name.to_string(), me.face())
        };

        let mut embed = CreateEmbed::new()
            .title(format!("Invite {}:", bot_name))
            .description(format!("[Click me!]({})", self.config.invite_url))
            .colour(EMBED_COLOUR)
            .author(
                CreateEmbedAuthor::new(format!("{} (Discord ID: {})", bot_name, bot_id))
                    .icon_url(bot_face),
            )
            .field("Triggers: ", format!("`lennyface`\n<@{}>", bot_id), false);

        embed = match UserId::new(self.config.owner).to_user(&ctx.http).await {
            Ok(owner) => embed.footer(
                CreateEmbedFooter::new(format!(
                    "Developer/Owner: {} (Discord ID: {}) - Shard ID: {}",
                    owner.name, owner.id, ctx.shard_id.0
                ))
                .icon_url(owner.face()),
            ),
            Err(e) => {
                debug!(error = %e, "could not fetch owner profile for info card");
                embed.footer(CreateEmbedFooter::new(format!(
                    "Developer/Owner ID: {} - Shard ID: {}",
                    self.config.owner, ctx.shard_id.0
                )))
            }
        };

        let builder = CreateMessage::new().embed(embed);
        if let Err(e) = msg.channel_id.send_message(&ctx.http, builder).await {
            warn!(error = %e, "failed to send info card");
            return;
        }

        let support = format!("Support server: {}", SUPPORT_SERVER_URL);
        if let Err(e) = msg.channel_id.say(&ctx.http, support).await {
            warn!(error = %e, "failed to send support link");
        }
    }

    /// Delete a bare trigger message. Missing Manage Messages permission
    /// is expected and absorbed; anything else is logged and absorbed.
    async fn delete_trigger_message(&self, ctx: &Context, msg: &Message) {
        match msg.delete(&ctx.http).await {
            Ok(()) => debug!("deleted trigger message {}", msg.id),
            Err(e) if is_permission_denied(&e) => {
                debug!("no permission to delete message {}", msg.id)
            }
            Err(e) => warn!(error = %e, "failed to delete trigger message"),
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, data_about_bot: Ready) {
        // Ready fires again after a full reconnect; every side effect
        // here must stay idempotent.
        if self.started_at.set(Utc::now()).is_ok() {
            info!("session start recorded");
        }

        info!(
            "Logged in as {} ({})",
            data_about_bot.user.name, data_about_bot.user.id
        );

        self.log.resolve(&ctx.http).await;

        if !self.rotation_started.swap(true, Ordering::SeqCst) {
            let interval = Duration::from_secs(self.config.status_interval_secs);
            status::spawn_rotation(ctx.clone(), interval, self.shutdown.subscribe());
        }

        self.report_statistics(&ctx).await;
    }

    async fn resume(&self, _ctx: Context, _event: ResumedEvent) {
        debug!("gateway session resumed");
    }

    async fn guild_create(&self, ctx: Context, guild: Guild, is_new: Option<bool>) {
        // guild_create also fires for every known guild at startup; only
        // genuine joins are announced.
        if !matches!(is_new, Some(true)) {
            return;
        }

        info!("joined guild {} ({})", guild.name, guild.id);
        let line = guild_joined_line(&guild.name, guild.member_count);
        self.log.send(&ctx.http, &line).await;
        self.report_statistics(&ctx).await;
    }

    async fn guild_delete(&self, ctx: Context, incomplete: UnavailableGuild, full: Option<Guild>) {
        // An unavailable guild went offline; the bot was not removed.
        if incomplete.unavailable {
            return;
        }

        let name = full
            .map(|g| g.name.to_string())
            .unwrap_or_else(|| incomplete.id.to_string());

        info!("removed from guild {}", name);
        self.log.send(&ctx.http, &guild_left_line(&name)).await;
        self.report_statistics(&ctx).await;
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let bot_id = ctx.cache.current_user().id;

        let facts = MessageFacts {
            author_is_self: msg.author.id == bot_id,
            author_is_bot: msg.author.bot,
            author_id: msg.author.id.get(),
            is_direct: msg.guild_id.is_none(),
            content: &msg.content,
            mentions_bot: msg.mentions_user_id(bot_id),
            mention_everyone: msg.mention_everyone,
        };

        for action in triage(&facts, self.config.owner, bot_id.get()) {
            match action {
                Action::ReportGuildTotals => self.report_guild_totals(&ctx).await,
                Action::LogMessage => self.log_message(&ctx, &msg).await,
                Action::ReplyEmoticon => {
                    if let Err(e) = msg.channel_id.say(&ctx.http, EMOTICON).await {
                        warn!(error = %e, "failed to send emoticon reply");
                    }
                }
                Action::SendInfoCard => self.send_info_card(&ctx, &msg, bot_id).await,
                Action::DeleteMessage => self.delete_trigger_message(&ctx, &msg).await,
            }
        }
    }
}

/// Guild count and summed member count from the cache. Computed without
/// suspension points so no cache reference is held across an await.
fn guild_totals(cache: &Cache) -> (usize, u64) {
    let guild_ids = cache.guilds();
    let mut members = 0u64;
    for id in &guild_ids {
        if let Some(guild) = cache.guild(*id) {
            members += guild.member_count;
        }
    }
    (guild_ids.len(), members)
}

/// HTTP 403 on delete means the guild never granted Manage Messages.
fn is_permission_denied(err: &serenity::Error) -> bool {
    matches!(
        err,
        serenity::Error::Http(HttpError::UnsuccessfulRequest(resp))
            if resp.status_code.as_u16() == 403
    )
}

fn guild_joined_line(name: &str, member_count: u64) -> String {
    format!("❤️ Lenny was added to {} - {}", name, member_count)
}

fn guild_left_line(name: &str) -> String {
    format!("💔 Lenny was removed from {}", name)
}

fn guild_totals_line(guilds: usize, members: u64) -> String {
    format!("{} servers, {} users.", guilds, members)
}
