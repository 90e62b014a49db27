//! Discord gateway client.
//!
//! This module owns the serenity event handler: slash command dispatch, the
//! owner-gated sync mention, and quiz-slug autocomplete. The individual
//! command families live in the submodules.

pub mod commands;
pub mod embeds;
mod questions;
mod quiz;
mod settings;
mod stats;

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use serenity::all::{
    CommandInteraction, Context, CreateAutocompleteResponse, CreateEmbed,
    CreateInteractionResponse, CreateInteractionResponseFollowup, CreateInteractionResponseMessage,
    EventHandler, GatewayIntents, GuildId, Interaction, Message, Ready, ResolvedOption,
    ResolvedValue, Role, User,
};
use serenity::{async_trait, Client};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::session::ActiveSessions;
use crate::storage::Storage;

/// Shared state behind the serenity event handler.
pub struct Handler {
    /// The guild commands are registered against.
    guild_id: u64,
    /// Per-question answer deadline.
    question_timeout: Duration,
    /// Questions per page in the bank listing.
    questions_per_page: usize,
    /// Quiz database. rusqlite connections are not `Sync`, so access is
    /// serialized behind an async mutex.
    storage: Arc<Mutex<Storage>>,
    /// Users with a quiz in progress.
    sessions: ActiveSessions,
    /// Application owner and team member ids, populated on ready.
    owners: OnceLock<HashSet<u64>>,
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handler")
            .field("guild_id", &self.guild_id)
            .field("question_timeout", &self.question_timeout)
            .finish_non_exhaustive()
    }
}

/// Connect to Discord and serve quizzes until the gateway connection ends.
///
/// # Errors
///
/// Returns an error when the configuration is missing a token or guild id,
/// when the database cannot be opened, or when the gateway client fails.
pub async fn run(config: Config) -> Result<()> {
    let token = config.bot_token()?.to_string();
    let guild_id = config.guild_id()?;
    let storage = Storage::open(config.database_path())?;

    let handler = Handler {
        guild_id,
        question_timeout: config.question_timeout(),
        questions_per_page: config.quiz.questions_per_page,
        storage: Arc::new(Mutex::new(storage)),
        sessions: ActiveSessions::new(),
        owners: OnceLock::new(),
    };

    let intents =
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::DIRECT_MESSAGES;

    let mut client = Client::builder(&token, intents)
        .event_handler(handler)
        .await?;

    info!("Connecting to Discord gateway");
    client.start().await?;
    Ok(())
}

impl Handler {
    /// Whether a user is the application owner, a team member, or a stored
    /// manager.
    async fn is_manager_or_owner(&self, user_id: u64) -> Result<bool> {
        if self
            .owners
            .get()
            .is_some_and(|owners| owners.contains(&user_id))
        {
            return Ok(true);
        }
        let storage = self.storage.lock().await;
        storage.is_manager(user_id)
    }

    /// Handle an authorized sync mention: register the command set against
    /// the configured guild.
    async fn sync_commands(&self, ctx: &Context, msg: &Message) {
        let guild = GuildId::new(self.guild_id);
        match guild.set_commands(&ctx.http, commands::all()).await {
            Ok(registered) => {
                info!("Registered {} guild commands", registered.len());
                let reply = format!("Synced {} commands.", registered.len());
                if let Err(e) = msg.reply(&ctx.http, reply).await {
                    warn!("Failed to acknowledge sync: {e}");
                }
            }
            Err(e) => {
                error!("Command sync failed: {e}");
                let _ = msg.reply(&ctx.http, "Command sync failed.").await;
            }
        }
    }

    /// Answer quiz-slug autocomplete with matching slugs from the database.
    async fn handle_autocomplete(&self, ctx: &Context, ac: &CommandInteraction) -> Result<()> {
        let Some(option) = ac.data.autocomplete() else {
            return Ok(());
        };
        let partial = option.value.to_lowercase();

        let quizzes = {
            let storage = self.storage.lock().await;
            storage.list_quizzes()?
        };

        let mut response = CreateAutocompleteResponse::new();
        for quiz in quizzes
            .iter()
            .filter(|q| q.slug.to_lowercase().starts_with(&partial))
            .take(25)
        {
            response = response.add_string_choice(&quiz.slug, &quiz.slug);
        }

        ac.create_response(&ctx.http, CreateInteractionResponse::Autocomplete(response))
            .await?;
        Ok(())
    }

    /// Gate a manager-only command, answering with an ephemeral error when
    /// the caller is not authorized or the command is used outside a guild.
    ///
    /// Returns `true` when the command may proceed.
    async fn authorize(&self, ctx: &Context, cmd: &CommandInteraction) -> Result<bool> {
        if cmd.guild_id.is_none() {
            respond_embed(
                ctx,
                cmd,
                embeds::error("This command only works inside the server."),
                true,
            )
            .await?;
            return Ok(false);
        }

        if self.is_manager_or_owner(cmd.user.id.get()).await? {
            return Ok(true);
        }

        debug!(
            "Refusing {} from non-manager {}",
            cmd.data.name, cmd.user.id
        );
        respond_embed(
            ctx,
            cmd,
            embeds::error("You must be a bot manager to use this command."),
            true,
        )
        .await?;
        Ok(false)
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("Connected as {}", ready.user.name);

        match ctx.http.get_current_application_info().await {
            Ok(info) => {
                let mut owners = HashSet::new();
                if let Some(owner) = &info.owner {
                    owners.insert(owner.id.get());
                }
                if let Some(team) = &info.team {
                    for member in &team.members {
                        owners.insert(member.user.id.get());
                    }
                }
                debug!("Resolved {} application owner(s)", owners.len());
                let _ = self.owners.set(owners);
            }
            Err(e) => warn!("Could not fetch application info: {e}"),
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let mentioned = match msg.mentions_me(&ctx).await {
            Ok(mentioned) => mentioned,
            Err(e) => {
                warn!("Mention check failed: {e}");
                return;
            }
        };
        if !mentioned || !msg.content.to_lowercase().contains("sync") {
            return;
        }

        match self.is_manager_or_owner(msg.author.id.get()).await {
            Ok(true) => self.sync_commands(&ctx, &msg).await,
            Ok(false) => debug!("Ignoring sync request from {}", msg.author.id),
            Err(e) => error!("Authorization check failed: {e}"),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Command(cmd) => {
                let result = match cmd.data.name.as_str() {
                    "quiz" => quiz::handle(self, &ctx, &cmd).await,
                    "settings" => settings::handle(self, &ctx, &cmd).await,
                    "questions" => questions::handle(self, &ctx, &cmd).await,
                    "stats" => stats::handle(self, &ctx, &cmd).await,
                    other => {
                        warn!("Unknown command: {other}");
                        Ok(())
                    }
                };
                if let Err(e) = result {
                    error!("Command /{} failed: {e}", cmd.data.name);
                }
            }
            Interaction::Autocomplete(ac) => {
                if let Err(e) = self.handle_autocomplete(&ctx, &ac).await {
                    warn!("Autocomplete failed: {e}");
                }
            }
            _ => {}
        }
    }
}

/// Answer an interaction with a single embed.
pub(crate) async fn respond_embed(
    ctx: &Context,
    cmd: &CommandInteraction,
    embed: CreateEmbed,
    ephemeral: bool,
) -> Result<()> {
    let message = CreateInteractionResponseMessage::new()
        .embed(embed)
        .ephemeral(ephemeral);
    cmd.create_response(&ctx.http, CreateInteractionResponse::Message(message))
        .await?;
    Ok(())
}

/// Send an embed as a followup to an already-acknowledged interaction.
pub(crate) async fn followup_embed(
    ctx: &Context,
    cmd: &CommandInteraction,
    embed: CreateEmbed,
    ephemeral: bool,
) -> Result<()> {
    let followup = CreateInteractionResponseFollowup::new()
        .embed(embed)
        .ephemeral(ephemeral);
    cmd.create_followup(&ctx.http, followup).await?;
    Ok(())
}

/// Split the leading subcommand (or subcommand group) off a resolved option
/// list.
pub(crate) fn split_subcommand<'a>(
    options: &'a [ResolvedOption<'a>],
) -> Option<(&'a str, &'a [ResolvedOption<'a>])> {
    match options.first() {
        Some(option) => match &option.value {
            ResolvedValue::SubCommand(subs) | ResolvedValue::SubCommandGroup(subs) => {
                Some((option.name, subs.as_slice()))
            }
            _ => None,
        },
        None => None,
    }
}

/// Extract a string option by name.
pub(crate) fn str_option<'a>(options: &'a [ResolvedOption<'a>], name: &str) -> Option<&'a str> {
    options.iter().find_map(|opt| match &opt.value {
        ResolvedValue::String(value) if opt.name == name => Some(*value),
        _ => None,
    })
}

/// Extract an integer option by name.
pub(crate) fn int_option(options: &[ResolvedOption<'_>], name: &str) -> Option<i64> {
    options.iter().find_map(|opt| match &opt.value {
        ResolvedValue::Integer(value) if opt.name == name => Some(*value),
        _ => None,
    })
}

/// Extract a user option by name.
pub(crate) fn user_option<'a>(options: &'a [ResolvedOption<'a>], name: &str) -> Option<&'a User> {
    options.iter().find_map(|opt| match &opt.value {
        ResolvedValue::User(user, _) if opt.name == name => Some(*user),
        _ => None,
    })
}

/// Extract a role option by name.
pub(crate) fn role_option<'a>(options: &'a [ResolvedOption<'a>], name: &str) -> Option<&'a Role> {
    options.iter().find_map(|opt| match &opt.value {
        ResolvedValue::Role(role) if opt.name == name => Some(*role),
        _ => None,
    })
}
