//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for `CourseBuddy`: slash commands,
//! autocomplete handlers, the shared bot context, and the error hook that turns
//! every failed command into a reply.

/// Discord command implementations (course, application, coursework, general)
pub mod commands;
/// Clipping replies to Discord's size limits
pub mod format;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    core::{application_view::ApplicationBoard, course},
    entities,
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};

/// Shared data available to all bot commands.
/// This structure holds the database connection and the per-viewer application
/// boards shown by `/applications`.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Last application listing per viewer profile ID
    pub boards: RwLock<HashMap<i64, ApplicationBoard>>,
}

impl BotData {
    /// Creates a new `BotData` instance with the given database connection.
    #[must_use]
    pub fn new(database: DatabaseConnection) -> Self {
        Self {
            database,
            boards: RwLock::new(HashMap::new()),
        }
    }
}

/// Resolves the invoking Discord user to a registered profile.
pub async fn identity(ctx: poise::Context<'_, BotData, Error>) -> Result<entities::profile::Model> {
    let discord_id = ctx.author().id.to_string();
    crate::core::profile::require_identity(&ctx.data().database, &discord_id).await
}

/// Resolves a course option: an autocomplete label `"Title (CODE)"`, a join
/// code, or a title that only one course carries.
pub async fn resolve_course(
    ctx: poise::Context<'_, BotData, Error>,
    reference: &str,
) -> Result<entities::course::Model> {
    course::resolve_course_reference(&ctx.data().database, reference).await
}

/// Every command failure ends here: it is logged and answered with the
/// error's user-facing message.
async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            match &error {
                Error::Database(_) | Error::Framework(_) | Error::Io(_) | Error::Config { .. } => {
                    error!("Error in command `{}`: {:?}", ctx.command().name, error);
                }
                _ => warn!("Command `{}` refused: {}", ctx.command().name, error),
            }
            if let Err(e) = ctx.say(error.user_message()).await {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Builds the poise framework and runs the Discord client until it stops.
#[instrument(skip(token, database))]
pub async fn run_bot(token: String, database: DatabaseConnection) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::ping(),
                commands::help(),
                commands::register(),
                commands::course(),
                commands::apply(),
                commands::applications(),
                commands::review(),
                commands::assignment(),
                commands::announce(),
                commands::announcements(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(BotData::new(database))
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {:?}", e))?;
    Ok(())
}
