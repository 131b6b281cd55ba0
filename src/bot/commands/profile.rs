//! Profile Discord commands - `register`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        config,
        core::profile,
        errors::{Error, Result},
    };

    /// Creates your CourseBuddy profile.
    ///
    /// The display name is what reviewers see next to your applications.
    /// Registering twice is refused.
    #[poise::command(slash_command)]
    pub async fn register(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name shown to course staff"] display_name: String,
    ) -> Result<()> {
        let discord_id = ctx.author().id.to_string();
        let db = &ctx.data().database;

        if let Some(existing) = profile::find_by_discord_id(db, &discord_id).await? {
            ctx.say(&format!(
                "ℹ️ You are already registered as **{}**.",
                existing.display_name
            ))
            .await?;
            return Ok(());
        }

        let is_admin = config::admins::is_site_admin(&discord_id);
        let created = profile::register_profile(db, &discord_id, &display_name, is_admin).await?;

        let role = if created.is_site_admin {
            " as a site administrator"
        } else {
            ""
        };
        ctx.say(&format!(
            "✅ Welcome, **{}**! You are registered{role}.",
            created.display_name
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
