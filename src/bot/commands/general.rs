//! General Discord commands - ping, help, and other utility commands.
//! This module contains simple commands that don't require database operations
//! and provide basic bot functionality and user assistance.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**CourseBuddy Help**\n\
        Here is a summary of all available commands.\n\n\
        **Getting Started**\n\
        • `/register <name>` - Creates your profile. Required before anything else.\n\n\
        **Courses**\n\
        • `/course list` - Shows the course catalog.\n\
        • `/course join <code>` - Joins a free course with its join code.\n\
        • `/course buy <course> <payment_reference>` - Enrolls in a paid course.\n\
        • `/course mine` - Shows your courses and progress.\n\
        • `/course progress <course> <percent>` - Records your progress.\n\
        • `/course create <title> <code> [price] [description]` - Creates a course you own.\n\n\
        **Applications**\n\
        • `/apply <course> <kind> [message]` - Applies to become course admin or instructor.\n\
        • `/applications [status] [kind] [course] [search] [limit] [mine]` - Lists applications.\n\
        • `/review <id> <status> [reason]` - Approves or rejects an application.\n\n\
        **Coursework**\n\
        • `/assignment <create|list|submit|submissions>` - Manage and submit assignments.\n\
        • `/announce <course> <title> <body>` - Posts an announcement.\n\
        • `/announcements <course>` - Reads a course's announcements.\n\n\
        **Utility Commands**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
