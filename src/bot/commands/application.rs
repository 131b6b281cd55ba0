//! Application Discord commands - `apply`, `applications` and `review`.
//!
//! Listings are kept per viewer in [`BotData::boards`](crate::bot::BotData). A
//! review patches the reviewer's board right away and marks the row as
//! provisional; the next `/applications` call refetches and replaces it.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, format, handlers::autocomplete, identity, resolve_course},
        core::{
            application::{parse_status, review_application, submit_application},
            application_view::{ApplicationBoard, ApplicationFilter, ApplicationView, list_applications},
        },
        entities::{ApplicationKind, ApplicationStatus},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Rows shown when no limit is given; Discord embeds hold at most 25 fields.
    const DEFAULT_ROWS: usize = 10;
    const MAX_ROWS: usize = 25;

    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum KindChoice {
        #[name = "admin"]
        Admin,
        #[name = "instructor"]
        Instructor,
    }

    impl From<KindChoice> for ApplicationKind {
        fn from(choice: KindChoice) -> Self {
            match choice {
                KindChoice::Admin => Self::Admin,
                KindChoice::Instructor => Self::Instructor,
            }
        }
    }

    fn status_emoji(status: ApplicationStatus) -> &'static str {
        match status {
            ApplicationStatus::Pending => "🟡",
            ApplicationStatus::Approved => "🟢",
            ApplicationStatus::Rejected => "🔴",
        }
    }

    /// Longest message or reason shown per row; the status line always fits.
    const NOTE_PREVIEW: usize = 400;

    fn board_fields(board: &ApplicationBoard, shown: usize) -> (Vec<(String, String, bool)>, usize) {
        let rows = board.rows().iter().take(shown).map(|row: &ApplicationView| {
            let marker = if board.is_provisional(row.id) {
                " (awaiting refresh)"
            } else {
                ""
            };
            let name = format!(
                "#{} {} {} - {} as {}",
                row.id,
                status_emoji(row.status),
                row.user_name,
                row.course_title,
                row.kind
            );
            let mut value = format!(
                "**Status:** {}{marker}\n**Submitted:** {}",
                row.status,
                row.created_at.format("%Y-%m-%d %H:%M UTC")
            );
            if let Some(message) = &row.message {
                value.push_str(&format!("\n**Message:** {}", format::clip(message, NOTE_PREVIEW)));
            }
            if let Some(reason) = &row.reason {
                value.push_str(&format!("\n**Reason:** {}", format::clip(reason, NOTE_PREVIEW)));
            }
            (name, value)
        });
        format::fit_fields(rows)
    }

    fn render_board(board: &ApplicationBoard, shown: usize) -> serenity::CreateEmbed {
        let (embed_fields, omitted) = board_fields(board, shown);
        let embed = serenity::CreateEmbed::default()
            .title("**Applications**")
            .color(0x0058_65F2)
            .fields(embed_fields);
        if omitted > 0 {
            embed.footer(serenity::CreateEmbedFooter::new(format!(
                "{omitted} more not shown. Narrow the filters or lower the limit."
            )))
        } else {
            embed
        }
    }

    /// Applies to become an admin or instructor of a course.
    #[poise::command(slash_command)]
    pub async fn apply(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Course to apply for"]
        #[autocomplete = "autocomplete::autocomplete_course_title"]
        course_title: String,
        #[description = "Role you are applying for"] kind: KindChoice,
        #[description = "Optional note for the reviewers"] message: Option<String>,
    ) -> Result<()> {
        let me = identity(ctx).await?;
        let target = resolve_course(ctx, &course_title).await?;
        let kind = ApplicationKind::from(kind);

        let application =
            submit_application(&ctx.data().database, &me, target.id, kind, message).await?;

        ctx.say(&format!(
            "✅ Application #{} to become {} of **{}** submitted. Course staff will review it.",
            application.id, kind, target.title
        ))
        .await?;
        Ok(())
    }

    /// Lists applications you may see, newest first.
    ///
    /// Course owners and course admins see their courses' applications, site
    /// administrators see all of them, and `mine:true` shows your own.
    #[allow(clippy::too_many_arguments)]
    #[poise::command(slash_command)]
    pub async fn applications(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Only this status"]
        #[autocomplete = "autocomplete::autocomplete_status"]
        status: Option<String>,
        #[description = "Only this role"] kind: Option<KindChoice>,
        #[description = "Only this course"]
        #[autocomplete = "autocomplete::autocomplete_my_course_title"]
        course_title: Option<String>,
        #[description = "Search requester name or course title"] search: Option<String>,
        #[description = "Maximum rows (1-25)"] limit: Option<u8>,
        #[description = "Show only your own applications"] mine: Option<bool>,
        #[description = "Refetch from the database (default true)"] refresh: Option<bool>,
    ) -> Result<()> {
        let me = identity(ctx).await?;
        let shown = limit.map_or(DEFAULT_ROWS, usize::from).clamp(1, MAX_ROWS);

        if !refresh.unwrap_or(true) {
            let boards = ctx.data().boards.read().await;
            if let Some(board) = boards.get(&me.id) {
                let embed = render_board(board, shown);
                drop(boards);
                ctx.send(poise::CreateReply::default().embed(embed)).await?;
                return Ok(());
            }
        }

        let status = status.as_deref().map(parse_status).transpose()?;
        let course_id = match course_title {
            Some(title) => Some(resolve_course(ctx, &title).await?.id),
            None => None,
        };
        let filter = ApplicationFilter {
            status,
            kind: kind.map(ApplicationKind::from),
            course_id,
            search,
            limit: Some(shown),
            mine: mine.unwrap_or(false),
        };

        let rows = list_applications(&ctx.data().database, &me, &filter).await?;
        if rows.is_empty() {
            ctx.data().boards.write().await.remove(&me.id);
            ctx.say("📭 No applications match these filters.").await?;
            return Ok(());
        }

        let embed = {
            let mut boards = ctx.data().boards.write().await;
            let board = boards.entry(me.id).or_default();
            board.replace(rows);
            render_board(board, shown)
        };
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Approves or rejects a pending application.
    #[poise::command(slash_command)]
    pub async fn review(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Application number"] application_id: i64,
        #[description = "approved or rejected"]
        #[autocomplete = "autocomplete::autocomplete_status"]
        status: String,
        #[description = "Reason, shown to the applicant when rejecting"] reason: Option<String>,
    ) -> Result<()> {
        let target = parse_status(&status)?;
        let me = identity(ctx).await?;

        let reviewed =
            review_application(&ctx.data().database, &me, application_id, target, reason).await?;

        let patched = ctx.data().boards.write().await.get_mut(&me.id).is_some_and(|board| {
            board.patch_status(reviewed.id, reviewed.status, reviewed.rejection_reason.clone())
        });

        let verb = match reviewed.status {
            ApplicationStatus::Approved => "approved",
            _ => "rejected",
        };
        let mut reply = format!(
            "{} Application #{} {verb}.",
            status_emoji(reviewed.status),
            reviewed.id
        );
        if patched {
            reply.push_str(" Your `/applications` list was updated.");
        }
        ctx.say(reply).await?;
        Ok(())
    }

}

// Re-export all commands
pub use inner::*;
