//! Coursework commands - assignments, submissions and announcements.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, format, handlers::autocomplete, identity, resolve_course},
        core::{coursework, profile::get_profiles_by_ids},
        errors::{Error, Result},
    };
    use chrono::{DateTime, NaiveDate, Utc};
    use poise::serenity_prelude as serenity;
    use std::collections::HashMap;

    /// Characters of each answer shown in the submissions overview.
    const SUBMISSION_PREVIEW: usize = 200;

    /// Parses a `YYYY-MM-DD` due date as the end of that day, UTC.
    fn parse_due_date(value: &str) -> Result<DateTime<Utc>> {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(23, 59, 59))
            .map(|naive| naive.and_utc())
            .ok_or_else(|| Error::validation(format!("'{value}' is not a date like 2026-01-31")))
    }

    /// Assignment commands: create, list, submit and review submissions.
    #[poise::command(
        slash_command,
        subcommands(
            "assignment_create",
            "assignment_list",
            "assignment_submit",
            "assignment_submissions"
        )
    )]
    pub async fn assignment(_ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        Ok(())
    }

    /// Publishes a new assignment (course staff only).
    #[poise::command(slash_command, rename = "create")]
    pub async fn assignment_create(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Course"]
        #[autocomplete = "autocomplete::autocomplete_my_course_title"]
        course_title: String,
        #[description = "Assignment title"] title: String,
        #[description = "What to do"] description: Option<String>,
        #[description = "Due date (YYYY-MM-DD)"] due: Option<String>,
    ) -> Result<()> {
        let me = identity(ctx).await?;
        let target = resolve_course(ctx, &course_title).await?;
        let due_at = due.as_deref().map(parse_due_date).transpose()?;

        let created = coursework::create_assignment(
            &ctx.data().database,
            &me,
            target.id,
            &title,
            description,
            due_at,
        )
        .await?;

        ctx.say(&format!(
            "📝 Assignment #{} **{}** published in **{}**.",
            created.id, created.title, target.title
        ))
        .await?;
        Ok(())
    }

    /// Lists a course's assignments.
    #[poise::command(slash_command, rename = "list")]
    pub async fn assignment_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Course"]
        #[autocomplete = "autocomplete::autocomplete_my_course_title"]
        course_title: String,
    ) -> Result<()> {
        let me = identity(ctx).await?;
        let target = resolve_course(ctx, &course_title).await?;
        let assignments =
            coursework::list_assignments(&ctx.data().database, &me, target.id).await?;

        if assignments.is_empty() {
            ctx.say(&format!("No assignments in **{}** yet.", target.title))
                .await?;
            return Ok(());
        }

        let (embed_fields, _) = format::fit_fields(assignments.iter().map(|a| {
            let due = a.due_at.map_or_else(
                || "no due date".to_string(),
                |d| format!("due {}", d.format("%Y-%m-%d")),
            );
            let description = a.description.as_deref().unwrap_or("");
            (
                format!("#{} {}", a.id, a.title),
                format!("*{due}*\n{description}"),
            )
        }));

        let embed = serenity::CreateEmbed::default()
            .title(format!("**Assignments - {}**", target.title))
            .color(0x00F1_C40F)
            .fields(embed_fields);
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Submits (or replaces) your answer to an assignment.
    #[poise::command(slash_command, rename = "submit")]
    pub async fn assignment_submit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Assignment number"] assignment_id: i64,
        #[description = "Your answer"] content: Option<String>,
        #[description = "File to hand in"] attachment: Option<serenity::Attachment>,
    ) -> Result<()> {
        let me = identity(ctx).await?;
        let submission = coursework::submit_assignment(
            &ctx.data().database,
            &me,
            assignment_id,
            content,
            attachment.map(|file| file.url),
        )
        .await?;

        ctx.say(&format!(
            "📬 Submission for assignment #{} saved at {}.",
            submission.assignment_id,
            submission.submitted_at.format("%Y-%m-%d %H:%M UTC")
        ))
        .await?;
        Ok(())
    }

    /// Shows every submission for an assignment (course staff only).
    #[poise::command(slash_command, rename = "submissions")]
    pub async fn assignment_submissions(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Assignment number"] assignment_id: i64,
    ) -> Result<()> {
        let me = identity(ctx).await?;
        let db = &ctx.data().database;
        let submissions = coursework::list_submissions(db, &me, assignment_id).await?;

        if submissions.is_empty() {
            ctx.say(&format!("No submissions for assignment #{assignment_id} yet."))
                .await?;
            return Ok(());
        }

        let names: HashMap<i64, String> =
            get_profiles_by_ids(db, submissions.iter().map(|s| s.user_id).collect())
                .await?
                .into_iter()
                .map(|p| (p.id, p.display_name))
                .collect();

        let header = format!("**Submissions for assignment #{assignment_id}**");
        let lines = std::iter::once(header).chain(submissions.iter().map(|s| {
            let name = names.get(&s.user_id).map_or("unknown", String::as_str);
            let mut line = format!("• **{name}** ({})", s.submitted_at.format("%Y-%m-%d %H:%M"));
            if let Some(content) = &s.content {
                line.push_str(&format!(": {}", format::clip(content, SUBMISSION_PREVIEW)));
            }
            if let Some(url) = &s.attachment_url {
                line.push_str(&format!(" [file]({url})"));
            }
            line
        }));
        ctx.say(format::bounded_lines(lines)).await?;
        Ok(())
    }

    /// Posts an announcement to a course (course staff only).
    #[poise::command(slash_command)]
    pub async fn announce(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Course"]
        #[autocomplete = "autocomplete::autocomplete_my_course_title"]
        course_title: String,
        #[description = "Headline"] title: String,
        #[description = "Announcement text"] body: String,
    ) -> Result<()> {
        let me = identity(ctx).await?;
        let target = resolve_course(ctx, &course_title).await?;
        coursework::post_announcement(&ctx.data().database, &me, target.id, &title, &body)
            .await?;

        ctx.say(&format!("📣 Announcement posted to **{}**.", target.title))
            .await?;
        Ok(())
    }

    /// Shows a course's announcements, newest first.
    #[poise::command(slash_command)]
    pub async fn announcements(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Course"]
        #[autocomplete = "autocomplete::autocomplete_my_course_title"]
        course_title: String,
    ) -> Result<()> {
        let me = identity(ctx).await?;
        let target = resolve_course(ctx, &course_title).await?;
        let posts =
            coursework::list_announcements(&ctx.data().database, &me, target.id).await?;

        if posts.is_empty() {
            ctx.say(&format!("No announcements in **{}**.", target.title))
                .await?;
            return Ok(());
        }

        let (embed_fields, _) = format::fit_fields(posts.iter().take(10).map(|post| {
            (
                format!("{} ({})", post.title, post.created_at.format("%Y-%m-%d")),
                post.body.clone(),
            )
        }));

        let embed = serenity::CreateEmbed::default()
            .title(format!("**Announcements - {}**", target.title))
            .color(0x00E6_7E22)
            .fields(embed_fields);
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

}

// Re-export all commands
pub use inner::*;
