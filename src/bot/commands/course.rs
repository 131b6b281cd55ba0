//! Course Discord commands - catalog browsing, course creation and enrollment.
//!
//! All commands live under the `/course` parent command.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, format, handlers::autocomplete, identity, resolve_course},
        core::{
            course,
            enrollment::{self, EnrollOutcome},
        },
        entities,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    fn price_label(price: f64) -> String {
        if price > 0.0 {
            format!("${price:.2}")
        } else {
            "Free".to_string()
        }
    }

    /// Parent command for the course catalog and your enrollments.
    #[poise::command(
        slash_command,
        subcommands(
            "course_list",
            "course_create",
            "course_join",
            "course_buy",
            "course_mine",
            "course_progress"
        )
    )]
    pub async fn course(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Course command. Available subcommands:\n\
            `/course list` - Show the catalog\n\
            `/course create` - Create a course you own\n\
            `/course join` - Join a free course by code\n\
            `/course buy` - Enroll in a paid course\n\
            `/course mine` - Show your courses\n\
            `/course progress` - Record your progress";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Lists every course in the catalog.
    #[poise::command(slash_command, rename = "list")]
    pub async fn course_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let courses = course::list_courses(&ctx.data().database).await?;

        if courses.is_empty() {
            ctx.say("📚 The catalog is empty. Create a course with `/course create`!")
                .await?;
            return Ok(());
        }

        let (embed_fields, omitted) = format::fit_fields(courses.iter().map(|c| {
            let value = c
                .description
                .clone()
                .unwrap_or_else(|| "No description".to_string());
            (
                format!("{} ({})", course::course_choice_label(c), price_label(c.price)),
                value,
            )
        }));

        let mut embed = serenity::CreateEmbed::default()
            .title("**Course Catalog**")
            .color(0x0058_65F2)
            .fields(embed_fields);
        if omitted > 0 {
            embed = embed.footer(serenity::CreateEmbedFooter::new(format!(
                "{omitted} more courses. Use autocomplete to find them by title."
            )));
        }
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Creates a new course owned by you.
    #[poise::command(slash_command, rename = "create")]
    pub async fn course_create(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Course title"] title: String,
        #[description = "Join code, 4-16 letters or digits"] join_code: String,
        #[description = "Price in dollars (defaults to free)"] price: Option<f64>,
        #[description = "Short description"] description: Option<String>,
    ) -> Result<()> {
        let me = identity(ctx).await?;
        let db = &ctx.data().database;

        match course::create_course(db, &me, &title, description, &join_code, price.unwrap_or(0.0))
            .await
        {
            Ok(created) => {
                ctx.say(&format!(
                    "✅ Course **{}** created. Students join with code `{}` ({}).",
                    created.title,
                    created.join_code,
                    price_label(created.price)
                ))
                .await?;
            }
            Err(Error::Conflict { .. }) => {
                ctx.say(&format!(
                    "⚠️ The join code `{}` is already taken. Pick another one.",
                    join_code.trim().to_ascii_uppercase()
                ))
                .await?;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    /// Joins a free course using its join code.
    #[poise::command(slash_command, rename = "join")]
    pub async fn course_join(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Join code shared by the instructor"] code: String,
    ) -> Result<()> {
        let me = identity(ctx).await?;
        let outcome = enrollment::join_by_code(&ctx.data().database, &me, &code).await?;

        let message = match outcome {
            EnrollOutcome::Enrolled(_) => "🎉 You joined the course!".to_string(),
            EnrollOutcome::AlreadyEnrolled(_) => "ℹ️ You are already enrolled in this course.".to_string(),
        };
        ctx.say(message).await?;
        Ok(())
    }

    /// Enrolls you in a paid course with a captured payment.
    #[poise::command(slash_command, rename = "buy")]
    pub async fn course_buy(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Course to enroll in"]
        #[autocomplete = "autocomplete::autocomplete_course_title"]
        course_title: String,
        #[description = "Payment order or capture ID"] payment_reference: String,
    ) -> Result<()> {
        let me = identity(ctx).await?;
        let target = resolve_course(ctx, &course_title).await?;

        let outcome =
            enrollment::enroll_paid(&ctx.data().database, &me, target.id, &payment_reference)
                .await?;
        let message = match outcome {
            EnrollOutcome::Enrolled(_) => format!(
                "✅ Payment recorded. Welcome to **{}**!",
                target.title
            ),
            EnrollOutcome::AlreadyEnrolled(_) => format!(
                "ℹ️ You are already enrolled in **{}**; no new payment was recorded.",
                target.title
            ),
        };
        ctx.say(message).await?;
        Ok(())
    }

    /// Shows the courses you are enrolled in and the ones you teach.
    #[poise::command(slash_command, rename = "mine")]
    pub async fn course_mine(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let me = identity(ctx).await?;
        let db = &ctx.data().database;

        let enrolled = enrollment::list_enrollments_for_user(db, me.id).await?;
        let owned = course::courses_owned_by(db, me.id).await?;

        if enrolled.is_empty() && owned.is_empty() {
            ctx.say("📚 You have no courses yet. Try `/course list` and `/course join`.")
                .await?;
            return Ok(());
        }

        ctx.say(format::bounded_lines(mine_lines(&owned, &enrolled)))
            .await?;
        Ok(())
    }

    fn mine_lines(
        owned: &[entities::course::Model],
        enrolled: &[(entities::enrollment::Model, entities::course::Model)],
    ) -> Vec<String> {
        let mut lines = Vec::new();
        if !owned.is_empty() {
            lines.push("**Teaching**".to_string());
            lines.extend(
                owned
                    .iter()
                    .map(|c| format!("• {} (code `{}`)", c.title, c.join_code)),
            );
        }
        if !enrolled.is_empty() {
            lines.push("**Enrolled**".to_string());
            lines.extend(enrolled.iter().map(|(membership, c)| {
                let status = if membership.is_completed {
                    "✅ completed".to_string()
                } else {
                    format!("{}%", membership.progress)
                };
                format!("• {} - {status}", c.title)
            }));
        }
        lines
    }

    /// Records your progress in a course.
    #[poise::command(slash_command, rename = "progress")]
    pub async fn course_progress(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Course"]
        #[autocomplete = "autocomplete::autocomplete_my_course_title"]
        course_title: String,
        #[description = "Progress in percent (0-100)"] percent: i32,
    ) -> Result<()> {
        let me = identity(ctx).await?;
        let target = resolve_course(ctx, &course_title).await?;

        let updated =
            enrollment::update_progress(&ctx.data().database, &me, target.id, percent).await?;
        if updated.is_completed {
            ctx.say(&format!("🏁 Congratulations, you completed **{}**!", target.title))
                .await?;
        } else {
            ctx.say(&format!(
                "📈 Progress in **{}** is now {}%.",
                target.title, updated.progress
            ))
            .await?;
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::test_utils::*;

        #[tokio::test]
        async fn test_long_course_list_fits_one_message() -> Result<()> {
            let db = setup_test_db().await?;
            let owner = create_test_profile(&db, "owner").await?;
            let mut owned = Vec::new();
            for i in 0..120 {
                let title = format!("Course number {i} with a fairly long descriptive title");
                owned.push(create_custom_course(&db, &owner, &title, &format!("BULK{i}"), 0.0).await?);
            }

            let lines = mine_lines(&owned, &[]);
            assert_eq!(lines.len(), 121);
            let text = format::bounded_lines(lines);
            assert!(text.chars().count() <= format::MESSAGE_MAX);
            assert!(text.starts_with("**Teaching**"));
            assert!(text.trim_end().ends_with("more"));

            Ok(())
        }
    }
}

// Re-export all commands
pub use inner::*;
