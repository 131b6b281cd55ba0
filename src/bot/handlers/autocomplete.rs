//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggestions are filtered case-insensitively against what the user has typed
//! so far and capped at Discord's limit of 25 choices.

use crate::{
    bot::BotData,
    core::{course, enrollment},
    entities::ApplicationStatus,
    errors::Error,
};
use sea_orm::Iterable;

/// Discord shows at most this many autocomplete choices.
const MAX_CHOICES: usize = 25;

fn matching(candidates: impl IntoIterator<Item = String>, partial: &str) -> Vec<String> {
    let partial_lower = partial.to_lowercase();
    let mut matching: Vec<String> = candidates
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&partial_lower))
        .take(MAX_CHOICES)
        .collect();
    matching.sort();
    matching
}

/// Suggests `"Title (CODE)"` labels from the whole course catalog.
pub async fn autocomplete_course_title(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let Ok(courses) = course::list_courses(&ctx.data().database).await else {
        return Vec::new();
    };
    matching(courses.iter().map(course::course_choice_label), partial)
}

/// Suggests labels of the courses the caller belongs to, as staff or student.
pub async fn autocomplete_my_course_title(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = &ctx.data().database;
    let discord_id = ctx.author().id.to_string();
    let Ok(Some(me)) = crate::core::profile::find_by_discord_id(db, &discord_id).await else {
        return Vec::new();
    };

    let mut mine = Vec::new();
    if let Ok(owned) = course::courses_owned_by(db, me.id).await {
        mine.extend(owned);
    }
    if let Ok(joined) = enrollment::list_enrollments_for_user(db, me.id).await {
        mine.extend(joined.into_iter().map(|(_, c)| c));
    }
    if let Ok(granted) = course::granted_course_ids(db, me.id).await {
        for course_id in granted {
            if let Ok(Some(c)) = course::get_course_by_id(db, course_id).await {
                mine.push(c);
            }
        }
    }
    mine.sort_by_key(|c| c.id);
    mine.dedup_by_key(|c| c.id);
    matching(mine.iter().map(course::course_choice_label), partial)
}

/// Suggests the application statuses.
pub async fn autocomplete_status(
    _ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    matching(
        ApplicationStatus::iter().map(|s| s.as_str().to_string()),
        partial,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_filters_and_sorts() {
        let candidates = vec![
            "Rust Basics".to_string(),
            "Advanced Rust".to_string(),
            "Databases".to_string(),
        ];
        assert_eq!(
            matching(candidates.clone(), "rust"),
            vec!["Advanced Rust".to_string(), "Rust Basics".to_string()]
        );
        assert_eq!(matching(candidates, "").len(), 3);
    }

    #[test]
    fn test_matching_caps_choices() {
        let candidates = (0..40).map(|i| format!("Course {i}"));
        assert_eq!(matching(candidates, "course").len(), MAX_CHOICES);
    }
}
