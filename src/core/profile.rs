//! Profile business logic - Registration and identity resolution.
//!
//! Commands never read an ambient session: they resolve the caller once with
//! [`require_identity`] and pass the resulting profile into every operation.

use crate::{
    entities::{Profile, profile},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use tracing::info;

/// Longest display name accepted at registration.
pub const MAX_DISPLAY_NAME_LEN: usize = 64;

/// Registers a profile for a Discord user.
///
/// The display name is trimmed and must be non-empty and at most
/// [`MAX_DISPLAY_NAME_LEN`] characters. Registering the same Discord ID twice
/// surfaces as [`Error::Conflict`] from the unique `discord_id` column.
pub async fn register_profile(
    db: &DatabaseConnection,
    discord_id: &str,
    display_name: &str,
    is_site_admin: bool,
) -> Result<profile::Model> {
    let display_name = display_name.trim();
    if display_name.is_empty() {
        return Err(Error::validation("Display name cannot be empty"));
    }
    if display_name.chars().count() > MAX_DISPLAY_NAME_LEN {
        return Err(Error::validation(format!(
            "Display name must be at most {MAX_DISPLAY_NAME_LEN} characters"
        )));
    }

    let profile = profile::ActiveModel {
        discord_id: Set(discord_id.to_string()),
        display_name: Set(display_name.to_string()),
        is_site_admin: Set(is_site_admin),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let created = profile.insert(db).await?;
    info!(profile_id = created.id, is_site_admin, "Registered profile");
    Ok(created)
}

/// Finds the profile registered for a Discord user, if any.
pub async fn find_by_discord_id(
    db: &DatabaseConnection,
    discord_id: &str,
) -> Result<Option<profile::Model>> {
    Profile::find()
        .filter(profile::Column::DiscordId.eq(discord_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Resolves the caller's identity, failing with [`Error::AuthenticationRequired`]
/// when the Discord user has not registered.
pub async fn require_identity(db: &DatabaseConnection, discord_id: &str) -> Result<profile::Model> {
    find_by_discord_id(db, discord_id)
        .await?
        .ok_or(Error::AuthenticationRequired)
}

/// Loads profiles by ID; missing IDs are simply absent from the result.
pub async fn get_profiles_by_ids<C>(db: &C, ids: Vec<i64>) -> Result<Vec<profile::Model>>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    Profile::find()
        .filter(profile::Column::Id.is_in(ids))
        .all(db)
        .await
        .map_err(Into::into)
}
