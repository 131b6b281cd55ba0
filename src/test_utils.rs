//! Shared test utilities for `CourseBuddy`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{course, profile},
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Builds a profile model without touching the database, for validation tests
/// running against a `MockDatabase`.
#[must_use]
pub fn fake_profile(id: i64) -> entities::profile::Model {
    entities::profile::Model {
        id,
        discord_id: id.to_string(),
        display_name: format!("user{id}"),
        is_site_admin: false,
        created_at: chrono::Utc::now(),
    }
}

/// Registers a regular profile whose Discord ID and display name are both `name`.
pub async fn create_test_profile(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::profile::Model> {
    profile::register_profile(db, name, name, false).await
}

/// Registers a site administrator profile.
pub async fn create_site_admin(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::profile::Model> {
    profile::register_profile(db, name, name, true).await
}

/// Creates a free test course. The join code is derived from the title.
///
/// # Defaults
/// * `description`: None
/// * `price`: 0.0
/// * `join_code`: letters and digits of the title, upper-cased, plus `"CODE"`
pub async fn create_test_course(
    db: &DatabaseConnection,
    owner: &entities::profile::Model,
    title: &str,
) -> Result<entities::course::Model> {
    let mut join_code: String = title
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(12)
        .collect();
    join_code.push_str("CODE");
    create_custom_course(db, owner, title, &join_code, 0.0).await
}

/// Creates a test course with custom join code and price.
pub async fn create_custom_course(
    db: &DatabaseConnection,
    owner: &entities::profile::Model,
    title: &str,
    join_code: &str,
    price: f64,
) -> Result<entities::course::Model> {
    course::create_course(db, owner, title, None, join_code, price).await
}

/// Sets up a database with one owner and one free course.
/// Returns (db, owner, course) for common test scenarios.
pub async fn setup_with_course() -> Result<(
    DatabaseConnection,
    entities::profile::Model,
    entities::course::Model,
)> {
    let db = setup_test_db().await?;
    let owner = create_test_profile(&db, "owner").await?;
    let course = create_test_course(&db, &owner, "Intro to Rust").await?;
    Ok((db, owner, course))
}
