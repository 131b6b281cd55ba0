//! Profile entity - The identity of a person using the bot.
//!
//! A profile is keyed by the caller's Discord user ID. Every write in `core` takes
//! a resolved profile explicitly instead of reading an ambient session.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Profile database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    /// Unique identifier for the profile
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Discord user ID the profile belongs to
    #[sea_orm(unique)]
    pub discord_id: String,
    /// Name shown in application listings
    pub display_name: String,
    /// Site administrators can review and list every application
    pub is_site_admin: bool,
    /// When the profile was registered
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Profile and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One profile owns many courses
    #[sea_orm(has_many = "super::course::Entity")]
    Courses,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Courses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
