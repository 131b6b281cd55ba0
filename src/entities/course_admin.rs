//! Course admin entity - The authorization row granted by an approved application.
//!
//! Keyed by `(user_id, course_id)`. Reviews upsert it, so a later decision for the
//! same pair overwrites the earlier status.

use super::course_application::ApplicationStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Course admin database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "course_admins")]
pub struct Model {
    /// Granted profile
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,
    /// Course the grant applies to
    #[sea_orm(primary_key, auto_increment = false)]
    pub course_id: i64,
    /// Status copied from the deciding review
    pub status: ApplicationStatus,
    /// When the grant was last written
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `CourseAdmin` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::UserId",
        to = "super::profile::Column::Id"
    )]
    Profile,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
