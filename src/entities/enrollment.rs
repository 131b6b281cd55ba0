//! Enrollment entity - A user's membership in a course.
//!
//! `(user_id, course_id)` is unique; the index is created next to the table in
//! `config::database`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Enrollment database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "enrollments")]
pub struct Model {
    /// Unique identifier for the enrollment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Enrolled profile
    pub user_id: i64,
    /// Course the profile belongs to
    pub course_id: i64,
    /// Membership role, currently always `"student"`
    pub role: String,
    /// Completion percentage, 0..=100
    pub progress: i32,
    /// Set once progress reaches 100
    pub is_completed: bool,
    /// Whether the membership was paid for
    pub is_paid: bool,
    /// External payment reference (order/capture id) for paid enrollments
    pub payment_reference: Option<String>,
    /// When the user joined
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Enrollment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each enrollment belongs to one course
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,
    /// Each enrollment belongs to one profile
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

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
