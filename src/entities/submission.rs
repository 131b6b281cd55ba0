//! Submission entity - A student's answer to an assignment.
//!
//! One row per `(assignment_id, user_id)`; resubmitting replaces the content.
//! Files are referenced by the public URL they were uploaded to.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Submission database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub assignment_id: i64,
    pub user_id: i64,
    /// Inline answer text
    #[sea_orm(column_type = "Text", nullable)]
    pub content: Option<String>,
    /// Public URL of an uploaded file
    pub attachment_url: Option<String>,
    pub submitted_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assignment::Entity",
        from = "Column::AssignmentId",
        to = "super::assignment::Column::Id"
    )]
    Assignment,
}

impl Related<super::assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
