//! Course entity - One entry of the course catalog.
//!
//! Courses are joined by their `join_code`; a non-zero `price` makes the course
//! paid, so it can only be entered through a recorded payment.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Course database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    /// Unique identifier for the course
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Profile that created and owns the course
    pub owner_id: i64,
    /// Course title shown in the catalog
    pub title: String,
    /// Optional long description
    pub description: Option<String>,
    /// Upper-case code students use to join
    #[sea_orm(unique)]
    pub join_code: String,
    /// Price in dollars, 0.0 for free courses
    pub price: f64,
    /// When the course was created
    pub created_at: DateTimeUtc,
    /// When the course was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Course and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each course belongs to its owner
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::OwnerId",
        to = "super::profile::Column::Id"
    )]
    Owner,
    /// One course has many enrollments
    #[sea_orm(has_many = "super::enrollment::Entity")]
    Enrollments,
    /// One course has many role applications
    #[sea_orm(has_many = "super::course_application::Entity")]
    Applications,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl Related<super::course_application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Applications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether joining requires a payment.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.price > 0.0
    }
}
