//! Database configuration module for `CourseBuddy`.
//!
//! This module handles the database connection and schema creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs. Multi-column uniqueness cannot be expressed on an entity field, so
//! those indexes are created here right after their tables.

use crate::entities::{
    Announcement, Assignment, Course, CourseAdmin, CourseApplication, Enrollment, Profile,
    Submission, enrollment, submission,
};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema,
    sea_query::{Index, IndexCreateStatement},
};
use std::path::Path;
use tracing::{debug, info};

/// Fallback used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/course_buddy.sqlite?mode=rwc";

/// At most one pending application per (requester, course, kind).
const PENDING_APPLICATION_INDEX: &str = "CREATE UNIQUE INDEX IF NOT EXISTS \
     idx_course_applications_one_pending \
     ON course_applications (user_id, course_id, kind) WHERE status = 'pending'";

/// Gets the database URL from environment variable or returns the default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Directory that must exist before `SQLite` can create the file at `url`.
fn sqlite_parent_dir(url: &str) -> Option<&Path> {
    let path = url.strip_prefix("sqlite://")?.split('?').next()?;
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
///
/// Falls back to a local `SQLite` file if no environment variable is set.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {}", database_url);
    if let Some(dir) = sqlite_parent_dir(&database_url) {
        std::fs::create_dir_all(dir)?;
    }
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all tables and unique indexes if they do not exist yet.
///
/// Tables are created parent-first so foreign keys resolve: profiles, courses,
/// then everything that references them.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    create_table(db, &schema, Profile).await?;
    create_table(db, &schema, Course).await?;
    create_table(db, &schema, Enrollment).await?;
    create_table(db, &schema, CourseApplication).await?;
    create_table(db, &schema, CourseAdmin).await?;
    create_table(db, &schema, Assignment).await?;
    create_table(db, &schema, Submission).await?;
    create_table(db, &schema, Announcement).await?;

    db.execute(builder.build(&enrollment_unique_index())).await?;
    db.execute(builder.build(&submission_unique_index())).await?;
    db.execute_unprepared(PENDING_APPLICATION_INDEX).await?;

    info!("Database tables and unique indexes ensured");
    Ok(())
}

async fn create_table<C, E>(db: &C, schema: &Schema, entity: E) -> Result<()>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut table = schema.create_table_from_entity(entity);
    table.if_not_exists();
    db.execute(builder.build(&table)).await?;
    Ok(())
}

fn enrollment_unique_index() -> IndexCreateStatement {
    Index::create()
        .name("idx_enrollments_user_course")
        .table(Enrollment)
        .col(enrollment::Column::UserId)
        .col(enrollment::Column::CourseId)
        .unique()
        .if_not_exists()
        .to_owned()
}

fn submission_unique_index() -> IndexCreateStatement {
    Index::create()
        .name("idx_submissions_assignment_user")
        .table(Submission)
        .col(submission::Column::AssignmentId)
        .col(submission::Column::UserId)
        .unique()
        .if_not_exists()
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        CourseAdminModel, CourseApplicationModel, CourseModel, EnrollmentModel, ProfileModel,
    };
    use sea_orm::QuerySelect;

    #[test]
    fn test_sqlite_parent_dir() {
        assert_eq!(
            sqlite_parent_dir(DEFAULT_DATABASE_URL),
            Some(Path::new("data"))
        );
        assert_eq!(sqlite_parent_dir("sqlite::memory:"), None);
        assert_eq!(sqlite_parent_dir("sqlite://local.db?mode=rwc"), None);
        assert_eq!(sqlite_parent_dir("postgres://localhost/lms"), None);
    }

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<ProfileModel> = Profile::find().limit(1).all(&db).await?;
        let _: Vec<CourseModel> = Course::find().limit(1).all(&db).await?;
        let _: Vec<EnrollmentModel> = Enrollment::find().limit(1).all(&db).await?;
        let _: Vec<CourseApplicationModel> = CourseApplication::find().limit(1).all(&db).await?;
        let _: Vec<CourseAdminModel> = CourseAdmin::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_repeatable() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
