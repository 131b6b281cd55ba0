//! Coursework business logic - Assignments, submissions and announcements.
//!
//! Staff publish assignments and announcements; enrolled students read them and
//! submit answers. A submission carries inline text, the public URL of an
//! uploaded file, or both. Resubmitting replaces the previous answer.

use crate::{
    core::{
        course::{ensure_course_staff, is_course_staff, require_course},
        enrollment::is_enrolled,
    },
    entities::{
        Announcement, Assignment, Submission, announcement, assignment, course, profile,
        submission,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::OnConflict};
use tracing::info;

/// Longest assignment or announcement title accepted.
pub const MAX_TITLE_LEN: usize = 200;

fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::validation("Title cannot be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(Error::validation(format!(
            "Title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(title.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Fails with [`Error::Forbidden`] unless `user` is staff or enrolled.
async fn ensure_member(
    db: &DatabaseConnection,
    user: &profile::Model,
    course: &course::Model,
) -> Result<()> {
    if is_course_staff(db, user, course).await? || is_enrolled(db, user.id, course.id).await? {
        Ok(())
    } else {
        Err(Error::forbidden("view a course you are not enrolled in"))
    }
}

/// Publishes an assignment. Staff only.
pub async fn create_assignment(
    db: &DatabaseConnection,
    author: &profile::Model,
    course_id: i64,
    title: &str,
    description: Option<String>,
    due_at: Option<DateTimeUtc>,
) -> Result<assignment::Model> {
    let title = validate_title(title)?;
    let course = require_course(db, course_id).await?;
    ensure_course_staff(db, author, &course, "publish assignments").await?;

    let assignment = assignment::ActiveModel {
        course_id: Set(course.id),
        title: Set(title),
        description: Set(non_blank(description)),
        due_at: Set(due_at),
        created_by: Set(author.id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let created = assignment.insert(db).await?;
    info!(assignment_id = created.id, course_id, "Published assignment");
    Ok(created)
}

/// Finds an assignment or fails with [`Error::AssignmentNotFound`].
pub async fn require_assignment(
    db: &DatabaseConnection,
    assignment_id: i64,
) -> Result<assignment::Model> {
    Assignment::find_by_id(assignment_id)
        .one(db)
        .await?
        .ok_or(Error::AssignmentNotFound { id: assignment_id })
}

/// Lists a course's assignments, newest first. Members only.
pub async fn list_assignments(
    db: &DatabaseConnection,
    viewer: &profile::Model,
    course_id: i64,
) -> Result<Vec<assignment::Model>> {
    let course = require_course(db, course_id).await?;
    ensure_member(db, viewer, &course).await?;

    Assignment::find()
        .filter(assignment::Column::CourseId.eq(course_id))
        .order_by_desc(assignment::Column::CreatedAt)
        .order_by_desc(assignment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Submits (or resubmits) an answer to an assignment.
///
/// The student must be enrolled in the assignment's course. At least one of
/// `content` and `attachment_url` is required, and the attachment must be an
/// `http`/`https` URL.
pub async fn submit_assignment(
    db: &DatabaseConnection,
    student: &profile::Model,
    assignment_id: i64,
    content: Option<String>,
    attachment_url: Option<String>,
) -> Result<submission::Model> {
    let content = non_blank(content);
    let attachment_url = non_blank(attachment_url);
    if content.is_none() && attachment_url.is_none() {
        return Err(Error::validation(
            "A submission needs text content or an attachment",
        ));
    }
    if let Some(url) = &attachment_url {
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(Error::validation("Attachment must be an http(s) URL"));
        }
    }

    let assignment = require_assignment(db, assignment_id).await?;
    if !is_enrolled(db, student.id, assignment.course_id).await? {
        return Err(Error::forbidden(
            "submit work for a course you are not enrolled in",
        ));
    }

    let submission = submission::ActiveModel {
        assignment_id: Set(assignment.id),
        user_id: Set(student.id),
        content: Set(content),
        attachment_url: Set(attachment_url),
        submitted_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    Submission::insert(submission)
        .on_conflict(
            OnConflict::columns([submission::Column::AssignmentId, submission::Column::UserId])
                .update_columns([
                    submission::Column::Content,
                    submission::Column::AttachmentUrl,
                    submission::Column::SubmittedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    info!(assignment_id, user_id = student.id, "Stored submission");
    Submission::find()
        .filter(submission::Column::AssignmentId.eq(assignment_id))
        .filter(submission::Column::UserId.eq(student.id))
        .one(db)
        .await?
        .ok_or_else(|| Error::Database(DbErr::RecordNotFound("submission".to_string())))
}

/// Lists all submissions for an assignment. Staff only.
pub async fn list_submissions(
    db: &DatabaseConnection,
    staff: &profile::Model,
    assignment_id: i64,
) -> Result<Vec<submission::Model>> {
    let assignment = require_assignment(db, assignment_id).await?;
    let course = require_course(db, assignment.course_id).await?;
    ensure_course_staff(db, staff, &course, "read submissions").await?;

    Submission::find()
        .filter(submission::Column::AssignmentId.eq(assignment_id))
        .order_by_asc(submission::Column::SubmittedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Posts an announcement to a course. Staff only.
pub async fn post_announcement(
    db: &DatabaseConnection,
    author: &profile::Model,
    course_id: i64,
    title: &str,
    body: &str,
) -> Result<announcement::Model> {
    let title = validate_title(title)?;
    let body = body.trim();
    if body.is_empty() {
        return Err(Error::validation("Announcement body cannot be empty"));
    }
    let course = require_course(db, course_id).await?;
    ensure_course_staff(db, author, &course, "post announcements").await?;

    let announcement = announcement::ActiveModel {
        course_id: Set(course.id),
        author_id: Set(author.id),
        title: Set(title),
        body: Set(body.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    announcement.insert(db).await.map_err(Into::into)
}

/// Lists a course's announcements, newest first. Members only.
pub async fn list_announcements(
    db: &DatabaseConnection,
    viewer: &profile::Model,
    course_id: i64,
) -> Result<Vec<announcement::Model>> {
    let course = require_course(db, course_id).await?;
    ensure_member(db, viewer, &course).await?;

    Announcement::find()
        .filter(announcement::Column::CourseId.eq(course_id))
        .order_by_desc(announcement::Column::CreatedAt)
        .order_by_desc(announcement::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::enrollment::join_by_code;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase, PaginatorTrait};

    #[tokio::test]
    async fn test_submission_validation_before_store() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let student = fake_profile(1);

        let result = submit_assignment(&db, &student, 1, Some("  ".to_string()), None).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result = submit_assignment(
            &db,
            &student,
            1,
            None,
            Some("ftp://files/answer.pdf".to_string()),
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_only_staff_publish() -> Result<()> {
        let (db, owner, course) = setup_with_course().await?;
        let student = create_test_profile(&db, "student").await?;

        let result = create_assignment(&db, &student, course.id, "Essay", None, None).await;
        assert!(matches!(result.unwrap_err(), Error::Forbidden { .. }));
        let result = post_announcement(&db, &student, course.id, "Hi", "Hello").await;
        assert!(matches!(result.unwrap_err(), Error::Forbidden { .. }));

        let assignment = create_assignment(&db, &owner, course.id, " Essay ", None, None).await?;
        assert_eq!(assignment.title, "Essay");

        Ok(())
    }

    #[tokio::test]
    async fn test_members_read_coursework() -> Result<()> {
        let (db, owner, course) = setup_with_course().await?;
        let student = create_test_profile(&db, "student").await?;
        let outsider = create_test_profile(&db, "outsider").await?;
        join_by_code(&db, &student, &course.join_code).await?;

        create_assignment(&db, &owner, course.id, "Week 1", None, None).await?;
        let second = create_assignment(&db, &owner, course.id, "Week 2", None, None).await?;
        post_announcement(&db, &owner, course.id, "Welcome", "Read chapter one").await?;

        let assignments = list_assignments(&db, &student, course.id).await?;
        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[0].id, second.id);

        let announcements = list_announcements(&db, &student, course.id).await?;
        assert_eq!(announcements.len(), 1);
        assert_eq!(announcements[0].body, "Read chapter one");

        let result = list_assignments(&db, &outsider, course.id).await;
        assert!(matches!(result.unwrap_err(), Error::Forbidden { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_resubmission_replaces_answer() -> Result<()> {
        let (db, owner, course) = setup_with_course().await?;
        let student = create_test_profile(&db, "student").await?;
        join_by_code(&db, &student, &course.join_code).await?;
        let assignment = create_assignment(&db, &owner, course.id, "Essay", None, None).await?;

        submit_assignment(&db, &student, assignment.id, Some("draft".to_string()), None).await?;
        let final_answer = submit_assignment(
            &db,
            &student,
            assignment.id,
            None,
            Some("https://files.example.com/essay.pdf".to_string()),
        )
        .await?;

        assert!(final_answer.content.is_none());
        assert_eq!(
            final_answer.attachment_url.as_deref(),
            Some("https://files.example.com/essay.pdf")
        );
        assert_eq!(Submission::find().count(&db).await?, 1);

        let submissions = list_submissions(&db, &owner, assignment.id).await?;
        assert_eq!(submissions.len(), 1);
        let result = list_submissions(&db, &student, assignment.id).await;
        assert!(matches!(result.unwrap_err(), Error::Forbidden { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_submit_requires_enrollment() -> Result<()> {
        let (db, owner, course) = setup_with_course().await?;
        let outsider = create_test_profile(&db, "outsider").await?;
        let assignment = create_assignment(&db, &owner, course.id, "Essay", None, None).await?;

        let result =
            submit_assignment(&db, &outsider, assignment.id, Some("hi".to_string()), None).await;
        assert!(matches!(result.unwrap_err(), Error::Forbidden { .. }));

        let result = submit_assignment(&db, &outsider, 999, Some("hi".to_string()), None).await;
        assert!(matches!(result.unwrap_err(), Error::AssignmentNotFound { id: 999 }));

        Ok(())
    }
}
