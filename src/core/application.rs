//! Application business logic - Submitting and reviewing role applications.
//!
//! An application asks for an elevated role (admin or instructor) on a course.
//! It is created `pending` by the requester and moved exactly once by course
//! staff to `approved` or `rejected`. The review writes the application status
//! and the `course_admins` grant inside one database transaction, so a failed
//! review leaves neither write behind.

use crate::{
    core::course::{ensure_course_staff, require_course},
    entities::{
        ApplicationKind, ApplicationStatus, CourseAdmin, CourseApplication, course_admin,
        course_application, profile,
    },
    errors::{Error, Result},
};
use sea_orm::{
    QueryOrder, Set, TransactionTrait,
    prelude::*,
    sea_query::{Expr, OnConflict},
};
use tracing::{error, info, instrument, warn};

/// Longest requester message or rejection reason accepted.
pub const MAX_NOTE_LEN: usize = 1000;

/// Parses a status against the allow-list `pending`, `approved`, `rejected`.
pub fn parse_status(value: &str) -> Result<ApplicationStatus> {
    match value.trim().to_ascii_lowercase().as_str() {
        "pending" => Ok(ApplicationStatus::Pending),
        "approved" => Ok(ApplicationStatus::Approved),
        "rejected" => Ok(ApplicationStatus::Rejected),
        _ => Err(Error::InvalidStatus {
            value: value.to_string(),
        }),
    }
}

/// Parses an application kind, `admin` or `instructor`.
pub fn parse_kind(value: &str) -> Result<ApplicationKind> {
    match value.trim().to_ascii_lowercase().as_str() {
        "admin" => Ok(ApplicationKind::Admin),
        "instructor" => Ok(ApplicationKind::Instructor),
        _ => Err(Error::validation(format!(
            "'{value}' is not an application kind (expected admin or instructor)"
        ))),
    }
}

/// Trims a free-text note; blank becomes `None`.
fn normalize_note(note: Option<String>, field: &str) -> Result<Option<String>> {
    let Some(note) = note else {
        return Ok(None);
    };
    let note = note.trim();
    if note.is_empty() {
        return Ok(None);
    }
    if note.chars().count() > MAX_NOTE_LEN {
        return Err(Error::validation(format!(
            "{field} must be at most {MAX_NOTE_LEN} characters"
        )));
    }
    Ok(Some(note.to_string()))
}

/// Files a new `pending` application for `requester`.
///
/// The store's partial unique index allows one pending application per
/// (requester, course, kind); hitting it is reported as [`Error::AlreadyApplied`].
#[instrument(skip(db, requester, message), fields(requester_id = requester.id))]
pub async fn submit_application(
    db: &DatabaseConnection,
    requester: &profile::Model,
    course_id: i64,
    kind: ApplicationKind,
    message: Option<String>,
) -> Result<course_application::Model> {
    let message = normalize_note(message, "Message")?;
    require_course(db, course_id).await?;

    let now = chrono::Utc::now();
    let application = course_application::ActiveModel {
        user_id: Set(requester.id),
        course_id: Set(course_id),
        kind: Set(kind),
        status: Set(ApplicationStatus::Pending),
        message: Set(message),
        rejection_reason: Set(None),
        reviewed_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    match application.insert(db).await.map_err(Error::from) {
        Ok(created) => {
            info!(application_id = created.id, %kind, "Application submitted");
            Ok(created)
        }
        Err(e) if e.is_conflict() => {
            warn!(%kind, "Duplicate pending application refused");
            Err(Error::AlreadyApplied {
                course_id,
                kind: kind.to_string(),
            })
        }
        Err(e) => {
            error!("Failed to submit application: {}", e);
            Err(e)
        }
    }
}

/// Finds an application by ID.
pub async fn get_application<C>(
    db: &C,
    application_id: i64,
) -> Result<Option<course_application::Model>>
where
    C: ConnectionTrait,
{
    CourseApplication::find_by_id(application_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Every application filed by a profile, newest first.
pub async fn applications_by_requester(
    db: &DatabaseConnection,
    requester_id: i64,
) -> Result<Vec<course_application::Model>> {
    CourseApplication::find()
        .filter(course_application::Column::UserId.eq(requester_id))
        .order_by_desc(course_application::Column::CreatedAt)
        .order_by_desc(course_application::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Moves a pending application to `target` and records the matching grant.
///
/// Both writes run in one transaction:
/// 1. the application row moves from `pending` to `target`, with the rejection
///    reason (only kept when rejecting), reviewer and update time;
/// 2. the `course_admins` row for (requester, course) is upserted with `target`,
///    overwriting any earlier decision for the same pair.
///
/// The status update only matches rows that are still `pending`, so a concurrent
/// review of the same application finds nothing to update and fails with
/// [`Error::InvalidTransition`] instead of overwriting the first decision.
///
/// # Errors
/// - [`Error::Validation`] for an over-long reason and
///   [`Error::InvalidTransition`] for a `pending` target, before any store call
/// - [`Error::ApplicationNotFound`] for an unknown ID
/// - [`Error::Forbidden`] when `reviewer` is not staff on the course, checked
///   before the application's state is looked at
/// - [`Error::InvalidTransition`] when the application is already terminal
#[instrument(skip(db, reviewer, reason), fields(reviewer_id = reviewer.id))]
pub async fn review_application(
    db: &DatabaseConnection,
    reviewer: &profile::Model,
    application_id: i64,
    target: ApplicationStatus,
    reason: Option<String>,
) -> Result<course_application::Model> {
    let reason = match target {
        ApplicationStatus::Rejected => normalize_note(reason, "Reason")?,
        _ => None,
    };

    if target == ApplicationStatus::Pending {
        return Err(Error::InvalidTransition {
            from: "any status".to_string(),
            to: target.to_string(),
        });
    }

    let txn = db.begin().await?;

    let application = get_application(&txn, application_id)
        .await?
        .ok_or(Error::ApplicationNotFound { id: application_id })?;

    // Staff check before the state check: outsiders never see an outcome.
    let course = require_course(&txn, application.course_id).await?;
    ensure_course_staff(&txn, reviewer, &course, "review applications for this course").await?;

    if application.status.is_terminal() {
        return Err(Error::InvalidTransition {
            from: application.status.to_string(),
            to: target.to_string(),
        });
    }

    let now = chrono::Utc::now();
    let updated = CourseApplication::update_many()
        .col_expr(course_application::Column::Status, Expr::value(target))
        .col_expr(
            course_application::Column::RejectionReason,
            Expr::value(reason),
        )
        .col_expr(
            course_application::Column::ReviewedBy,
            Expr::value(Some(reviewer.id)),
        )
        .col_expr(course_application::Column::UpdatedAt, Expr::value(now))
        .filter(course_application::Column::Id.eq(application_id))
        .filter(course_application::Column::Status.eq(ApplicationStatus::Pending))
        .exec(&txn)
        .await?;

    if updated.rows_affected == 0 {
        return Err(Error::InvalidTransition {
            from: "reviewed".to_string(),
            to: target.to_string(),
        });
    }

    upsert_grant(&txn, application.user_id, application.course_id, target, now).await?;

    let reviewed = get_application(&txn, application_id)
        .await?
        .ok_or(Error::ApplicationNotFound { id: application_id })?;

    txn.commit().await?;

    info!(
        application_id,
        course_id = reviewed.course_id,
        status = %reviewed.status,
        "Application reviewed"
    );
    Ok(reviewed)
}

/// Inserts or overwrites the authorization row for (user, course).
async fn upsert_grant<C>(
    db: &C,
    user_id: i64,
    course_id: i64,
    status: ApplicationStatus,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let grant = course_admin::ActiveModel {
        user_id: Set(user_id),
        course_id: Set(course_id),
        status: Set(status),
        updated_at: Set(now),
    };

    CourseAdmin::insert(grant)
        .on_conflict(
            OnConflict::columns([course_admin::Column::UserId, course_admin::Column::CourseId])
                .update_columns([course_admin::Column::Status, course_admin::Column::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Finds the authorization row for (user, course).
pub async fn get_grant(
    db: &DatabaseConnection,
    user_id: i64,
    course_id: i64,
) -> Result<Option<course_admin::Model>> {
    CourseAdmin::find_by_id((user_id, course_id))
        .one(db)
        .await
        .map_err(Into::into)
}
