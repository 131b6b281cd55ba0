//! Enrollment business logic - Joining courses by code or by payment.
//!
//! There is no "already enrolled?" read before the insert. The unique
//! `(user_id, course_id)` index is the only guard: a conflicting insert loads the
//! existing row and reports [`EnrollOutcome::AlreadyEnrolled`], so two concurrent
//! joins still leave exactly one enrollment.

use crate::{
    core::course::{get_course_by_join_code, require_course},
    entities::{Course, Enrollment, course, enrollment, profile},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Role recorded for members who joined as students.
pub const STUDENT_ROLE: &str = "student";

/// Result of an enrollment attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollOutcome {
    /// A new membership was created.
    Enrolled(enrollment::Model),
    /// The user was already a member; the existing row is returned unchanged.
    AlreadyEnrolled(enrollment::Model),
}

impl EnrollOutcome {
    /// The enrollment row, new or existing.
    #[must_use]
    pub const fn enrollment(&self) -> &enrollment::Model {
        match self {
            Self::Enrolled(e) | Self::AlreadyEnrolled(e) => e,
        }
    }
}

/// How the membership is being paid for.
enum Payment<'a> {
    Free,
    Paid { reference: &'a str },
}

/// Joins a free course by its join code.
///
/// # Errors
/// - [`Error::CourseNotFound`] for an unknown code
/// - [`Error::PaymentRequired`] when the course has a price
#[instrument(skip(db, user), fields(user_id = user.id))]
pub async fn join_by_code(
    db: &DatabaseConnection,
    user: &profile::Model,
    join_code: &str,
) -> Result<EnrollOutcome> {
    let course = get_course_by_join_code(db, join_code)
        .await?
        .ok_or_else(|| Error::CourseNotFound {
            reference: join_code.trim().to_string(),
        })?;

    if course.is_paid() {
        return Err(Error::PaymentRequired {
            course_id: course.id,
        });
    }

    enroll(db, user, &course, Payment::Free).await
}

/// Enrolls `user` in a paid course once the payment has been captured.
///
/// `payment_reference` is the external order/capture ID and must not be blank.
#[instrument(skip(db, user, payment_reference), fields(user_id = user.id))]
pub async fn enroll_paid(
    db: &DatabaseConnection,
    user: &profile::Model,
    course_id: i64,
    payment_reference: &str,
) -> Result<EnrollOutcome> {
    let reference = payment_reference.trim();
    if reference.is_empty() {
        return Err(Error::validation("Payment reference cannot be empty"));
    }

    let course = require_course(db, course_id).await?;
    enroll(db, user, &course, Payment::Paid { reference }).await
}

async fn enroll(
    db: &DatabaseConnection,
    user: &profile::Model,
    course: &course::Model,
    payment: Payment<'_>,
) -> Result<EnrollOutcome> {
    let (is_paid, payment_reference) = match payment {
        Payment::Free => (false, None),
        Payment::Paid { reference } => (true, Some(reference.to_string())),
    };

    let enrollment = enrollment::ActiveModel {
        user_id: Set(user.id),
        course_id: Set(course.id),
        role: Set(STUDENT_ROLE.to_string()),
        progress: Set(0),
        is_completed: Set(false),
        is_paid: Set(is_paid),
        payment_reference: Set(payment_reference),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    match enrollment.insert(db).await.map_err(Error::from) {
        Ok(created) => {
            info!(course_id = course.id, is_paid, "Enrolled in course");
            Ok(EnrollOutcome::Enrolled(created))
        }
        Err(e) if e.is_conflict() => {
            let existing = get_enrollment(db, user.id, course.id).await?.ok_or(e)?;
            info!(course_id = course.id, "Already enrolled");
            Ok(EnrollOutcome::AlreadyEnrolled(existing))
        }
        Err(e) => Err(e),
    }
}

/// Finds the enrollment of `user_id` in `course_id`.
pub async fn get_enrollment<C>(
    db: &C,
    user_id: i64,
    course_id: i64,
) -> Result<Option<enrollment::Model>>
where
    C: ConnectionTrait,
{
    Enrollment::find()
        .filter(enrollment::Column::UserId.eq(user_id))
        .filter(enrollment::Column::CourseId.eq(course_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Whether `user_id` is a member of `course_id`.
pub async fn is_enrolled<C>(db: &C, user_id: i64, course_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    Ok(get_enrollment(db, user_id, course_id).await?.is_some())
}

/// The user's memberships with their courses, newest first.
pub async fn list_enrollments_for_user(
    db: &DatabaseConnection,
    user_id: i64,
) -> Result<Vec<(enrollment::Model, course::Model)>> {
    let rows = Enrollment::find()
        .filter(enrollment::Column::UserId.eq(user_id))
        .order_by_desc(enrollment::Column::CreatedAt)
        .order_by_desc(enrollment::Column::Id)
        .find_also_related(Course)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(enrollment, course)| course.map(|c| (enrollment, c)))
        .collect())
}

/// All memberships of a course, oldest first.
pub async fn list_enrollments_for_course(
    db: &DatabaseConnection,
    course_id: i64,
) -> Result<Vec<enrollment::Model>> {
    Enrollment::find()
        .filter(enrollment::Column::CourseId.eq(course_id))
        .order_by_asc(enrollment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Records a student's progress (0..=100); reaching 100 marks the course completed.
pub async fn update_progress(
    db: &DatabaseConnection,
    user: &profile::Model,
    course_id: i64,
    progress: i32,
) -> Result<enrollment::Model> {
    if !(0..=100).contains(&progress) {
        return Err(Error::validation("Progress must be between 0 and 100"));
    }

    let existing = get_enrollment(db, user.id, course_id)
        .await?
        .ok_or_else(|| Error::forbidden("track progress in a course you are not enrolled in"))?;

    let mut active: enrollment::ActiveModel = existing.into();
    active.progress = Set(progress);
    active.is_completed = Set(progress == 100);
    active.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase, PaginatorTrait};

    #[tokio::test]
    async fn test_join_by_code_twice_leaves_one_row() -> Result<()> {
        let (db, _owner, course) = setup_with_course().await?;
        let student = create_test_profile(&db, "student").await?;

        let first = join_by_code(&db, &student, &course.join_code).await?;
        assert!(matches!(first, EnrollOutcome::Enrolled(_)));

        let second = join_by_code(&db, &student, &course.join_code.to_lowercase()).await?;
        assert!(matches!(second, EnrollOutcome::AlreadyEnrolled(_)));
        assert_eq!(second.enrollment().id, first.enrollment().id);

        let rows = Enrollment::find().count(&db).await?;
        assert_eq!(rows, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_join_unknown_code() -> Result<()> {
        let db = setup_test_db().await?;
        let student = create_test_profile(&db, "student").await?;

        let result = join_by_code(&db, &student, "NOPE1234").await;
        assert!(matches!(result.unwrap_err(), Error::CourseNotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_paid_course_requires_payment() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = create_test_profile(&db, "owner").await?;
        let student = create_test_profile(&db, "student").await?;
        let course = create_custom_course(&db, &owner, "Premium", "PREMIUM1", 25.0).await?;

        let result = join_by_code(&db, &student, "PREMIUM1").await;
        assert!(matches!(result.unwrap_err(), Error::PaymentRequired { .. }));
        assert!(!is_enrolled(&db, student.id, course.id).await?);

        let outcome = enroll_paid(&db, &student, course.id, " PAYPAL-ORDER-77 ").await?;
        let enrollment = outcome.enrollment();
        assert!(enrollment.is_paid);
        assert_eq!(enrollment.payment_reference.as_deref(), Some("PAYPAL-ORDER-77"));

        let again = enroll_paid(&db, &student, course.id, "PAYPAL-ORDER-78").await?;
        assert!(matches!(again, EnrollOutcome::AlreadyEnrolled(_)));
        assert_eq!(
            again.enrollment().payment_reference.as_deref(),
            Some("PAYPAL-ORDER-77")
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_enroll_paid_requires_reference() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let student = fake_profile(1);

        let result = enroll_paid(&db, &student, 1, "   ").await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_progress_tracking() -> Result<()> {
        let (db, _owner, course) = setup_with_course().await?;
        let student = create_test_profile(&db, "student").await?;
        let outsider = create_test_profile(&db, "outsider").await?;
        join_by_code(&db, &student, &course.join_code).await?;

        let halfway = update_progress(&db, &student, course.id, 50).await?;
        assert_eq!(halfway.progress, 50);
        assert!(!halfway.is_completed);

        let done = update_progress(&db, &student, course.id, 100).await?;
        assert!(done.is_completed);

        let result = update_progress(&db, &student, course.id, 101).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let result = update_progress(&db, &outsider, course.id, 10).await;
        assert!(matches!(result.unwrap_err(), Error::Forbidden { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_enrollments() -> Result<()> {
        let (db, owner, course) = setup_with_course().await?;
        let second_course = create_test_course(&db, &owner, "Second").await?;
        let student = create_test_profile(&db, "student").await?;

        join_by_code(&db, &student, &course.join_code).await?;
        join_by_code(&db, &student, &second_course.join_code).await?;

        let mine = list_enrollments_for_user(&db, student.id).await?;
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].1.id, second_course.id);

        let members = list_enrollments_for_course(&db, course.id).await?;
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].user_id, student.id);

        Ok(())
    }
}
