//! Course business logic - Catalog management and course staff checks.
//!
//! A course's staff is its owner, any site administrator, and every profile
//! holding an approved `course_admins` grant for it. Staff review applications
//! and publish coursework.

use crate::{
    config::courses::Config,
    entities::{ApplicationStatus, Course, CourseAdmin, course, course_admin, profile},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument, warn};

/// Longest course title accepted.
pub const MAX_COURSE_TITLE_LEN: usize = 100;

/// Validates and normalizes a join code to upper case.
///
/// Join codes are 4 to 16 ASCII letters or digits.
pub fn normalize_join_code(code: &str) -> Result<String> {
    let code = code.trim();
    if !(4..=16).contains(&code.len()) || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::validation(
            "Join code must be 4 to 16 letters or digits",
        ));
    }
    Ok(code.to_ascii_uppercase())
}

/// Creates a course owned by `owner`.
///
/// Validates a non-empty title, a well-formed join code and a finite,
/// non-negative price. A join code already in use surfaces as [`Error::Conflict`].
pub async fn create_course(
    db: &DatabaseConnection,
    owner: &profile::Model,
    title: &str,
    description: Option<String>,
    join_code: &str,
    price: f64,
) -> Result<course::Model> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::validation("Course title cannot be empty"));
    }
    if title.chars().count() > MAX_COURSE_TITLE_LEN {
        return Err(Error::validation(format!(
            "Course title must be at most {MAX_COURSE_TITLE_LEN} characters"
        )));
    }
    let join_code = normalize_join_code(join_code)?;
    if !price.is_finite() || price < 0.0 {
        return Err(Error::validation("Price must be zero or a positive amount"));
    }

    let now = chrono::Utc::now();
    let course = course::ActiveModel {
        owner_id: Set(owner.id),
        title: Set(title.to_string()),
        description: Set(description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())),
        join_code: Set(join_code),
        price: Set(price),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let created = course.insert(db).await?;
    info!(course_id = created.id, owner_id = owner.id, "Created course");
    Ok(created)
}

/// Finds a course by its unique ID.
pub async fn get_course_by_id<C>(db: &C, course_id: i64) -> Result<Option<course::Model>>
where
    C: ConnectionTrait,
{
    Course::find_by_id(course_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a course by ID or fails with [`Error::CourseNotFound`].
pub async fn require_course<C>(db: &C, course_id: i64) -> Result<course::Model>
where
    C: ConnectionTrait,
{
    get_course_by_id(db, course_id)
        .await?
        .ok_or_else(|| Error::CourseNotFound {
            reference: course_id.to_string(),
        })
}

/// Finds a course by join code, ignoring case.
pub async fn get_course_by_join_code(
    db: &DatabaseConnection,
    join_code: &str,
) -> Result<Option<course::Model>> {
    Course::find()
        .filter(course::Column::JoinCode.eq(join_code.trim().to_ascii_uppercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Courses carrying exactly this title. Titles are not unique.
pub async fn courses_titled(db: &DatabaseConnection, title: &str) -> Result<Vec<course::Model>> {
    Course::find()
        .filter(course::Column::Title.eq(title.trim()))
        .order_by_asc(course::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Label offered by autocomplete, `"Title (CODE)"`. [`resolve_course_reference`]
/// reads the join code back out of it.
#[must_use]
pub fn course_choice_label(course: &course::Model) -> String {
    format!("{} ({})", course.title, course.join_code)
}

/// Join code in a trailing `"(CODE)"`, if the reference carries one.
fn join_code_in_label(reference: &str) -> Option<&str> {
    let inner = reference.trim().strip_suffix(')')?;
    let (_, code) = inner.rsplit_once('(')?;
    normalize_join_code(code).ok().map(|_| code)
}

/// Resolves what a user typed or picked into exactly one course.
///
/// Accepts an autocomplete label `"Title (CODE)"`, a bare join code, or a
/// title. A title shared by several courses is refused with a validation error
/// naming their join codes, never resolved to an arbitrary one.
pub async fn resolve_course_reference(
    db: &DatabaseConnection,
    reference: &str,
) -> Result<course::Model> {
    let not_found = || Error::CourseNotFound {
        reference: reference.trim().to_string(),
    };

    if let Some(code) = join_code_in_label(reference) {
        return get_course_by_join_code(db, code).await?.ok_or_else(not_found);
    }

    let mut titled = courses_titled(db, reference).await?;
    match titled.len() {
        0 => {}
        1 => return titled.pop().ok_or_else(not_found),
        _ => {
            let codes: Vec<&str> = titled.iter().map(|c| c.join_code.as_str()).collect();
            return Err(Error::validation(format!(
                "Several courses are titled '{}'. Pick one by join code: {}",
                reference.trim(),
                codes.join(", ")
            )));
        }
    }

    if normalize_join_code(reference).is_ok() {
        if let Some(found) = get_course_by_join_code(db, reference).await? {
            return Ok(found);
        }
    }
    Err(not_found())
}

/// Lists the whole catalog alphabetically by title.
pub async fn list_courses(db: &DatabaseConnection) -> Result<Vec<course::Model>> {
    Course::find()
        .order_by_asc(course::Column::Title)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists courses owned by a profile.
pub async fn courses_owned_by<C>(db: &C, owner_id: i64) -> Result<Vec<course::Model>>
where
    C: ConnectionTrait,
{
    Course::find()
        .filter(course::Column::OwnerId.eq(owner_id))
        .order_by_asc(course::Column::Title)
        .all(db)
        .await
        .map_err(Into::into)
}

/// IDs of the courses where `user` holds an approved grant.
pub async fn granted_course_ids<C>(db: &C, user_id: i64) -> Result<Vec<i64>>
where
    C: ConnectionTrait,
{
    let grants = CourseAdmin::find()
        .filter(course_admin::Column::UserId.eq(user_id))
        .filter(course_admin::Column::Status.eq(ApplicationStatus::Approved))
        .all(db)
        .await?;
    Ok(grants.into_iter().map(|g| g.course_id).collect())
}

/// IDs of every course `user` is staff on, owned or granted. Site administrators
/// are not expanded here; callers check `is_site_admin` first.
pub async fn staffed_course_ids<C>(db: &C, user: &profile::Model) -> Result<BTreeSet<i64>>
where
    C: ConnectionTrait,
{
    let mut ids: BTreeSet<i64> = courses_owned_by(db, user.id)
        .await?
        .into_iter()
        .map(|c| c.id)
        .collect();
    ids.extend(granted_course_ids(db, user.id).await?);
    Ok(ids)
}

/// Whether `user` may manage `course`.
pub async fn is_course_staff<C>(
    db: &C,
    user: &profile::Model,
    course: &course::Model,
) -> Result<bool>
where
    C: ConnectionTrait,
{
    if user.is_site_admin || course.owner_id == user.id {
        return Ok(true);
    }
    let grant = CourseAdmin::find_by_id((user.id, course.id)).one(db).await?;
    Ok(grant.is_some_and(|g| g.status == ApplicationStatus::Approved))
}

/// Fails with [`Error::Forbidden`] unless `user` is staff on `course`.
pub async fn ensure_course_staff<C>(
    db: &C,
    user: &profile::Model,
    course: &course::Model,
    action: &str,
) -> Result<()>
where
    C: ConnectionTrait,
{
    if is_course_staff(db, user, course).await? {
        Ok(())
    } else {
        warn!(user_id = user.id, course_id = course.id, action, "Refused non-staff action");
        Err(Error::forbidden(action))
    }
}

/// Seeds the catalog from config.toml.
///
/// Courses whose join code already exists are skipped, so seeding is safe on
/// every startup. Owners without a profile are registered with their configured
/// name.
#[instrument(skip(db, config))]
pub async fn seed_catalog(db: &DatabaseConnection, config: &Config) -> Result<usize> {
    info!(
        "Seeding course catalog. Found {} configured courses.",
        config.courses.len()
    );
    let mut created = 0;

    for entry in &config.courses {
        let join_code = normalize_join_code(&entry.join_code)?;
        if get_course_by_join_code(db, &join_code).await?.is_some() {
            debug!("Course with join code '{}' already exists. Skipping.", join_code);
            continue;
        }

        let owner = match super::profile::find_by_discord_id(db, &entry.owner_discord_id).await? {
            Some(owner) => owner,
            None => {
                let is_admin = crate::config::admins::is_site_admin(&entry.owner_discord_id);
                super::profile::register_profile(
                    db,
                    &entry.owner_discord_id,
                    &entry.owner_name,
                    is_admin,
                )
                .await?
            }
        };

        create_course(
            db,
            &owner,
            &entry.title,
            entry.description.clone(),
            &join_code,
            entry.price,
        )
        .await?;
        created += 1;
    }

    info!("Seeded {} new courses", created);
    Ok(created)
}
