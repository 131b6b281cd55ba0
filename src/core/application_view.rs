//! Application listing - The read-side projection of role applications.
//!
//! [`list_applications`] assembles [`ApplicationView`] rows (application joined
//! with requester name and course title), scoped to what the viewer may see and
//! filtered by status, kind, course and free-text search. Everything matching is
//! fetched and ordered newest first; `limit` then slices the ordered result.
//!
//! [`ApplicationBoard`] holds the last list a viewer fetched. Reviews patch it
//! provisionally so the reviewer sees the decision at once; the next refetch
//! replaces it wholesale.

use crate::{
    core::{course::staffed_course_ids, profile::get_profiles_by_ids},
    entities::{
        ApplicationKind, ApplicationStatus, Course, CourseApplication, course_application,
        profile,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, prelude::*};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// One row of the application listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationView {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub course_id: i64,
    pub course_title: String,
    pub status: ApplicationStatus,
    pub kind: ApplicationKind,
    pub message: Option<String>,
    pub reason: Option<String>,
    pub created_at: DateTimeUtc,
}

/// Listing criteria. Every field is optional; `mine` restricts the listing to
/// the viewer's own applications.
#[derive(Debug, Clone, Default)]
pub struct ApplicationFilter {
    pub status: Option<ApplicationStatus>,
    pub kind: Option<ApplicationKind>,
    pub course_id: Option<i64>,
    /// Case-insensitive substring of the requester name or course title
    pub search: Option<String>,
    /// Keep only the first `limit` rows of the ordered result
    pub limit: Option<usize>,
    pub mine: bool,
}

/// Which rows a viewer is entitled to.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Scope {
    Everything,
    Requester(i64),
    Courses(HashSet<i64>),
}

async fn resolve_scope(
    db: &DatabaseConnection,
    viewer: &profile::Model,
    filter: &ApplicationFilter,
) -> Result<Scope> {
    if filter.mine {
        return Ok(Scope::Requester(viewer.id));
    }
    if viewer.is_site_admin {
        return Ok(Scope::Everything);
    }

    let staffed: HashSet<i64> = staffed_course_ids(db, viewer).await?.into_iter().collect();
    if staffed.is_empty() {
        return Err(Error::AccessDenied);
    }
    if let Some(course_id) = filter.course_id {
        if !staffed.contains(&course_id) {
            return Err(Error::AccessDenied);
        }
    }
    Ok(Scope::Courses(staffed))
}

/// Lists applications visible to `viewer`, newest first.
///
/// # Errors
/// [`Error::AccessDenied`] when the viewer is not in `mine` mode, not a site
/// administrator and staffs no course, or asks for a course outside their scope.
/// This is distinct from an empty result.
pub async fn list_applications(
    db: &DatabaseConnection,
    viewer: &profile::Model,
    filter: &ApplicationFilter,
) -> Result<Vec<ApplicationView>> {
    let scope = resolve_scope(db, viewer, filter).await?;

    let mut query = CourseApplication::find();
    query = match &scope {
        Scope::Everything => query,
        Scope::Requester(user_id) => query.filter(course_application::Column::UserId.eq(*user_id)),
        Scope::Courses(ids) => {
            query.filter(course_application::Column::CourseId.is_in(ids.iter().copied()))
        }
    };
    if let Some(status) = filter.status {
        query = query.filter(course_application::Column::Status.eq(status));
    }
    if let Some(kind) = filter.kind {
        query = query.filter(course_application::Column::Kind.eq(kind));
    }
    if let Some(course_id) = filter.course_id {
        query = query.filter(course_application::Column::CourseId.eq(course_id));
    }

    let rows = query
        .order_by_desc(course_application::Column::CreatedAt)
        .order_by_desc(course_application::Column::Id)
        .find_also_related(Course)
        .all(db)
        .await?;

    let requester_ids: Vec<i64> = rows
        .iter()
        .map(|(application, _)| application.user_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let names: HashMap<i64, String> = get_profiles_by_ids(db, requester_ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p.display_name))
        .collect();

    let views = rows.into_iter().map(|(application, course)| ApplicationView {
        id: application.id,
        user_id: application.user_id,
        user_name: names
            .get(&application.user_id)
            .cloned()
            .unwrap_or_default(),
        course_id: application.course_id,
        course_title: course.map(|c| c.title).unwrap_or_default(),
        status: application.status,
        kind: application.kind,
        message: application.message,
        reason: application.rejection_reason,
        created_at: application.created_at,
    });

    let views = apply_search_and_limit(views, filter.search.as_deref(), filter.limit);
    debug!(viewer_id = viewer.id, rows = views.len(), "Listed applications");
    Ok(views)
}

/// Keeps rows whose requester name or course title contains `search`
/// (case-insensitive), then truncates to `limit`. Order is preserved.
pub fn apply_search_and_limit(
    views: impl IntoIterator<Item = ApplicationView>,
    search: Option<&str>,
    limit: Option<usize>,
) -> Vec<ApplicationView> {
    let needle = search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    views
        .into_iter()
        .filter(|view| {
            needle.as_ref().is_none_or(|needle| {
                view.user_name.to_lowercase().contains(needle)
                    || view.course_title.to_lowercase().contains(needle)
            })
        })
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}

/// A viewer's last fetched listing plus provisional review patches.
#[derive(Debug, Clone, Default)]
pub struct ApplicationBoard {
    rows: Vec<ApplicationView>,
    provisional: HashSet<i64>,
}

impl ApplicationBoard {
    /// Builds a board from an authoritative fetch.
    #[must_use]
    pub fn new(rows: Vec<ApplicationView>) -> Self {
        Self {
            rows,
            provisional: HashSet::new(),
        }
    }

    #[must_use]
    pub fn rows(&self) -> &[ApplicationView] {
        &self.rows
    }

    /// Whether the row's status came from a local patch rather than the store.
    #[must_use]
    pub fn is_provisional(&self, application_id: i64) -> bool {
        self.provisional.contains(&application_id)
    }

    /// Applies a review outcome locally. Returns `false` if the row is not on the board.
    pub fn patch_status(
        &mut self,
        application_id: i64,
        status: ApplicationStatus,
        reason: Option<String>,
    ) -> bool {
        let Some(row) = self.rows.iter_mut().find(|row| row.id == application_id) else {
            return false;
        };
        row.status = status;
        row.reason = reason;
        self.provisional.insert(application_id);
        true
    }

    /// Replaces every row with a fresh fetch and drops all provisional marks.
    pub fn replace(&mut self, rows: Vec<ApplicationView>) {
        self.rows = rows;
        self.provisional.clear();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::application::{review_application, submit_application};
    use crate::test_utils::*;

    fn view(id: i64, user_name: &str, course_title: &str) -> ApplicationView {
        ApplicationView {
            id,
            user_id: id,
            user_name: user_name.to_string(),
            course_id: 1,
            course_title: course_title.to_string(),
            status: ApplicationStatus::Pending,
            kind: ApplicationKind::Admin,
            message: None,
            reason: None,
            created_at: chrono::Utc::now(),
        }
    }

    fn ids(views: &[ApplicationView]) -> Vec<i64> {
        views.iter().map(|v| v.id).collect()
    }

    #[test]
    fn test_search_matches_name_or_title_case_insensitive() {
        let rows = vec![
            view(3, "Grace Hopper", "Compilers"),
            view(2, "Alan", "Rust Basics"),
            view(1, "Barbara", "Databases"),
        ];

        assert_eq!(ids(&apply_search_and_limit(rows.clone(), Some("GRACE"), None)), vec![3]);
        assert_eq!(ids(&apply_search_and_limit(rows.clone(), Some("rust"), None)), vec![2]);
        assert_eq!(ids(&apply_search_and_limit(rows, Some("   "), None)), vec![3, 2, 1]);
    }

    #[test]
    fn test_limit_keeps_order_and_never_exceeds() {
        let rows = vec![view(3, "a", "x"), view(2, "b", "y"), view(1, "c", "z")];

        assert_eq!(ids(&apply_search_and_limit(rows.clone(), None, Some(2))), vec![3, 2]);
        assert_eq!(ids(&apply_search_and_limit(rows.clone(), None, Some(0))), Vec::<i64>::new());
        assert_eq!(ids(&apply_search_and_limit(rows, None, Some(10))), vec![3, 2, 1]);
    }

    #[test]
    fn test_board_patch_is_provisional_until_replaced() {
        let mut board = ApplicationBoard::new(vec![view(1, "a", "x"), view(2, "b", "y")]);

        assert!(board.patch_status(2, ApplicationStatus::Rejected, Some("late".to_string())));
        assert!(board.is_provisional(2));
        assert_eq!(board.rows()[1].status, ApplicationStatus::Rejected);
        assert!(!board.patch_status(9, ApplicationStatus::Approved, None));

        board.replace(vec![view(2, "b", "y")]);
        assert!(!board.is_provisional(2));
        assert_eq!(board.rows()[0].status, ApplicationStatus::Pending);
    }

    #[tokio::test]
    async fn test_owner_sees_own_course_newest_first() -> Result<()> {
        let (db, owner, course) = setup_with_course().await?;
        let other_owner = create_test_profile(&db, "other-owner").await?;
        let other_course = create_test_course(&db, &other_owner, "Elsewhere").await?;
        let alice = create_test_profile(&db, "alice").await?;
        let bob = create_test_profile(&db, "bob").await?;

        let first = submit_application(&db, &alice, course.id, ApplicationKind::Admin, None).await?;
        let second =
            submit_application(&db, &bob, course.id, ApplicationKind::Instructor, None).await?;
        submit_application(&db, &alice, other_course.id, ApplicationKind::Admin, None).await?;

        let views = list_applications(&db, &owner, &ApplicationFilter::default()).await?;
        assert_eq!(ids(&views), vec![second.id, first.id]);
        assert_eq!(views[0].user_name, "bob");
        assert_eq!(views[0].course_title, course.title);

        Ok(())
    }

    #[tokio::test]
    async fn test_status_filter_returns_only_that_status() -> Result<()> {
        let (db, owner, course) = setup_with_course().await?;
        let alice = create_test_profile(&db, "alice").await?;
        let bob = create_test_profile(&db, "bob").await?;

        let approved =
            submit_application(&db, &alice, course.id, ApplicationKind::Admin, None).await?;
        review_application(&db, &owner, approved.id, ApplicationStatus::Approved, None).await?;
        submit_application(&db, &bob, course.id, ApplicationKind::Instructor, None).await?;
        submit_application(&db, &bob, course.id, ApplicationKind::Admin, None).await?;

        let filter = ApplicationFilter {
            status: Some(ApplicationStatus::Pending),
            ..Default::default()
        };
        let pending = list_applications(&db, &owner, &filter).await?;
        assert_eq!(pending.len(), 2);
        assert!(pending.iter().all(|v| v.status == ApplicationStatus::Pending));

        let filter = ApplicationFilter {
            status: Some(ApplicationStatus::Pending),
            kind: Some(ApplicationKind::Admin),
            course_id: Some(course.id),
            ..Default::default()
        };
        let pending_admin = list_applications(&db, &owner, &filter).await?;
        assert_eq!(pending_admin.len(), 1);
        assert!(pending_admin.iter().all(|v| v.status == ApplicationStatus::Pending));

        Ok(())
    }

    #[tokio::test]
    async fn test_limit_returns_newest_prefix() -> Result<()> {
        let (db, owner, course) = setup_with_course().await?;
        let alice = create_test_profile(&db, "alice").await?;
        let bob = create_test_profile(&db, "bob").await?;

        submit_application(&db, &alice, course.id, ApplicationKind::Admin, None).await?;
        submit_application(&db, &bob, course.id, ApplicationKind::Admin, None).await?;
        submit_application(&db, &bob, course.id, ApplicationKind::Instructor, None).await?;

        let all = list_applications(&db, &owner, &ApplicationFilter::default()).await?;
        let filter = ApplicationFilter {
            limit: Some(2),
            ..Default::default()
        };
        let limited = list_applications(&db, &owner, &filter).await?;
        assert_eq!(limited, all[..2].to_vec());

        Ok(())
    }

    #[tokio::test]
    async fn test_viewer_without_scope_is_denied() -> Result<()> {
        let (db, _owner, course) = setup_with_course().await?;
        let stranger = create_test_profile(&db, "stranger").await?;

        let result = list_applications(&db, &stranger, &ApplicationFilter::default()).await;
        assert!(matches!(result.unwrap_err(), Error::AccessDenied));

        // In "mine" mode the same viewer gets an empty list, not a denial.
        let filter = ApplicationFilter {
            mine: true,
            course_id: Some(course.id),
            ..Default::default()
        };
        assert!(list_applications(&db, &stranger, &filter).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_course_outside_scope_is_denied() -> Result<()> {
        let (db, owner, _course) = setup_with_course().await?;
        let other_owner = create_test_profile(&db, "other-owner").await?;
        let other_course = create_test_course(&db, &other_owner, "Elsewhere").await?;

        let filter = ApplicationFilter {
            course_id: Some(other_course.id),
            ..Default::default()
        };
        let result = list_applications(&db, &owner, &filter).await;
        assert!(matches!(result.unwrap_err(), Error::AccessDenied));

        Ok(())
    }

    #[tokio::test]
    async fn test_mine_and_site_admin_scopes() -> Result<()> {
        let (db, _owner, course) = setup_with_course().await?;
        let other_owner = create_test_profile(&db, "other-owner").await?;
        let other_course = create_test_course(&db, &other_owner, "Elsewhere").await?;
        let alice = create_test_profile(&db, "alice").await?;
        let bob = create_test_profile(&db, "bob").await?;
        let admin = create_site_admin(&db, "admin").await?;

        submit_application(&db, &alice, course.id, ApplicationKind::Admin, None).await?;
        submit_application(&db, &alice, other_course.id, ApplicationKind::Admin, None).await?;
        submit_application(&db, &bob, course.id, ApplicationKind::Admin, None).await?;

        let mine = ApplicationFilter {
            mine: true,
            ..Default::default()
        };
        let alice_rows = list_applications(&db, &alice, &mine).await?;
        assert_eq!(alice_rows.len(), 2);
        assert!(alice_rows.iter().all(|v| v.user_id == alice.id));

        let everything = list_applications(&db, &admin, &ApplicationFilter::default()).await?;
        assert_eq!(everything.len(), 3);

        let search = ApplicationFilter {
            search: Some("ELSEWHERE".to_string()),
            ..Default::default()
        };
        let found = list_applications(&db, &admin, &search).await?;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].course_id, other_course.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_granted_admin_sees_course_applications() -> Result<()> {
        let (db, owner, course) = setup_with_course().await?;
        let helper = create_test_profile(&db, "helper").await?;
        let alice = create_test_profile(&db, "alice").await?;

        let helper_app =
            submit_application(&db, &helper, course.id, ApplicationKind::Admin, None).await?;
        review_application(&db, &owner, helper_app.id, ApplicationStatus::Approved, None).await?;
        submit_application(&db, &alice, course.id, ApplicationKind::Instructor, None).await?;

        let views = list_applications(&db, &helper, &ApplicationFilter::default()).await?;
        assert_eq!(views.len(), 2);

        Ok(())
    }
}
