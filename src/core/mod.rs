//! Core business logic - framework-agnostic course, enrollment, application and
//! coursework operations. Nothing in here knows about Discord.

/// Role applications: submission and review
pub mod application;
/// Read-side listing of applications and the provisional review board
pub mod application_view;
/// Course catalog and staff checks
pub mod course;
/// Assignments, submissions and announcements
pub mod coursework;
/// Course membership
pub mod enrollment;
/// Caller identity
pub mod profile;
