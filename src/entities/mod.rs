//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the tables of the course store and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod announcement;
pub mod assignment;
pub mod course;
pub mod course_admin;
pub mod course_application;
pub mod enrollment;
pub mod profile;
pub mod submission;

// Re-export specific types to avoid conflicts
pub use announcement::{
    Column as AnnouncementColumn, Entity as Announcement, Model as AnnouncementModel,
};
pub use assignment::{Column as AssignmentColumn, Entity as Assignment, Model as AssignmentModel};
pub use course::{Column as CourseColumn, Entity as Course, Model as CourseModel};
pub use course_admin::{Column as CourseAdminColumn, Entity as CourseAdmin, Model as CourseAdminModel};
pub use course_application::{
    ApplicationKind, ApplicationStatus, Column as CourseApplicationColumn,
    Entity as CourseApplication, Model as CourseApplicationModel,
};
pub use enrollment::{Column as EnrollmentColumn, Entity as Enrollment, Model as EnrollmentModel};
pub use profile::{Column as ProfileColumn, Entity as Profile, Model as ProfileModel};
pub use submission::{Column as SubmissionColumn, Entity as Submission, Model as SubmissionModel};
