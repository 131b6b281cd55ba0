//! Unified error types for `CourseBuddy`.
//!
//! Store failures are classified once, here, when a [`DbErr`] is converted into an
//! [`Error`]: uniqueness and foreign-key violations become [`Error::Conflict`], the
//! rest become [`Error::Database`]. Callers branch on the variant, never on the
//! message text.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Every failure the application can report.
#[derive(Debug, Error)]
pub enum Error {
    /// The caller has no registered profile.
    #[error("authentication required")]
    AuthenticationRequired,

    /// A uniqueness or referential constraint rejected the write.
    #[error("conflict: {detail}")]
    Conflict {
        /// Constraint detail reported by the store
        detail: String,
    },

    /// A pending application already exists for this (user, course, kind).
    #[error("already applied as {kind} for course {course_id}")]
    AlreadyApplied {
        /// Course the duplicate application targeted
        course_id: i64,
        /// Requested role
        kind: String,
    },

    /// The viewer has no scope at all for the requested listing.
    #[error("access denied")]
    AccessDenied,

    /// The caller is known but may not perform this action.
    #[error("forbidden: {action}")]
    Forbidden {
        /// What was attempted
        action: String,
    },

    /// Input rejected before any store call.
    #[error("validation failed: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// A status string outside the allow-list.
    #[error("invalid application status '{value}' (expected pending, approved or rejected)")]
    InvalidStatus {
        /// The rejected value
        value: String,
    },

    /// A status change the application lifecycle does not allow.
    #[error("cannot move application from {from} to {to}")]
    InvalidTransition {
        /// Current status
        from: String,
        /// Requested status
        to: String,
    },

    #[error("course not found: {reference}")]
    CourseNotFound {
        /// Id or join code that was looked up
        reference: String,
    },

    #[error("application not found: {id}")]
    ApplicationNotFound {
        /// Missing application id
        id: i64,
    },

    #[error("assignment not found: {id}")]
    AssignmentNotFound {
        /// Missing assignment id
        id: i64,
    },

    /// Joining a paid course without a payment.
    #[error("course {course_id} requires payment")]
    PaymentRequired {
        /// Paid course id
        course_id: i64,
    },

    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    #[error("Database error: {0}")]
    Database(DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(
                SqlErr::UniqueConstraintViolation(detail)
                | SqlErr::ForeignKeyConstraintViolation(detail),
            ) => Self::Conflict { detail },
            _ => Self::Database(err),
        }
    }
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::Forbidden`] describing the attempted action.
    pub fn forbidden(action: impl Into<String>) -> Self {
        Self::Forbidden {
            action: action.into(),
        }
    }

    /// Whether this is a store constraint conflict.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Renders the error as the notice shown to the user.
    ///
    /// Store and infrastructure failures collapse into one generic notice; their
    /// details only go to the log.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthenticationRequired => {
                "🔒 You need a profile first. Run `/register <name>` and try again.".to_string()
            }
            Self::Conflict { .. } => "⚠️ That record already exists.".to_string(),
            Self::AlreadyApplied { kind, .. } => {
                format!("⚠️ You have already applied as {kind} for this course. Wait for a review.")
            }
            Self::AccessDenied => {
                "🚫 You don't have access to these applications. Only course owners, course admins \
                 and site admins can review them; use `mine:true` to see your own."
                    .to_string()
            }
            Self::Forbidden { action } => format!("🚫 You are not allowed to {action}."),
            Self::Validation { message } => format!("❌ {message}"),
            Self::InvalidStatus { value } => {
                format!("❌ '{value}' is not a valid status. Use pending, approved or rejected.")
            }
            Self::InvalidTransition { from, to } => {
                format!("❌ This application is {from} and cannot be changed to {to}.")
            }
            Self::CourseNotFound { reference } => format!("❌ Course '{reference}' not found."),
            Self::ApplicationNotFound { id } => format!("❌ Application #{id} not found."),
            Self::AssignmentNotFound { id } => format!("❌ Assignment #{id} not found."),
            Self::PaymentRequired { .. } => {
                "💳 This course is paid. Use `/course buy` with your payment reference.".to_string()
            }
            Self::Config { .. }
            | Self::Database(_)
            | Self::Io(_)
            | Self::EnvVar(_)
            | Self::Fmt(_)
            | Self::Framework(_) => "❌ Something went wrong. Please try again later.".to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_db_error_is_not_a_conflict() {
        let err: Error = DbErr::Custom("boom".to_string()).into();
        assert!(matches!(err, Error::Database(_)));
        assert!(!err.is_conflict());
    }

    #[test]
    fn test_store_errors_share_generic_message() {
        let err: Error = DbErr::RecordNotInserted.into();
        assert_eq!(
            err.user_message(),
            "❌ Something went wrong. Please try again later."
        );
    }

    #[test]
    fn test_already_applied_message_names_kind() {
        let err = Error::AlreadyApplied {
            course_id: 3,
            kind: "instructor".to_string(),
        };
        assert!(err.user_message().contains("already applied as instructor"));
    }

    #[test]
    fn test_access_denied_differs_from_empty_result() {
        assert!(Error::AccessDenied.user_message().contains("don't have access"));
    }
}
