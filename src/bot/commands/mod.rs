//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Role application commands
pub mod application;

/// Course catalog and enrollment commands
pub mod course;

/// Assignment and announcement commands
pub mod coursework;

/// General utility commands
pub mod general;

/// Profile registration
pub mod profile;

// Export commands
pub use application::*;
pub use course::*;
pub use coursework::*;
pub use general::*;
pub use profile::*;
