/// Site administrator IDs from environment variables
pub mod admins;

/// Course catalog loading from config.toml
pub mod courses;

/// Database configuration and connection management
pub mod database;
