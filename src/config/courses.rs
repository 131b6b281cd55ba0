//! Course catalog configuration loading from config.toml
//!
//! Courses listed in config.toml are seeded into the database at startup. Each
//! entry names its owner by Discord ID; the owner's profile is registered on the
//! fly when missing.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Courses to seed
    #[serde(default)]
    pub courses: Vec<CourseConfig>,
}

/// Configuration for a single catalog course
#[derive(Debug, Deserialize, Clone)]
pub struct CourseConfig {
    /// Course title
    pub title: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Code students use to join
    pub join_code: String,
    /// Price in dollars, free when omitted
    #[serde(default)]
    pub price: f64,
    /// Discord ID of the owning instructor
    pub owner_discord_id: String,
    /// Display name used if the owner has no profile yet
    pub owner_name: String,
}

/// Loads the course catalog from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    parse_config(&contents)
}

/// Parses config.toml contents.
pub fn parse_config(contents: &str) -> Result<Config> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads the course catalog from the default location (./config.toml).
///
/// A missing file is not an error; the catalog is simply empty.
pub fn load_default_config() -> Result<Config> {
    let path = Path::new("config.toml");
    if !path.exists() {
        tracing::warn!("config.toml not found, starting with an empty course catalog");
        return Ok(Config::default());
    }
    load_config(path)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_course_config() {
        let toml_str = r#"
            [[courses]]
            title = "Intro to Rust"
            join_code = "RUST101"
            owner_discord_id = "1001"
            owner_name = "Ferris"

            [[courses]]
            title = "Async Deep Dive"
            description = "Futures, executors and pinning"
            join_code = "ASYNC"
            price = 49.0
            owner_discord_id = "1001"
            owner_name = "Ferris"
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.courses.len(), 2);
        assert_eq!(config.courses[0].title, "Intro to Rust");
        assert_eq!(config.courses[0].price, 0.0);
        assert!(config.courses[0].description.is_none());

        assert_eq!(config.courses[1].price, 49.0);
        assert_eq!(
            config.courses[1].description.as_deref(),
            Some("Futures, executors and pinning")
        );
    }

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config("").unwrap();
        assert!(config.courses.is_empty());
    }

    #[test]
    fn test_parse_missing_field() {
        let result = parse_config("[[courses]]\ntitle = \"No code\"\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
