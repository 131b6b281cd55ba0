//! Site administrator configuration loaded from environment variables.
//!
//! `SITE_ADMIN_IDS` holds a comma-separated list of Discord user IDs. Profiles
//! registered by those users are flagged as site administrators.

use std::collections::HashSet;

/// Parses a comma-separated ID list, skipping blanks.
#[must_use]
pub fn parse_admin_ids(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Reads the configured site administrator IDs, empty when unset.
#[must_use]
pub fn get_site_admin_ids() -> HashSet<String> {
    std::env::var("SITE_ADMIN_IDS")
        .map(|raw| parse_admin_ids(&raw))
        .unwrap_or_default()
}

/// Whether the given Discord user ID is configured as a site administrator.
#[must_use]
pub fn is_site_admin(discord_id: &str) -> bool {
    get_site_admin_ids().contains(discord_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_admin_ids_trims_and_skips_blanks() {
        let ids = parse_admin_ids(" 111, 222 ,,333 ,");
        assert_eq!(ids.len(), 3);
        assert!(ids.contains("111"));
        assert!(ids.contains("222"));
        assert!(ids.contains("333"));
    }

    #[test]
    fn test_parse_admin_ids_empty() {
        assert!(parse_admin_ids("").is_empty());
        assert!(parse_admin_ids(" , ").is_empty());
    }
}
