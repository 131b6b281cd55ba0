//! Fitting replies into Discord's size limits.
//!
//! Discord refuses a message or embed that is over any of its limits, and the
//! whole reply is lost. Everything user-provided that goes into a reply is
//! clipped here first.

/// Longest embed field name.
pub const FIELD_NAME_MAX: usize = 256;
/// Longest embed field value.
pub const FIELD_VALUE_MAX: usize = 1024;
/// Most fields in one embed.
pub const FIELDS_MAX: usize = 25;
/// Total characters across title, fields and footer of one embed.
pub const EMBED_TOTAL_MAX: usize = 6000;
/// Longest plain message.
pub const MESSAGE_MAX: usize = 2000;

/// Room kept for an embed's title and footer.
const EMBED_RESERVED: usize = 300;

/// Shortens `text` to at most `max_chars` characters, ending in `…` when cut.
#[must_use]
pub fn clip(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    clipped.push('…');
    clipped
}

/// Clips every (name, value) pair and keeps as many leading fields as fit in
/// one embed. Returns the fields and how many were left out.
#[must_use]
pub fn fit_fields(
    fields: impl IntoIterator<Item = (String, String)>,
) -> (Vec<(String, String, bool)>, usize) {
    let mut kept = Vec::new();
    let mut omitted = 0;
    let mut budget = EMBED_TOTAL_MAX - EMBED_RESERVED;

    for (name, value) in fields {
        let name = clip(&name, FIELD_NAME_MAX);
        let value = clip(&value, FIELD_VALUE_MAX);
        let size = name.chars().count() + value.chars().count();
        if omitted > 0 || kept.len() == FIELDS_MAX || size > budget {
            omitted += 1;
            continue;
        }
        budget -= size;
        kept.push((name, value, false));
    }
    (kept, omitted)
}

/// Joins lines into one message under [`MESSAGE_MAX`], replacing whatever does
/// not fit with a count of the lines left out.
#[must_use]
pub fn bounded_lines(lines: impl IntoIterator<Item = String>) -> String {
    const TAIL_ROOM: usize = 40;
    let lines: Vec<String> = lines.into_iter().collect();
    let total = lines.len();
    let mut text = String::new();
    let mut used = 0;

    for (index, line) in lines.into_iter().enumerate() {
        let line = clip(&line, MESSAGE_MAX - TAIL_ROOM);
        let size = line.chars().count() + 1;
        if used + size > MESSAGE_MAX - TAIL_ROOM {
            text.push_str(&format!("…and {} more", total - index));
            return text;
        }
        used += size;
        text.push_str(&line);
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_counts_characters() {
        assert_eq!(clip("short", 10), "short");
        assert_eq!(clip("abcdef", 4), "abc…");
        assert_eq!(clip(&"é".repeat(30), 10).chars().count(), 10);
    }

    #[test]
    fn test_fit_fields_respects_every_limit() {
        let long_note = "n".repeat(1000);
        let rows = (0..25).map(|i| {
            (
                format!("#{i} {}", "t".repeat(300)),
                format!("**Message:** {long_note}\n**Reason:** {long_note}"),
            )
        });

        let (fields, omitted) = fit_fields(rows);
        assert!(!fields.is_empty());
        assert_eq!(fields.len() + omitted, 25);
        let mut total = 0;
        for (name, value, _) in &fields {
            assert!(name.chars().count() <= FIELD_NAME_MAX);
            assert!(value.chars().count() <= FIELD_VALUE_MAX);
            total += name.chars().count() + value.chars().count();
        }
        assert!(total <= EMBED_TOTAL_MAX - EMBED_RESERVED);
    }

    #[test]
    fn test_fit_fields_keeps_small_rows() {
        let rows = (0..5).map(|i| (format!("#{i}"), "ok".to_string()));
        let (fields, omitted) = fit_fields(rows);
        assert_eq!(fields.len(), 5);
        assert_eq!(omitted, 0);
    }

    #[test]
    fn test_bounded_lines_stays_under_message_limit() {
        let lines = (0..200).map(|i| format!("• Course number {i} - 40%"));
        let text = bounded_lines(lines);
        assert!(text.chars().count() <= MESSAGE_MAX);
        assert!(text.ends_with("more"));

        let few = bounded_lines(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(few, "a\nb\n");
    }
}
