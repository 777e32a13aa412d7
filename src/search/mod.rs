//! Search module for filter parsing and note matching.

use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::entity::Note;

/// Parsed search filter from query string.
///
/// Filters can be specified in the query string using prefixes:
/// - `created:>2025-01-01` - Created after date
/// - `created:<2025-12-31` - Created before date
/// - `edited:>2025-01-01` - Last edited after date
/// - `edited:<2025-12-31T18:00:00` - Last edited before date/time
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    /// Created after this date/time
    pub created_after: Option<NaiveDateTime>,
    /// Created before this date/time
    pub created_before: Option<NaiveDateTime>,
    /// Edited after this date/time
    pub edited_after: Option<NaiveDateTime>,
    /// Edited before this date/time
    pub edited_before: Option<NaiveDateTime>,
}

impl SearchFilter {
    /// Check if filter has any constraints.
    pub fn is_empty(&self) -> bool {
        self.created_after.is_none()
            && self.created_before.is_none()
            && self.edited_after.is_none()
            && self.edited_before.is_none()
    }

    /// Check the note's dates against every constraint.
    pub fn accepts(&self, note: &Note) -> bool {
        let created = note.date_created();
        let edited = note.date_edited();

        self.created_after.map_or(true, |t| created > t)
            && self.created_before.map_or(true, |t| created < t)
            && self.edited_after.map_or(true, |t| edited > t)
            && self.edited_before.map_or(true, |t| edited < t)
    }
}

/// A parsed query: the text to look for plus date constraints.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Query {
    pub text: String,
    pub filter: SearchFilter,
    pub case_sensitive: bool,
}

impl Query {
    pub fn parse(raw: &str, case_sensitive: bool) -> Self {
        let (text, filter) = parse_query(raw);
        Self {
            text,
            filter,
            case_sensitive,
        }
    }

    /// Substring match against the note's plain text; an empty needle
    /// matches everything.
    pub fn matches(&self, note: &Note) -> bool {
        if !self.filter.accepts(note) {
            return false;
        }
        if self.text.is_empty() {
            return true;
        }

        let haystack = note.plain_text();
        if self.case_sensitive {
            haystack.contains(&self.text)
        } else {
            haystack.to_lowercase().contains(&self.text.to_lowercase())
        }
    }
}

/// Parse a raw query string into (remaining query text, filters).
///
/// # Examples
///
/// ```ignore
/// let (query, filter) = parse_query("edited:>2025-01-01 grocery list");
/// assert_eq!(query, "grocery list");
/// assert!(filter.edited_after.is_some());
/// ```
pub fn parse_query(raw: &str) -> (String, SearchFilter) {
    let mut filter = SearchFilter::default();
    let mut remaining = Vec::new();

    for token in raw.split_whitespace() {
        let Some((slot, value)) = filter_slot(&mut filter, token) else {
            remaining.push(token);
            continue;
        };
        match parse_date(value) {
            Some(date) => *slot = Some(date),
            None => {
                // Keep the token as search text when its date does not parse
                warn!(token, "ignoring date filter with invalid date");
                remaining.push(token);
            }
        }
    }

    (remaining.join(" "), filter)
}

fn filter_slot<'f, 't>(
    filter: &'f mut SearchFilter,
    token: &'t str,
) -> Option<(&'f mut Option<NaiveDateTime>, &'t str)> {
    if let Some(value) = token.strip_prefix("created:>") {
        Some((&mut filter.created_after, value))
    } else if let Some(value) = token.strip_prefix("created:<") {
        Some((&mut filter.created_before, value))
    } else if let Some(value) = token.strip_prefix("edited:>") {
        Some((&mut filter.edited_after, value))
    } else if let Some(value) = token.strip_prefix("edited:<") {
        Some((&mut filter.edited_before, value))
    } else {
        None
    }
}

/// Parse a date string into a local NaiveDateTime.
/// Supports YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS.
fn parse_date(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = crate::entity::parse_timestamp(s) {
        return Some(dt);
    }

    // Date only - midnight
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    date.and_hms_opt(0, 0, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn note_with(text: &str) -> Note {
        let mut note = Note::new(1, "n");
        note.set_body(format!("<html><body><p>{}</p></body></html>", text));
        note
    }

    #[test]
    fn test_parse_query_no_filters() {
        let (query, filter) = parse_query("hello world");
        assert_eq!(query, "hello world");
        assert!(filter.is_empty());
    }

    #[test]
    fn test_parse_query_date_filters() {
        let (query, filter) = parse_query("created:>2025-01-01 edited:<2025-12-31 test");
        assert_eq!(query, "test");
        assert!(filter.created_after.is_some());
        assert!(filter.edited_before.is_some());
        assert!(filter.created_before.is_none());
    }

    #[test]
    fn test_parse_query_only_filters() {
        let (query, filter) = parse_query("edited:>2025-01-01");
        assert_eq!(query, "");
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_parse_query_keeps_invalid_date_as_text() {
        let (query, filter) = parse_query("created:>garbage report");
        assert_eq!(query, "created:>garbage report");
        assert!(filter.is_empty());

        let (query, filter) = parse_query("edited:<2025-13-40 edited:>2025-01-01");
        assert_eq!(query, "edited:<2025-13-40");
        assert!(filter.edited_before.is_none());
        assert!(filter.edited_after.is_some());
    }

    #[test]
    fn test_parse_query_collapses_spaces() {
        let (query, _) = parse_query("  milk   and  eggs ");
        assert_eq!(query, "milk and eggs");
    }

    #[test]
    fn test_parse_date_iso() {
        let dt = parse_date("2025-06-15").unwrap();
        assert_eq!(dt.year(), 2025);
        assert_eq!(dt.month(), 6);
        assert_eq!(dt.day(), 15);
        assert_eq!(dt.hour(), 0);
    }

    #[test]
    fn test_parse_date_with_time() {
        let dt = parse_date("2025-06-15T08:30:00").unwrap();
        assert_eq!(dt.hour(), 8);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date("not-a-date").is_none());
    }

    #[test]
    fn test_query_matches_plain_text_not_markup() {
        let note = note_with("buy <b>milk</b>");
        assert!(Query::parse("buy milk", true).matches(&note));
        assert!(!Query::parse("<b>", true).matches(&note));
    }

    #[test]
    fn test_query_case_sensitivity() {
        let note = note_with("Quarterly Report");
        assert!(!Query::parse("quarterly", true).matches(&note));
        assert!(Query::parse("quarterly", false).matches(&note));
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert!(Query::parse("", true).matches(&note_with("")));
    }

    #[test]
    fn test_date_filter_excludes() {
        let note = note_with("anything");
        assert!(!Query::parse("created:>2999-01-01", true).matches(&note));
        assert!(Query::parse("created:<2999-01-01 anything", true).matches(&note));
    }
}
