mod action;
mod history;
pub mod markup;
mod note;
mod notifier;

pub use action::{Action, ActionKind};
pub use history::{UndoRedoStack, DEFAULT_HISTORY_LIMIT};
pub use note::{Note, NoteRecord, DEFAULT_TITLE, PREVIEW_LENGTH};
pub use notifier::{ChangeNotifier, ListenerId};

use chrono::NaiveDateTime;

use crate::error::{NotesError, Result};

/// Textual form used whenever a timestamp leaves the process
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local wall-clock time
pub fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse `yyyy-MM-dd HH:mm:ss`, also accepting the ISO-8601 `T` separator
/// with optional fractional seconds.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|_| NotesError::InvalidTimestamp(s.to_string()))
}

/// Serde adapter for `NaiveDateTime` fields in the fixed textual format.
pub mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_timestamp(ts))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_timestamp(&s).map_err(serde::de::Error::custom)
    }
}
