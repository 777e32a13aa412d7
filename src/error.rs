use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotesError {
    #[error("Not in a notes project. Run 'notes init' first.")]
    NotInitialized,

    #[error("Already initialized. Remove .notes/ to reinitialize.")]
    AlreadyInitialized,

    #[error("Note not found: {0}")]
    NoteNotFound(u32),

    #[error("No active note. Select one first.")]
    NoActiveNote,

    #[error("Invalid action kind: {0}")]
    InvalidActionKind(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid theme: {0}")]
    InvalidTheme(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, NotesError>;
