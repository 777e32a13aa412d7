pub mod cli;
pub mod config;
pub mod entity;
pub mod error;
pub mod notebook;
pub mod search;
pub mod storage;

pub use config::{NotesConfig, Theme};
pub use entity::{Action, ActionKind, ChangeNotifier, ListenerId, Note, NoteRecord, UndoRedoStack};
pub use error::{NotesError, Result};
pub use notebook::{Notebook, NotebookEvent, SortKey};
pub use storage::NoteStore;
