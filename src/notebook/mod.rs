//! The note collection: ownership, selection, filtering and ordering.

use tracing::debug;

use crate::config::NotesConfig;
use crate::entity::{ChangeNotifier, ListenerId, Note, DEFAULT_HISTORY_LIMIT, DEFAULT_TITLE};
use crate::error::{NotesError, Result};
use crate::search::Query;

/// Ordering applied to the note list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    Title,
    Created,
    #[default]
    Edited,
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortKey::Title => write!(f, "title"),
            SortKey::Created => write!(f, "created"),
            SortKey::Edited => write!(f, "edited"),
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "title" => Ok(SortKey::Title),
            "created" | "date_created" => Ok(SortKey::Created),
            "edited" | "date_edited" => Ok(SortKey::Edited),
            _ => Err(format!("Invalid sort key: {}", s)),
        }
    }
}

/// List-level changes, for views that render the note list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotebookEvent {
    Created(u32),
    Deleted(u32),
    ActiveChanged(Option<u32>),
    Filtered { shown: usize },
    Sorted(SortKey),
}

#[derive(Debug)]
pub struct Notebook {
    notes: Vec<Note>,
    active: Option<u32>,
    history_limit: Option<usize>,
    case_sensitive: bool,
    notifier: ChangeNotifier<NotebookEvent>,
}

impl Default for Notebook {
    fn default() -> Self {
        Self::new()
    }
}

impl Notebook {
    pub fn new() -> Self {
        Self {
            notes: Vec::new(),
            active: None,
            history_limit: Some(DEFAULT_HISTORY_LIMIT),
            case_sensitive: true,
            notifier: ChangeNotifier::new(),
        }
    }

    pub fn with_config(config: &NotesConfig) -> Self {
        Self {
            history_limit: config.history_capacity(),
            case_sensitive: config.case_sensitive_search,
            ..Self::new()
        }
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&NotebookEvent) + 'static,
    {
        self.notifier.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.notifier.unsubscribe(id)
    }

    fn emit(&mut self, event: NotebookEvent) {
        debug!(?event, "notebook event");
        self.notifier.notify(&event);
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Notes not hidden by the last search, in list order.
    pub fn visible(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter().filter(|n| n.is_display())
    }

    pub fn next_id(&self) -> u32 {
        self.notes.iter().map(Note::id).max().unwrap_or(0) + 1
    }

    /// Add an existing note, e.g. one loaded from storage.
    pub fn insert(&mut self, mut note: Note) -> Result<()> {
        if self.get(note.id()).is_some() {
            return Err(NotesError::Storage(format!(
                "Duplicate note id: {}",
                note.id()
            )));
        }
        note.set_history_limit(self.history_limit);
        if note.is_active() {
            note.deactivate();
        }
        let id = note.id();
        self.notes.push(note);
        self.emit(NotebookEvent::Created(id));
        Ok(())
    }

    /// Create an empty note and select it.
    pub fn create_note(&mut self) -> u32 {
        let id = self.next_id();
        let mut note = Note::new(id, DEFAULT_TITLE);
        note.set_history_limit(self.history_limit);
        self.notes.push(note);
        self.emit(NotebookEvent::Created(id));
        self.select(id);
        id
    }

    pub fn get(&self, id: u32) -> Option<&Note> {
        self.notes.iter().find(|n| n.id() == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Note> {
        self.notes.iter_mut().find(|n| n.id() == id)
    }

    pub fn note(&self, id: u32) -> Result<&Note> {
        self.get(id).ok_or(NotesError::NoteNotFound(id))
    }

    pub fn note_mut(&mut self, id: u32) -> Result<&mut Note> {
        self.get_mut(id).ok_or(NotesError::NoteNotFound(id))
    }

    pub fn active_id(&self) -> Option<u32> {
        self.active
    }

    pub fn active(&self) -> Option<&Note> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn active_mut(&mut self) -> Option<&mut Note> {
        let id = self.active?;
        self.get_mut(id)
    }

    fn require_active(&mut self) -> Result<&mut Note> {
        self.active_mut().ok_or(NotesError::NoActiveNote)
    }

    /// Make `id` the only active note.
    pub fn set_active(&mut self, id: u32) -> Result<()> {
        if self.get(id).is_none() {
            return Err(NotesError::NoteNotFound(id));
        }
        self.select(id);
        Ok(())
    }

    fn select(&mut self, id: u32) {
        if self.active == Some(id) {
            return;
        }
        if let Some(previous) = self.active_mut() {
            previous.deactivate();
        }
        if let Some(note) = self.get_mut(id) {
            note.activate();
        }
        self.active = Some(id);
        self.emit(NotebookEvent::ActiveChanged(Some(id)));
    }

    pub fn clear_active(&mut self) {
        if let Some(previous) = self.active_mut() {
            previous.deactivate();
        }
        if self.active.take().is_some() {
            self.emit(NotebookEvent::ActiveChanged(None));
        }
    }

    pub fn delete_note(&mut self, id: u32) -> Result<Note> {
        let index = self
            .notes
            .iter()
            .position(|n| n.id() == id)
            .ok_or(NotesError::NoteNotFound(id))?;

        if self.active == Some(id) {
            self.clear_active();
        }
        let note = self.notes.remove(index);
        self.emit(NotebookEvent::Deleted(id));
        Ok(note)
    }

    pub fn delete_active(&mut self) -> Result<Note> {
        let id = self.active.ok_or(NotesError::NoActiveNote)?;
        self.delete_note(id)
    }

    /// Show notes matching `raw`, hide the rest. Returns the number shown.
    pub fn search(&mut self, raw: &str) -> usize {
        let query = Query::parse(raw, self.case_sensitive);
        let mut shown = 0;
        for note in self.notes.iter_mut() {
            if query.matches(note) {
                note.show();
                shown += 1;
            } else {
                note.hide();
            }
        }
        self.emit(NotebookEvent::Filtered { shown });
        shown
    }

    /// Titles ascending; dates newest first.
    pub fn sort(&mut self, key: SortKey) {
        match key {
            SortKey::Title => self
                .notes
                .sort_by(|a, b| a.title().to_lowercase().cmp(&b.title().to_lowercase())),
            SortKey::Created => self
                .notes
                .sort_by(|a, b| b.date_created().cmp(&a.date_created())),
            SortKey::Edited => self
                .notes
                .sort_by(|a, b| b.date_edited().cmp(&a.date_edited())),
        }
        self.emit(NotebookEvent::Sorted(key));
    }

    pub fn undo_active(&mut self) -> Result<Option<String>> {
        Ok(self.require_active()?.undo())
    }

    pub fn redo_active(&mut self) -> Result<Option<String>> {
        Ok(self.require_active()?.redo())
    }
}
