// src/entity/note.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::action::{Action, ActionKind};
use super::history::UndoRedoStack;
use super::markup;
use super::notifier::{ChangeNotifier, ListenerId};

/// Title stored when a note is given an empty one
pub const DEFAULT_TITLE: &str = "New Note";

/// Maximum number of characters in a preview
pub const PREVIEW_LENGTH: usize = 100;

/// The persisted fields of a note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub id: u32,
    pub title: String,
    pub body: String,
    #[serde(with = "super::timestamp")]
    pub date_created: NaiveDateTime,
    #[serde(with = "super::timestamp")]
    pub date_edited: NaiveDateTime,
}

/// A single note: content, selection state, edit history and listeners.
///
/// All mutation goes through methods so that every change moves the edit
/// date (where applicable) and reaches subscribers before the call returns.
#[derive(Debug)]
pub struct Note {
    id: u32,
    title: String,
    body: String,
    date_created: NaiveDateTime,
    date_edited: NaiveDateTime,
    is_active: bool,
    is_display: bool,
    history: UndoRedoStack,
    notifier: ChangeNotifier<Note>,
}

impl Note {
    pub fn new(id: u32, title: impl Into<String>) -> Self {
        let now = super::now();
        Self {
            id,
            title: title.into(),
            body: markup::EMPTY_DOCUMENT.to_string(),
            date_created: now,
            date_edited: now,
            is_active: false,
            is_display: true,
            history: UndoRedoStack::new(),
            notifier: ChangeNotifier::new(),
        }
    }

    pub fn from_record(record: NoteRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            body: record.body,
            date_created: record.date_created,
            date_edited: record.date_edited,
            is_active: false,
            is_display: true,
            history: UndoRedoStack::new(),
            notifier: ChangeNotifier::new(),
        }
    }

    pub fn to_record(&self) -> NoteRecord {
        NoteRecord {
            id: self.id,
            title: self.title.clone(),
            body: self.body.clone(),
            date_created: self.date_created,
            date_edited: self.date_edited,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn date_created(&self) -> NaiveDateTime {
        self.date_created
    }

    pub fn date_edited(&self) -> NaiveDateTime {
        self.date_edited
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_display(&self) -> bool {
        self.is_display
    }

    pub fn history(&self) -> &UndoRedoStack {
        &self.history
    }

    pub fn set_history_limit(&mut self, limit: Option<usize>) {
        self.history.set_capacity(limit);
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&Note) + 'static,
    {
        self.notifier.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.notifier.unsubscribe(id)
    }

    fn notify(&mut self) {
        // Listeners borrow the note, so the notifier is detached for the dispatch.
        let mut notifier = std::mem::take(&mut self.notifier);
        notifier.notify(self);
        self.notifier = notifier;
    }

    fn touch(&mut self) {
        self.date_edited = super::now();
    }

    /// Set the title, falling back to "New Note" for an empty string.
    pub fn set_title(&mut self, new_title: impl Into<String>) {
        let new_title = new_title.into();
        self.title = if new_title.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            new_title
        };
        self.touch();
        debug!(note = self.id, title = %self.title, "title set");
        self.notify();
    }

    pub fn set_body(&mut self, new_body: impl Into<String>) {
        self.body = new_body.into();
        self.touch();
        debug!(note = self.id, len = self.body.len(), "body set");
        self.notify();
    }

    /// Snapshot the current body under `kind`. Call before applying the edit.
    pub fn record_action(&mut self, kind: ActionKind) {
        self.history.push_undo(Action::new(kind, self.body.clone()));
    }

    pub fn clear_redo(&mut self) {
        self.history.clear_redo();
    }

    /// Record, apply and close off a fresh edit in one step.
    pub fn edit(&mut self, kind: ActionKind, new_body: impl Into<String>) {
        self.record_action(kind);
        self.set_body(new_body);
        self.clear_redo();
    }

    pub fn can_undo(&self) -> bool {
        self.history.undo_len() > 0
    }

    pub fn can_redo(&self) -> bool {
        self.history.redo_len() > 0
    }

    /// Restore the most recent snapshot. Returns `None` when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> Option<String> {
        let Some(action) = self.history.pop_undo() else {
            debug!(note = self.id, "nothing to undo");
            return None;
        };
        self.history
            .push_redo(Action::new(action.kind.inverse(), self.body.clone()));
        debug!(note = self.id, kind = %action.kind, "undo");
        self.set_body(action.snapshot.clone());
        Some(action.snapshot)
    }

    /// Reapply the most recently undone snapshot. Returns `None` when there
    /// is nothing to redo.
    pub fn redo(&mut self) -> Option<String> {
        let Some(action) = self.history.pop_redo() else {
            debug!(note = self.id, "nothing to redo");
            return None;
        };
        self.history
            .push_undo(Action::new(action.kind.inverse(), self.body.clone()));
        debug!(note = self.id, kind = %action.kind, "redo");
        self.set_body(action.snapshot.clone());
        Some(action.snapshot)
    }

    pub fn activate(&mut self) {
        self.is_active = true;
        self.notify();
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.notify();
    }

    pub fn show(&mut self) {
        self.is_display = true;
    }

    pub fn hide(&mut self) {
        self.is_display = false;
    }

    pub fn plain_text(&self) -> String {
        markup::plain_text(&self.body)
    }

    pub fn preview(&self) -> String {
        self.plain_text().chars().take(PREVIEW_LENGTH).collect()
    }

    /// Restyle the body background. Returns whether the body changed.
    ///
    /// The restyle is not recorded for undo, but it still ends any pending
    /// redo chain so history stays linear.
    pub fn apply_background_color(&mut self, color: &str) -> bool {
        let updated = markup::with_background_color(&self.body, color);
        if updated == self.body {
            return false;
        }
        self.set_body(updated);
        self.clear_redo();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn doc(text: &str) -> String {
        format!(
            "<html dir=\"ltr\"><head></head><body contenteditable=\"true\">{}</body></html>\n",
            text
        )
    }

    #[test]
    fn test_new_note_defaults() {
        let note = Note::new(1, DEFAULT_TITLE);
        assert_eq!(note.id(), 1);
        assert_eq!(note.title(), "New Note");
        assert_eq!(note.body(), markup::EMPTY_DOCUMENT);
        assert_eq!(note.date_created(), note.date_edited());
        assert!(!note.is_active());
        assert!(note.is_display());
        assert!(!note.can_undo());
        assert!(!note.can_redo());
    }

    #[test]
    fn test_set_title_empty_falls_back() {
        let mut note = Note::new(1, "Groceries");
        note.set_title("");
        assert_eq!(note.title(), "New Note");
        note.set_title("X");
        assert_eq!(note.title(), "X");
    }

    #[test]
    fn test_set_body_moves_edit_date() {
        let mut note = Note::new(1, "n");
        let created = note.date_created();
        note.set_body(doc("hello"));
        assert!(note.date_edited() >= created);
        assert_eq!(note.date_created(), created);
        assert_eq!(note.plain_text(), "hello");
    }

    #[test]
    fn test_bold_undo_redo_example() {
        let b0 = doc("plain");
        let b1 = doc("<b>plain</b>");
        let mut note = Note::new(1, "n");
        note.set_body(b0.clone());

        note.record_action(ActionKind::Bold);
        note.set_body(b1.clone());

        assert_eq!(note.undo(), Some(b0.clone()));
        assert_eq!(note.body(), b0);
        assert_eq!(
            note.history().redo_log().last(),
            Some(&Action::new(ActionKind::Unbold, b1.clone()))
        );

        assert_eq!(note.redo(), Some(b1.clone()));
        assert_eq!(note.body(), b1);
        assert_eq!(
            note.history().undo_log().last(),
            Some(&Action::new(ActionKind::Bold, b0))
        );
    }

    #[test]
    fn test_undo_until_empty_restores_original() {
        let mut note = Note::new(1, "n");
        let original = note.body().to_string();
        let edits = [
            (ActionKind::Insert, doc("a")),
            (ActionKind::Insert, doc("ab")),
            (ActionKind::Italicize, doc("<i>ab</i>")),
            (ActionKind::List, doc("<ul><li><i>ab</i></li></ul>")),
            (ActionKind::Delete, doc("<ul><li><i>a</i></li></ul>")),
        ];

        let mut snapshots = vec![original.clone()];
        for (kind, body) in &edits {
            note.edit(*kind, body.clone());
            snapshots.push(body.clone());
        }
        snapshots.pop();

        while let Some(body) = note.undo() {
            assert_eq!(Some(body), snapshots.pop());
        }
        assert_eq!(note.body(), original);
        assert!(snapshots.is_empty());
        assert_eq!(note.history().redo_len(), edits.len());
    }

    #[test]
    fn test_undo_then_redo_is_identity() {
        let mut note = Note::new(1, "n");
        note.edit(ActionKind::Insert, doc("one"));
        note.edit(ActionKind::Underline, doc("<u>one</u>"));
        let before = note.body().to_string();

        note.undo();
        note.redo();
        assert_eq!(note.body(), before);
    }

    #[test]
    fn test_fresh_edit_clears_redo() {
        let mut note = Note::new(1, "n");
        note.edit(ActionKind::Insert, doc("one"));
        note.edit(ActionKind::Insert, doc("two"));
        note.undo();
        assert!(note.can_redo());

        note.edit(ActionKind::Color, doc("<font color=red>one</font>"));
        assert!(!note.can_redo());
        assert_eq!(note.redo(), None);
    }

    #[test]
    fn test_manual_contract_clear_redo() {
        let mut note = Note::new(1, "n");
        note.record_action(ActionKind::Insert);
        note.set_body(doc("x"));
        note.undo();
        assert_eq!(note.history().redo_len(), 1);

        note.record_action(ActionKind::Insert);
        note.set_body(doc("y"));
        note.clear_redo();
        assert_eq!(note.history().redo_len(), 0);
    }

    #[test]
    fn test_undo_redo_on_empty_logs() {
        let mut note = Note::new(1, "n");
        let body = note.body().to_string();
        assert_eq!(note.undo(), None);
        assert_eq!(note.redo(), None);
        assert_eq!(note.body(), body);
    }

    #[test]
    fn test_history_limit_applies() {
        let mut note = Note::new(1, "n");
        note.set_history_limit(Some(2));
        for i in 0..5 {
            note.edit(ActionKind::Insert, doc(&i.to_string()));
        }
        assert_eq!(note.history().undo_len(), 2);
        assert_eq!(note.undo(), Some(doc("3")));
        assert_eq!(note.undo(), Some(doc("2")));
        assert_eq!(note.undo(), None);
    }

    #[test]
    fn test_listeners_fire_per_mutation() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut note = Note::new(4, "n");
        let log = Rc::clone(&seen);
        note.subscribe(move |n| log.borrow_mut().push((n.title().to_string(), n.is_active())));

        note.set_title("a");
        note.activate();
        note.set_body(doc("x"));
        note.deactivate();

        assert_eq!(
            *seen.borrow(),
            vec![
                ("a".to_string(), false),
                ("a".to_string(), true),
                ("a".to_string(), true),
                ("a".to_string(), false),
            ]
        );
    }

    #[test]
    fn test_listener_sees_post_state() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut note = Note::new(1, "n");
        note.edit(ActionKind::Insert, doc("after"));
        let log = Rc::clone(&seen);
        note.subscribe(move |n| log.borrow_mut().push(n.plain_text()));

        note.undo();
        note.redo();
        assert_eq!(*seen.borrow(), vec!["".to_string(), "after".to_string()]);
    }

    #[test]
    fn test_unsubscribe_and_display_toggle_are_silent() {
        let count = Rc::new(RefCell::new(0));
        let mut note = Note::new(1, "n");
        let c = Rc::clone(&count);
        let id = note.subscribe(move |_| *c.borrow_mut() += 1);

        note.hide();
        assert!(!note.is_display());
        note.show();
        assert_eq!(*count.borrow(), 0);

        assert!(note.unsubscribe(id));
        assert!(!note.unsubscribe(id));
        note.set_title("t");
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn test_preview_is_bounded_and_tag_free() {
        let mut note = Note::new(1, "n");
        let long = "<p>word</p>".repeat(60);
        note.set_body(doc(&long));
        let preview = note.preview();
        assert_eq!(preview.chars().count(), PREVIEW_LENGTH);
        assert!(!preview.contains('<'));
        assert!(preview.starts_with("word word"));
    }

    #[test]
    fn test_preview_counts_chars_not_bytes() {
        let mut note = Note::new(1, "n");
        note.set_body(doc(&"é".repeat(150)));
        assert_eq!(note.preview().chars().count(), 100);
    }

    #[test]
    fn test_apply_background_color() {
        let mut note = Note::new(1, "n");
        assert!(note.apply_background_color("silver"));
        assert!(note.body().contains("<body style='background-color: silver;'"));
        assert!(!note.apply_background_color("silver"));
        assert!(note.apply_background_color("white"));
        assert!(note.body().contains("background-color: white;"));
        assert!(!note.body().contains("silver"));
    }

    #[test]
    fn test_apply_background_color_clears_redo() {
        let mut note = Note::new(1, "n");
        note.edit(ActionKind::Insert, doc("one"));
        note.undo();
        assert!(note.can_redo());

        assert!(note.apply_background_color("silver"));
        assert!(!note.can_redo());
        assert_eq!(note.redo(), None);
        assert!(note.body().contains("background-color: silver;"));
    }

    #[test]
    fn test_apply_background_color_without_body_tag() {
        let mut note = Note::new(1, "n");
        note.set_body("<p>fragment</p>");
        assert!(!note.apply_background_color("white"));
        assert_eq!(note.body(), "<p>fragment</p>");
    }

    #[test]
    fn test_record_round_trip() {
        let mut note = Note::new(9, "Trip");
        note.set_body(doc("pack bags"));
        let record = note.to_record();

        let json = serde_json::to_string(&record).unwrap();
        let parsed: NoteRecord = serde_json::from_str(&json).unwrap();
        let restored = Note::from_record(parsed);

        assert_eq!(restored.id(), 9);
        assert_eq!(restored.title(), "Trip");
        assert_eq!(restored.body(), note.body());
        assert_eq!(
            super::super::format_timestamp(&restored.date_edited()),
            super::super::format_timestamp(&note.date_edited())
        );
        assert!(!restored.can_undo());
    }

    #[test]
    fn test_record_json_uses_fixed_timestamp_format() {
        let record = NoteRecord {
            id: 1,
            title: "t".to_string(),
            body: String::new(),
            date_created: super::super::parse_timestamp("2024-01-02 03:04:05").unwrap(),
            date_edited: super::super::parse_timestamp("2024-01-02 03:04:06").unwrap(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"date_created\":\"2024-01-02 03:04:05\""));
        assert!(json.contains("\"date_edited\":\"2024-01-02 03:04:06\""));
    }
}
