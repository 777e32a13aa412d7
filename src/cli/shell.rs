//! Line-oriented editing session over an in-memory notebook.
//!
//! The session plays the part of the editor view: it records an action
//! before each edit, clears the redo log after it, and tracks unsaved
//! changes by listening to the notebook and its notes.

use std::cell::Cell;
use std::rc::Rc;

use crate::config::{NotesConfig, Theme};
use crate::entity::{format_timestamp, ActionKind};
use crate::error::{NotesError, Result};
use crate::notebook::{Notebook, NotebookEvent, SortKey};

const HELP: &str = "\
Commands:
  list                  List visible notes (* marks the active note)
  new                   Create a note and select it
  select ID             Select a note
  show                  Show the active note as text
  body                  Print the active note's markup
  title [TEXT]          Set the active note's title
  edit KIND TEXT        Replace the body, recorded as KIND (insert, bold, ...)
  undo | redo           Step through the active note's history
  search [QUERY]        Filter notes by text; empty query shows all
  sort title|created|edited
  theme light|dark      Set the active note's background
  delete                Delete the active note
  save                  Write all notes to disk
  quit                  Save and leave";

/// What the caller should do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Continue(String),
    Save,
    Quit,
}

pub struct Session {
    notebook: Notebook,
    theme: Theme,
    dirty: Rc<Cell<bool>>,
}

impl Session {
    pub fn new(mut notebook: Notebook, config: NotesConfig) -> Self {
        let dirty = Rc::new(Cell::new(false));

        let flag = Rc::clone(&dirty);
        notebook.subscribe(move |event| {
            if matches!(event, NotebookEvent::Created(_) | NotebookEvent::Deleted(_)) {
                flag.set(true);
            }
        });

        let ids: Vec<u32> = notebook.notes().iter().map(|n| n.id()).collect();
        let mut session = Self {
            notebook,
            theme: config.theme,
            dirty,
        };
        for id in ids {
            session.watch(id);
        }
        session.dirty.set(false);
        session
    }

    /// Mark the session dirty whenever the note's persisted fields change,
    /// including the edit date.
    fn watch(&mut self, id: u32) {
        let flag = Rc::clone(&self.dirty);
        if let Some(note) = self.notebook.get_mut(id) {
            let mut last = (
                note.title().to_string(),
                note.body().to_string(),
                note.date_edited(),
            );
            note.subscribe(move |n| {
                let current = (n.title().to_string(), n.body().to_string(), n.date_edited());
                if current != last {
                    last = current;
                    flag.set(true);
                }
            });
        }
    }

    pub fn notebook(&self) -> &Notebook {
        &self.notebook
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    pub fn mark_saved(&mut self) {
        self.dirty.set(false);
    }

    pub fn execute(&mut self, line: &str) -> Result<Step> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        let output = match command {
            "" => String::new(),
            "help" | "?" => HELP.to_string(),
            "list" | "ls" => self.list(),
            "new" => {
                let id = self.notebook.create_note();
                self.watch(id);
                format!("Created note {:03}", id)
            }
            "select" => {
                let id = parse_id(rest)?;
                self.notebook.set_active(id)?;
                let note = self.notebook.note(id)?;
                format!("Selected note {:03} - {}", id, note.title())
            }
            "show" => {
                let note = self.notebook.active().ok_or(NotesError::NoActiveNote)?;
                format!(
                    "{:03}  {}\nEdited: {}\n\n{}",
                    note.id(),
                    note.title(),
                    format_timestamp(&note.date_edited()),
                    note.plain_text()
                )
            }
            "body" => {
                let note = self.notebook.active().ok_or(NotesError::NoActiveNote)?;
                note.body().trim_end().to_string()
            }
            "title" => {
                let note = self.active_note()?;
                note.set_title(rest);
                format!("Title set to '{}'", note.title())
            }
            "edit" => {
                let (kind, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                let kind: ActionKind = kind
                    .parse()
                    .map_err(|_| NotesError::InvalidActionKind(kind.to_string()))?;
                let note = self.active_note()?;
                note.edit(kind, text.trim_start());
                format!("Applied {}", kind)
            }
            "undo" => match self.notebook.undo_active()? {
                Some(_) => format!("Undone. {}", self.active_preview()),
                None => "Nothing to undo.".to_string(),
            },
            "redo" => match self.notebook.redo_active()? {
                Some(_) => format!("Redone. {}", self.active_preview()),
                None => "Nothing to redo.".to_string(),
            },
            "search" => {
                let shown = self.notebook.search(rest);
                format!("{} of {} notes shown.", shown, self.notebook.len())
            }
            "sort" => {
                let key: SortKey = rest.parse().map_err(NotesError::InvalidArgument)?;
                self.notebook.sort(key);
                self.list()
            }
            "theme" => {
                let theme: Theme = if rest.is_empty() {
                    self.theme
                } else {
                    rest.parse()
                        .map_err(|_| NotesError::InvalidTheme(rest.to_string()))?
                };
                let note = self.active_note()?;
                note.apply_background_color(theme.background_color());
                self.theme = theme;
                format!("Theme set to {}", theme)
            }
            "delete" => {
                let note = self.notebook.delete_active()?;
                format!("Deleted note {:03} - {}", note.id(), note.title())
            }
            "save" => return Ok(Step::Save),
            "quit" | "exit" | "q" => return Ok(Step::Quit),
            other => format!("Unknown command '{}'. Type 'help' for commands.", other),
        };

        Ok(Step::Continue(output))
    }

    fn active_note(&mut self) -> Result<&mut crate::entity::Note> {
        self.notebook.active_mut().ok_or(NotesError::NoActiveNote)
    }

    fn active_preview(&self) -> String {
        self.notebook
            .active()
            .map(|n| n.preview())
            .unwrap_or_default()
    }

    fn list(&self) -> String {
        let lines: Vec<String> = self
            .notebook
            .visible()
            .map(|note| {
                let marker = if note.is_active() { '*' } else { ' ' };
                format!("{} {:03}  {}  {}", marker, note.id(), note.title(), note.preview())
            })
            .collect();

        if lines.is_empty() {
            "No notes.".to_string()
        } else {
            lines.join("\n")
        }
    }
}

fn parse_id(s: &str) -> Result<u32> {
    s.parse()
        .map_err(|_| NotesError::InvalidArgument(format!("Expected a note id, got '{}'", s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(Notebook::new(), NotesConfig::default())
    }

    fn run(session: &mut Session, line: &str) -> String {
        match session.execute(line).unwrap() {
            Step::Continue(out) => out,
            other => panic!("unexpected step {:?}", other),
        }
    }

    #[test]
    fn test_new_and_list() {
        let mut s = session();
        assert_eq!(run(&mut s, "list"), "No notes.");
        assert_eq!(run(&mut s, "new"), "Created note 001");
        assert_eq!(run(&mut s, "list"), "* 001  New Note  ");
        assert!(s.is_dirty());
    }

    #[test]
    fn test_edit_undo_redo_cycle() {
        let mut s = session();
        run(&mut s, "new");
        run(&mut s, "edit insert <body>hello</body>");
        run(&mut s, "edit bold <body><b>hello</b></body>");

        assert_eq!(run(&mut s, "body"), "<body><b>hello</b></body>");
        assert_eq!(run(&mut s, "undo"), "Undone. hello");
        assert_eq!(run(&mut s, "body"), "<body>hello</body>");
        assert_eq!(run(&mut s, "redo"), "Redone. hello");
        assert_eq!(run(&mut s, "body"), "<body><b>hello</b></body>");

        run(&mut s, "undo");
        run(&mut s, "undo");
        assert_eq!(run(&mut s, "undo"), "Nothing to undo.");
        assert_eq!(
            run(&mut s, "body"),
            crate::entity::markup::EMPTY_DOCUMENT.trim_end()
        );
        assert!(run(&mut s, "show").starts_with("001  New Note\nEdited: "));
    }

    #[test]
    fn test_fresh_edit_drops_redo() {
        let mut s = session();
        run(&mut s, "new");
        run(&mut s, "edit insert one");
        run(&mut s, "undo");
        run(&mut s, "edit insert two");
        assert_eq!(run(&mut s, "redo"), "Nothing to redo.");
    }

    #[test]
    fn test_title_fallback() {
        let mut s = session();
        run(&mut s, "new");
        assert_eq!(run(&mut s, "title Groceries"), "Title set to 'Groceries'");
        assert_eq!(run(&mut s, "title"), "Title set to 'New Note'");
    }

    #[test]
    fn test_select_and_search() {
        let mut s = session();
        run(&mut s, "new");
        run(&mut s, "edit insert apples and pears");
        run(&mut s, "new");
        run(&mut s, "edit insert call the bank");

        assert_eq!(run(&mut s, "select 1"), "Selected note 001 - New Note");
        assert_eq!(run(&mut s, "search bank"), "1 of 2 notes shown.");
        assert_eq!(run(&mut s, "list"), "  002  New Note  call the bank");
        assert_eq!(run(&mut s, "search"), "2 of 2 notes shown.");
    }

    #[test]
    fn test_theme_updates_active_body() {
        let mut s = session();
        run(&mut s, "new");
        assert_eq!(run(&mut s, "theme dark"), "Theme set to dark");
        assert!(run(&mut s, "body").contains("background-color: silver;"));
        run(&mut s, "theme light");
        assert!(run(&mut s, "body").contains("background-color: white;"));
    }

    #[test]
    fn test_theme_ends_redo_chain() {
        let mut s = session();
        run(&mut s, "new");
        run(&mut s, "edit insert <body>one</body>");
        run(&mut s, "undo");
        run(&mut s, "theme dark");
        assert_eq!(run(&mut s, "redo"), "Nothing to redo.");
        assert!(run(&mut s, "body").contains("background-color: silver;"));
    }

    #[test]
    fn test_errors_without_active_note() {
        let mut s = session();
        assert!(matches!(s.execute("undo"), Err(NotesError::NoActiveNote)));
        assert!(matches!(s.execute("title x"), Err(NotesError::NoActiveNote)));
        assert!(matches!(s.execute("select 9"), Err(NotesError::NoteNotFound(9))));
        assert!(matches!(s.execute("delete"), Err(NotesError::NoActiveNote)));
    }

    #[test]
    fn test_invalid_arguments() {
        let mut s = session();
        run(&mut s, "new");
        assert!(matches!(
            s.execute("edit strike text"),
            Err(NotesError::InvalidActionKind(k)) if k == "strike"
        ));
        assert!(matches!(s.execute("theme sepia"), Err(NotesError::InvalidTheme(_))));
        assert!(s.execute("select abc").is_err());
    }

    #[test]
    fn test_save_and_quit_steps() {
        let mut s = session();
        assert_eq!(s.execute("save").unwrap(), Step::Save);
        assert_eq!(s.execute("quit").unwrap(), Step::Quit);
    }

    #[test]
    fn test_dirty_tracking_ignores_selection() {
        let mut book = Notebook::new();
        book.create_note();
        book.create_note();
        let mut s = Session::new(book, NotesConfig::default());
        assert!(!s.is_dirty());

        run(&mut s, "select 1");
        run(&mut s, "search nothing");
        assert!(!s.is_dirty());

        run(&mut s, "title Renamed");
        assert!(s.is_dirty());
        s.mark_saved();
        assert!(!s.is_dirty());
    }

    #[test]
    fn test_same_title_marks_dirty_when_edit_date_moves() {
        let mut book = Notebook::new();
        let id = book.create_note();
        let mut s = Session::new(book, NotesConfig::default());
        let before = s.notebook().note(id).unwrap().date_edited();

        std::thread::sleep(std::time::Duration::from_millis(1100));
        run(&mut s, "title New Note");
        assert_eq!(s.notebook().note(id).unwrap().title(), "New Note");
        assert!(s.notebook().note(id).unwrap().date_edited() > before);
        assert!(s.is_dirty());
    }

    #[test]
    fn test_delete_active() {
        let mut s = session();
        run(&mut s, "new");
        assert_eq!(run(&mut s, "delete"), "Deleted note 001 - New Note");
        assert_eq!(run(&mut s, "list"), "No notes.");
    }

    #[test]
    fn test_unknown_command() {
        let mut s = session();
        assert!(run(&mut s, "frobnicate").starts_with("Unknown command 'frobnicate'"));
    }
}
