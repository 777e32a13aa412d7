use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::config::NotesConfig;
use crate::entity::{format_timestamp, parse_timestamp, Note, NoteRecord};
use crate::error::{NotesError, Result};
use crate::notebook::Notebook;

pub const NOTES_DIR: &str = ".notes";
const NOTES_DB: &str = "notes.db";

/// SQLite-backed store of note records
pub struct NoteStore {
    conn: Connection,
    path: PathBuf,
}

impl NoteStore {
    /// Initialize a new notes project
    pub fn init(root: &Path) -> Result<Self> {
        let notes_dir = root.join(NOTES_DIR);

        if notes_dir.exists() {
            return Err(NotesError::AlreadyInitialized);
        }

        fs::create_dir_all(&notes_dir)?;
        NotesConfig::default().save(&notes_dir)?;

        let path = notes_dir.join(NOTES_DB);
        let store = Self {
            conn: Connection::open(&path)?,
            path,
        };
        store.init_schema()?;

        info!(path = %store.path.display(), "initialized note store");
        Ok(store)
    }

    /// Open an existing notes project
    pub fn open(root: &Path) -> Result<Self> {
        let path = root.join(NOTES_DIR).join(NOTES_DB);

        if !path.exists() {
            return Err(NotesError::NotInitialized);
        }

        let store = Self {
            conn: Connection::open(&path)?,
            path,
        };
        store.init_schema()?;

        debug!(path = %store.path.display(), "opened note store");
        Ok(store)
    }

    /// In-memory store, used by tests
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
            path: PathBuf::from(":memory:"),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS notes (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                body TEXT NOT NULL,
                date_created TEXT NOT NULL,
                date_edited TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Get the project directory holding the database
    pub fn notes_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Insert or replace a note's persisted fields
    pub fn save_note(&self, note: &Note) -> Result<()> {
        self.save_record(&note.to_record())
    }

    pub fn save_record(&self, record: &NoteRecord) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO notes (id, title, body, date_created, date_edited)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.id,
                record.title,
                record.body,
                format_timestamp(&record.date_created),
                format_timestamp(&record.date_edited),
            ],
        )?;
        Ok(())
    }

    pub fn get_record(&self, id: u32) -> Result<Option<NoteRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, title, body, date_created, date_edited FROM notes WHERE id = ?1",
                [id],
                raw_row,
            )
            .optional()?;
        row.map(into_record).transpose()
    }

    /// All records ordered by id
    pub fn list_records(&self) -> Result<Vec<NoteRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, body, date_created, date_edited FROM notes ORDER BY id")?;
        let rows = stmt.query_map([], raw_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(into_record(row?)?);
        }
        Ok(records)
    }

    pub fn load_notes(&self) -> Result<Vec<Note>> {
        Ok(self
            .list_records()?
            .into_iter()
            .map(Note::from_record)
            .collect())
    }

    /// Returns false if no note had this id
    pub fn delete_note(&self, id: u32) -> Result<bool> {
        let changed = self.conn.execute("DELETE FROM notes WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }

    pub fn next_id(&self) -> Result<u32> {
        let max: Option<u32> = self
            .conn
            .query_row("SELECT MAX(id) FROM notes", [], |row| row.get(0))?;
        Ok(max.unwrap_or(0) + 1)
    }

    /// Build a notebook from every stored note
    pub fn load_notebook(&self, config: &NotesConfig) -> Result<Notebook> {
        let mut notebook = Notebook::with_config(config);
        for note in self.load_notes()? {
            notebook.insert(note)?;
        }
        Ok(notebook)
    }

    /// Make the stored set match the notebook exactly
    pub fn save_notebook(&mut self, notebook: &Notebook) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM notes", [])?;
        for note in notebook.notes() {
            let record = note.to_record();
            tx.execute(
                "INSERT INTO notes (id, title, body, date_created, date_edited)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    record.id,
                    record.title,
                    record.body,
                    format_timestamp(&record.date_created),
                    format_timestamp(&record.date_edited),
                ],
            )?;
        }
        tx.commit()?;
        debug!(count = notebook.len(), "saved notebook");
        Ok(())
    }
}

type RawRow = (u32, String, String, String, String);

fn raw_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn into_record((id, title, body, created, edited): RawRow) -> Result<NoteRecord> {
    Ok(NoteRecord {
        id,
        title,
        body,
        date_created: parse_timestamp(&created)?,
        date_edited: parse_timestamp(&edited)?,
    })
}
