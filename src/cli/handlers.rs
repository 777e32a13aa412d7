use std::env;
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;

use tracing::debug;

use super::shell::{Session, Step};
use crate::config::{NotesConfig, Theme};
use crate::entity::{format_timestamp, ActionKind, Note, NoteRecord, DEFAULT_TITLE};
use crate::error::{NotesError, Result};
use crate::notebook::{Notebook, SortKey};
use crate::storage::{NoteStore, NOTES_DIR};

/// Find the project root by looking for .notes/
fn find_project_root() -> PathBuf {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let mut current = cwd.as_path();
    loop {
        if current.join(NOTES_DIR).exists() {
            return current.to_path_buf();
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return cwd,
        }
    }
}

fn open_project() -> Result<(NoteStore, NotesConfig)> {
    let root = find_project_root();
    let store = NoteStore::open(&root)?;
    let config = NotesConfig::load(store.notes_dir())?;
    Ok((store, config))
}

fn read_stdin() -> Result<String> {
    let mut content = String::new();
    io::stdin().read_to_string(&mut content)?;
    Ok(content)
}

fn summary_line(note: &Note) -> String {
    let marker = if note.is_active() { '*' } else { ' ' };
    format!(
        "{} {:03}  {}  {}",
        marker,
        note.id(),
        format_timestamp(&note.date_edited()),
        note.title()
    )
}

fn print_summaries<'a>(notes: impl Iterator<Item = &'a Note>) {
    for note in notes {
        println!("{}", summary_line(note));
        let preview = note.preview();
        if !preview.is_empty() {
            println!("      {}", preview);
        }
    }
}

pub fn handle_init() -> Result<()> {
    let root = env::current_dir()?;
    NoteStore::init(&root)?;
    println!("Initialized notes project in {}", root.display());
    Ok(())
}

pub fn handle_new(title: Option<String>, body: Option<String>, stdin: bool, json: bool) -> Result<()> {
    let (store, _config) = open_project()?;

    let mut note = Note::new(store.next_id()?, DEFAULT_TITLE);
    if let Some(title) = title {
        note.set_title(title);
    }

    let body = if stdin { Some(read_stdin()?) } else { body };
    if let Some(body) = body.filter(|b| !b.is_empty()) {
        note.set_body(body);
    }

    store.save_note(&note)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&note.to_record())?);
    } else {
        println!("Created note {:03} - {}", note.id(), note.title());
    }
    Ok(())
}

pub fn handle_list(search: Option<String>, sort: Option<SortKey>, json: bool) -> Result<()> {
    let (store, config) = open_project()?;
    let mut notebook = store.load_notebook(&config)?;

    if let Some(key) = sort {
        notebook.sort(key);
    }
    if let Some(query) = &search {
        notebook.search(query);
    }

    if json {
        let records: Vec<NoteRecord> = notebook.visible().map(Note::to_record).collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else if notebook.visible().next().is_none() {
        println!("No notes found.");
    } else {
        print_summaries(notebook.visible());
    }
    Ok(())
}

pub fn handle_show(id: u32, raw: bool, json: bool) -> Result<()> {
    let (store, _) = open_project()?;
    let record = store.get_record(id)?.ok_or(NotesError::NoteNotFound(id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    let note = Note::from_record(record);
    println!("{:03}  {}", note.id(), note.title());
    println!("Created: {}", format_timestamp(&note.date_created()));
    println!("Edited:  {}", format_timestamp(&note.date_edited()));
    println!();
    if raw {
        print!("{}", note.body());
        if !note.body().ends_with('\n') {
            println!();
        }
    } else {
        println!("{}", note.plain_text());
    }
    Ok(())
}

fn load_note(store: &NoteStore, id: u32) -> Result<Note> {
    store
        .get_record(id)?
        .map(Note::from_record)
        .ok_or(NotesError::NoteNotFound(id))
}

pub fn handle_title(id: u32, title: String) -> Result<()> {
    let (store, _) = open_project()?;
    let mut note = load_note(&store, id)?;
    note.set_title(title);
    store.save_note(&note)?;
    println!("Renamed note {:03} - {}", note.id(), note.title());
    Ok(())
}

pub fn handle_edit(id: u32, action: String, body: Option<String>, stdin: bool) -> Result<()> {
    let kind: ActionKind = action.parse().map_err(|_| NotesError::InvalidActionKind(action))?;
    let (store, _) = open_project()?;
    let mut note = load_note(&store, id)?;

    let body = if stdin { read_stdin()? } else { body.unwrap_or_default() };
    note.edit(kind, body);
    store.save_note(&note)?;

    debug!(note = id, %kind, "edited from command line");
    println!("Updated note {:03} ({}) - {}", note.id(), kind, note.title());
    Ok(())
}

pub fn handle_theme(id: u32, theme: String) -> Result<()> {
    let theme: Theme = theme.parse().map_err(|_| NotesError::InvalidTheme(theme))?;
    let (store, _) = open_project()?;
    let mut note = load_note(&store, id)?;

    if note.apply_background_color(theme.background_color()) {
        store.save_note(&note)?;
        println!("Applied {} theme to note {:03}", theme, note.id());
    } else {
        println!("Note {:03} unchanged.", note.id());
    }
    Ok(())
}

pub fn handle_delete(id: u32, force: bool) -> Result<()> {
    let (store, _) = open_project()?;
    let note = load_note(&store, id)?;

    // Confirm deletion unless --force is used
    if !force {
        eprintln!("Delete note {:03} - {}? [y/N] ", note.id(), note.title());

        if atty::is(atty::Stream::Stdin) {
            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Cancelled.");
                return Ok(());
            }
        } else {
            return Err(NotesError::Storage(
                "Use --force to delete in non-interactive mode".to_string(),
            ));
        }
    }

    store.delete_note(id)?;
    println!("Deleted note {:03} - {}", note.id(), note.title());
    Ok(())
}

pub fn handle_search(query: String, json: bool) -> Result<()> {
    let (store, config) = open_project()?;
    let mut notebook = store.load_notebook(&config)?;
    let shown = notebook.search(&query);

    if json {
        let records: Vec<NoteRecord> = notebook.visible().map(Note::to_record).collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else if shown == 0 {
        println!("No results found for '{}'.", query);
    } else {
        println!("Search results for '{}':\n", query);
        print_summaries(notebook.visible());
    }
    Ok(())
}

pub fn handle_shell() -> Result<()> {
    let (mut store, config) = open_project()?;
    let notebook: Notebook = store.load_notebook(&config)?;
    let mut session = Session::new(notebook, config);

    let interactive = atty::is(atty::Stream::Stdin);
    if interactive {
        println!("notes shell - type 'help' for commands");
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            print!("notes> ");
            io::stdout().flush()?;
        }

        let Some(line) = lines.next().transpose()? else {
            break;
        };

        match session.execute(&line) {
            Ok(Step::Continue(output)) => {
                if !output.is_empty() {
                    println!("{}", output);
                }
            }
            Ok(Step::Save) => {
                store.save_notebook(session.notebook())?;
                session.mark_saved();
                println!("Saved {} notes.", session.notebook().len());
            }
            Ok(Step::Quit) => break,
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    if session.is_dirty() {
        store.save_notebook(session.notebook())?;
        println!("Saved {} notes.", session.notebook().len());
    }
    Ok(())
}
