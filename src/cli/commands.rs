use clap::{Parser, Subcommand};

use crate::notebook::SortKey;

#[derive(Parser, Debug)]
#[command(name = "notes")]
#[command(version, about = "Rich-text notes with per-note undo/redo")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new notes project in the current directory
    Init,

    /// Create a new note
    New {
        /// Note title (defaults to "New Note")
        title: Option<String>,

        /// Body markup
        #[arg(long, conflicts_with = "stdin")]
        body: Option<String>,

        /// Read body markup from stdin
        #[arg(long)]
        stdin: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List notes
    List {
        /// Only show notes whose text matches this query
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Sort order (title, created, edited)
        #[arg(long)]
        sort: Option<SortKey>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single note
    Show {
        /// Note ID
        id: u32,

        /// Print the stored markup instead of plain text
        #[arg(long)]
        raw: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set a note's title
    Title {
        /// Note ID
        id: u32,

        /// New title (empty resets to "New Note")
        title: String,
    },

    /// Replace a note's body
    Edit {
        /// Note ID
        id: u32,

        /// Kind of edit (insert, delete, bold, unbold, italicize, ...)
        #[arg(long, short = 'a', default_value = "insert")]
        action: String,

        /// New body markup
        #[arg(long, conflicts_with = "stdin", required_unless_present = "stdin")]
        body: Option<String>,

        /// Read body markup from stdin
        #[arg(long)]
        stdin: bool,
    },

    /// Apply a colour theme to a note's background
    Theme {
        /// Note ID
        id: u32,

        /// Theme name (light, dark)
        theme: String,
    },

    /// Delete a note
    Delete {
        /// Note ID
        id: u32,

        /// Skip confirmation
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Search note text
    Search {
        /// Search query, with optional created:>DATE / edited:<DATE filters
        query: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Interactive editing session with undo/redo
    Shell,
}
