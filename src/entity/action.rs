// src/entity/action.rs
use serde::{Deserialize, Serialize};

/// Category of a text edit recorded in a note's history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Insert,
    Delete,
    Italicize,
    Unitalicize,
    Underline,
    Ununderline,
    Bold,
    Unbold,
    List,
    Unlist,
    Color,
    Uncolor,
}

impl ActionKind {
    pub const ALL: [ActionKind; 12] = [
        ActionKind::Insert,
        ActionKind::Delete,
        ActionKind::Italicize,
        ActionKind::Unitalicize,
        ActionKind::Underline,
        ActionKind::Ununderline,
        ActionKind::Bold,
        ActionKind::Unbold,
        ActionKind::List,
        ActionKind::Unlist,
        ActionKind::Color,
        ActionKind::Uncolor,
    ];

    /// The kind logged on the opposite stack when this one is replayed.
    pub fn inverse(self) -> Self {
        match self {
            ActionKind::Insert => ActionKind::Delete,
            ActionKind::Delete => ActionKind::Insert,
            ActionKind::Italicize => ActionKind::Unitalicize,
            ActionKind::Unitalicize => ActionKind::Italicize,
            ActionKind::Underline => ActionKind::Ununderline,
            ActionKind::Ununderline => ActionKind::Underline,
            ActionKind::Bold => ActionKind::Unbold,
            ActionKind::Unbold => ActionKind::Bold,
            ActionKind::List => ActionKind::Unlist,
            ActionKind::Unlist => ActionKind::List,
            ActionKind::Color => ActionKind::Uncolor,
            ActionKind::Uncolor => ActionKind::Color,
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::Insert => write!(f, "insert"),
            ActionKind::Delete => write!(f, "delete"),
            ActionKind::Italicize => write!(f, "italicize"),
            ActionKind::Unitalicize => write!(f, "unitalicize"),
            ActionKind::Underline => write!(f, "underline"),
            ActionKind::Ununderline => write!(f, "ununderline"),
            ActionKind::Bold => write!(f, "bold"),
            ActionKind::Unbold => write!(f, "unbold"),
            ActionKind::List => write!(f, "list"),
            ActionKind::Unlist => write!(f, "unlist"),
            ActionKind::Color => write!(f, "color"),
            ActionKind::Uncolor => write!(f, "uncolor"),
        }
    }
}

impl std::str::FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "insert" => Ok(ActionKind::Insert),
            "delete" => Ok(ActionKind::Delete),
            "italicize" | "italic" => Ok(ActionKind::Italicize),
            "unitalicize" | "unitalic" => Ok(ActionKind::Unitalicize),
            "underline" => Ok(ActionKind::Underline),
            "ununderline" => Ok(ActionKind::Ununderline),
            "bold" => Ok(ActionKind::Bold),
            "unbold" => Ok(ActionKind::Unbold),
            "list" => Ok(ActionKind::List),
            "unlist" => Ok(ActionKind::Unlist),
            "color" | "colour" => Ok(ActionKind::Color),
            "uncolor" | "uncolour" => Ok(ActionKind::Uncolor),
            _ => Err(format!("Invalid action kind: {}", s)),
        }
    }
}

/// A history entry: the kind of edit and the whole body captured for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    pub snapshot: String,
}

impl Action {
    pub fn new(kind: ActionKind, snapshot: impl Into<String>) -> Self {
        Self {
            kind,
            snapshot: snapshot.into(),
        }
    }
}
