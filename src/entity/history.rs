// src/entity/history.rs
//! Paired undo/redo logs of whole-body snapshots.

use super::action::Action;

/// Default number of entries kept per log
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Two linear action logs. A capacity of `None` keeps every entry; otherwise
/// the oldest entry of a log is dropped when a push would exceed it.
#[derive(Debug, Clone, Default)]
pub struct UndoRedoStack {
    undo_log: Vec<Action>,
    redo_log: Vec<Action>,
    capacity: Option<usize>,
}

impl UndoRedoStack {
    pub fn new() -> Self {
        Self::with_capacity(Some(DEFAULT_HISTORY_LIMIT))
    }

    /// `Some(0)` is treated as unbounded, matching `history_limit: 0` in config.
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            undo_log: Vec::new(),
            redo_log: Vec::new(),
            capacity: capacity.filter(|&c| c > 0),
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Change the bound, trimming both logs from the oldest end.
    pub fn set_capacity(&mut self, capacity: Option<usize>) {
        self.capacity = capacity.filter(|&c| c > 0);
        if let Some(cap) = self.capacity {
            trim_front(&mut self.undo_log, cap);
            trim_front(&mut self.redo_log, cap);
        }
    }

    pub fn push_undo(&mut self, action: Action) {
        push_bounded(&mut self.undo_log, action, self.capacity);
    }

    pub fn push_redo(&mut self, action: Action) {
        push_bounded(&mut self.redo_log, action, self.capacity);
    }

    pub fn pop_undo(&mut self) -> Option<Action> {
        self.undo_log.pop()
    }

    pub fn pop_redo(&mut self) -> Option<Action> {
        self.redo_log.pop()
    }

    pub fn clear_redo(&mut self) {
        self.redo_log.clear();
    }

    pub fn clear(&mut self) {
        self.undo_log.clear();
        self.redo_log.clear();
    }

    pub fn undo_len(&self) -> usize {
        self.undo_log.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_log.len()
    }

    /// Oldest first.
    pub fn undo_log(&self) -> &[Action] {
        &self.undo_log
    }

    /// Oldest first.
    pub fn redo_log(&self) -> &[Action] {
        &self.redo_log
    }
}

fn push_bounded(log: &mut Vec<Action>, action: Action, capacity: Option<usize>) {
    log.push(action);
    if let Some(cap) = capacity {
        trim_front(log, cap);
    }
}

fn trim_front(log: &mut Vec<Action>, cap: usize) {
    if log.len() > cap {
        let excess = log.len() - cap;
        log.drain(..excess);
    }
}
