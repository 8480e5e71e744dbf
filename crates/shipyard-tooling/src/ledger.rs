//! Per-file record of the create-then-assign protocol.

use std::collections::HashMap;
use std::sync::Mutex;

use shipyard_core::{Error, LockOrRecover as _, ProjectFilePath, Result};

/// Protocol state of one project file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    /// Scaffolded, waiting for a task.
    Created,
    /// Handed to code generation at least once.
    Assigned,
}

/// Tracks which files went through the file creator.
///
/// Shared across dispatches by the caller that owns the conversation. A
/// dispatcher without a ledger keeps no state between calls.
#[derive(Debug, Default)]
pub struct FileLedger {
    /// State by storage key.
    states: Mutex<HashMap<ProjectFilePath, FileState>>,
}

impl FileLedger {
    /// Empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a (re)created file. Recreating resets it to `Created`.
    pub fn mark_created(&self, path: &ProjectFilePath) {
        self.states
            .lock_or_recover()
            .insert(path.clone(), FileState::Created);
    }

    /// Records a completed assignment.
    pub fn mark_assigned(&self, path: &ProjectFilePath) {
        self.states
            .lock_or_recover()
            .insert(path.clone(), FileState::Assigned);
    }

    /// Current state of `path`, if tracked.
    #[must_use]
    pub fn state(&self, path: &ProjectFilePath) -> Option<FileState> {
        self.states.lock_or_recover().get(path).copied()
    }

    /// Checks that `path` went through the file creator.
    ///
    /// Assigned files may be assigned again.
    ///
    /// # Errors
    /// Returns [`Error::Protocol`] for files the ledger never saw created.
    pub fn ensure_assignable(&self, path: &ProjectFilePath) -> Result<()> {
        match self.state(path) {
            Some(FileState::Created | FileState::Assigned) => Ok(()),
            None => Err(Error::Protocol(format!(
                "{path} was never created; call file_creator_tool first"
            ))),
        }
    }
}
