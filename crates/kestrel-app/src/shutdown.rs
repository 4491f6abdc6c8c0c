//! Shutdown state collection
//!
//! When shutdown begins, every window alive at that moment is asked for
//! its state. The barrier remembers exactly that set: a window that closes
//! instead of answering stops being owed an answer, and windows opened
//! after the broadcast are never part of the round.

use std::collections::HashSet;

use kestrel_core::state::WindowSnapshot;
use kestrel_core::window::WindowId;

/// Where the process is in its shutdown lifecycle
#[derive(Debug, Default)]
pub enum ShutdownPhase {
    /// Running normally
    #[default]
    Idle,
    /// Waiting for window state reports
    Collecting(ShutdownBarrier),
    /// The one persistence attempt has happened; next stop is process exit
    PersistAttempted,
}

impl ShutdownPhase {
    /// Whether the persistence attempt has already happened
    pub fn is_attempted(&self) -> bool {
        matches!(self, ShutdownPhase::PersistAttempted)
    }
}

/// One round of shutdown state collection
#[derive(Debug)]
pub struct ShutdownBarrier {
    /// Windows still owing a response
    pending: HashSet<WindowId>,
    /// Windows whose response was counted
    responded: HashSet<WindowId>,
    /// Non-empty payloads, in arrival order
    collected: Vec<WindowSnapshot>,
}

impl ShutdownBarrier {
    /// Start a round expecting answers from exactly `expected`
    pub fn new(expected: impl IntoIterator<Item = WindowId>) -> Self {
        Self {
            pending: expected.into_iter().collect(),
            responded: HashSet::new(),
            collected: Vec::new(),
        }
    }

    /// Record a response
    ///
    /// Returns false when the response was a duplicate or came from a
    /// window this round never asked; those are not counted and their
    /// payloads are dropped.
    pub fn record(&mut self, window: WindowId, snapshot: Option<WindowSnapshot>) -> bool {
        if !self.pending.remove(&window) {
            return false;
        }

        self.responded.insert(window);
        if let Some(snapshot) = snapshot {
            self.collected.push(snapshot);
        }
        true
    }

    /// Stop waiting for a window that closed
    pub fn forget(&mut self, window: WindowId) {
        self.pending.remove(&window);
    }

    /// Whether every expected window has responded or closed
    pub fn is_satisfied(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of windows still owing a response
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Number of responses counted so far
    pub fn responses(&self) -> usize {
        self.responded.len()
    }

    /// Hand over the collected payloads
    pub fn into_snapshots(self) -> Vec<WindowSnapshot> {
        self.collected
    }
}
