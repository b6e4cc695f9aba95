//! Per-task output tracking.
//!
//! After each run the orchestrator records which destination files a task
//! produced, slotted by category and position so repeated runs of the same
//! task replace its own entry without touching the others. Watch mode uses
//! the registry to tell the reload bridge which files changed.

use crate::config::Category;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The destination files one task produced in its latest run.
#[derive(Debug, Clone)]
pub struct TaskOutput {
    /// Task name, e.g. `js-2`
    pub task: String,
    /// Pipeline category
    pub category: Category,
    /// Zero-based position within the category
    pub index: usize,
    /// Absolute destination paths written
    pub paths: Vec<PathBuf>,
}

/// Latest outputs for every task, keyed by (category, index).
#[derive(Debug, Default)]
pub struct OutputRegistry {
    slots: BTreeMap<(Category, usize), TaskOutput>,
}

impl OutputRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a task's outputs, replacing any previous entry for the same
    /// slot.
    pub fn record(&mut self, output: TaskOutput) {
        self.slots.insert((output.category, output.index), output);
    }

    /// The latest output entry for a slot, if the task has run.
    pub fn get(&self, category: Category, index: usize) -> Option<&TaskOutput> {
        self.slots.get(&(category, index))
    }

    /// All entries in category/position order.
    pub fn all(&self) -> impl Iterator<Item = &TaskOutput> {
        self.slots.values()
    }

    /// Total number of destination paths across all slots.
    pub fn path_count(&self) -> usize {
        self.slots.values().map(|o| o.paths.len()).sum()
    }
}
