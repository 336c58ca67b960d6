//! Aggregate preload progress

use serde::{Deserialize, Serialize};

/// Snapshot of preload progress
///
/// `progress_percent` is always `round(loaded_count / total_count * 100)`
/// and `is_complete` is always `loaded_count == total_count`, failures
/// included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreloadState {
    pub loaded_count: usize,
    pub total_count: usize,
    pub progress_percent: u8,
    pub is_complete: bool,
    pub errors: Vec<String>,
}

impl PreloadState {
    /// Fresh state for a manifest of `total_count` entries
    ///
    /// An empty manifest is complete from the start.
    pub fn new(total_count: usize) -> Self {
        let mut state = Self {
            loaded_count: 0,
            total_count,
            progress_percent: 0,
            is_complete: false,
            errors: Vec::new(),
        };
        state.recompute();
        state
    }

    /// One entry settled successfully
    pub(crate) fn record_success(&mut self) {
        self.settle();
    }

    /// One entry settled with an error; it still counts toward completion
    pub(crate) fn record_failure(&mut self, message: String) {
        self.errors.push(message);
        self.settle();
    }

    fn settle(&mut self) {
        if self.loaded_count < self.total_count {
            self.loaded_count += 1;
        }
        self.recompute();
    }

    fn recompute(&mut self) {
        self.progress_percent = if self.total_count == 0 {
            100
        } else {
            ((self.loaded_count as f64 / self.total_count as f64) * 100.0).round() as u8
        };
        self.is_complete = self.loaded_count == self.total_count;
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}
