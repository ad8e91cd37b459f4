// src/progress.rs
/// Lightweight progress reporting used by long-running operations (collect/train).
/// Frontends implement this to surface status to users.
pub trait Progress {
    /// Called at the start with the total number of items (if known).
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Called when one bill produced a row.
    fn item_done(&mut self, _id: u32) {}

    /// Called when one bill was dropped (core fetch failed).
    fn item_skipped(&mut self, _id: u32, _reason: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// Counts outcomes; handy for tests and summaries.
#[derive(Debug, Default)]
pub struct Tally {
    pub total: usize,
    pub done: Vec<u32>,
    pub skipped: Vec<u32>,
    pub finished: bool,
}

impl Progress for Tally {
    fn begin(&mut self, total: usize) {
        self.total = total;
    }
    fn item_done(&mut self, id: u32) {
        self.done.push(id);
    }
    fn item_skipped(&mut self, id: u32, _reason: &str) {
        self.skipped.push(id);
    }
    fn finish(&mut self) {
        self.finished = true;
    }
}
