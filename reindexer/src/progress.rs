//! Progress reporting for reindex runs.
//!
//! Servers poll the job registry instead, so the default reporter is a
//! no-op; the indicatif bar is for CLI/TTY use.

use indicatif::{ProgressBar, ProgressStyle};

/// Minimal progress interface driven by the reindex worker.
pub trait ReindexProgress: Send + Sync {
    /// Announce the total entry count.
    fn begin(&self, _total: u64) {}
    /// One entry finished (successfully or not).
    fn entry(&self, _name: &str) {}
    /// Job reached a terminal state.
    fn finish(&self, _summary: &str) {}
}

/// No-op reporter for servers/headless runs.
#[derive(Default, Clone, Copy)]
pub struct NoopReindexProgress;
impl ReindexProgress for NoopReindexProgress {}

/// Indicatif-based bounded bar.
pub struct BarProgress {
    pb: ProgressBar,
}

impl BarProgress {
    pub fn new() -> Self {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>4}/{len:4} {msg}").unwrap(),
        );
        Self { pb }
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ReindexProgress for BarProgress {
    fn begin(&self, total: u64) {
        self.pb.set_length(total);
    }

    fn entry(&self, name: &str) {
        self.pb.inc(1);
        self.pb.set_message(name.to_string());
    }

    fn finish(&self, summary: &str) {
        self.pb.finish_with_message(summary.to_string());
    }
}
