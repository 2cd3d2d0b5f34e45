//! Progress reporting for batch clones.
//!
//! The orchestrator always talks to a [`ProgressReporter`]; callers that do
//! not want a display get [`NoopProgress`].

use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos:>3}/{len:3} {msg}";

/// Sink for `(completed, total)` updates. Purely cosmetic.
pub trait ProgressReporter: Send + Sync {
    fn start(&self, _total: usize) {}

    fn advance(&self, completed: usize, total: usize);

    fn finish(&self) {}
}

/// Discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn advance(&self, _completed: usize, _total: usize) {}
}

/// Terminal progress bar.
#[derive(Clone)]
pub struct BarProgress {
    bar: ProgressBar,
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl BarProgress {
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(0))
    }

    /// Wrap an existing bar, e.g. `ProgressBar::hidden()` in tests.
    pub fn with_bar(bar: ProgressBar) -> Self {
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-");
        bar.set_style(style);
        bar.set_message("Cloning repos");
        Self { bar }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn length(&self) -> Option<u64> {
        self.bar.length()
    }
}

impl ProgressReporter for BarProgress {
    fn start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(0);
    }

    fn advance(&self, completed: usize, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_position(completed as u64);
    }

    fn finish(&self) {
        self.bar.finish_with_message("done");
    }
}
