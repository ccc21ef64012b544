//! Progress bar display for batch runs

use indicatif::{ProgressBar, ProgressStyle};

use setlabel_core::{BatchObserver, LabelResult, LabelStatus};

/// Batch progress bar driven by orchestrator callbacks.
pub struct ProgressDisplay {
    bar: ProgressBar,
}

impl ProgressDisplay {
    pub fn new(total: u64) -> Self {
        let style = ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");

        let bar = ProgressBar::new(total);
        bar.set_style(style);
        Self { bar }
    }

    /// A display that tracks progress without drawing anything.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Handle for suspending the bar around prompts.
    pub fn bar(&self) -> ProgressBar {
        self.bar.clone()
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl BatchObserver for ProgressDisplay {
    fn batch_started(&self, total: usize) {
        self.bar.set_length(total as u64);
    }

    fn item_started(&self, _index: usize, code: &str) {
        self.bar.set_message(code.to_string());
    }

    fn item_finished(&self, _index: usize, result: &LabelResult) {
        if result.status == LabelStatus::Failed {
            let reason = result
                .error
                .as_ref()
                .map(|e| e.message.as_str())
                .unwrap_or("unknown error");
            self.bar.println(format!("✗ {}: {}", result.code, reason));
        }
        self.bar.inc(1);
    }
}
