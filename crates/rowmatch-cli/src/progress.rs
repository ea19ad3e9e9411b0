//! Terminal progress bar for a running match.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use rowmatch_map::MatchObserver;

/// Progress bar over source values, drawn on stderr.
pub struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    pub fn new(enabled: bool) -> Self {
        let bar = ProgressBar::with_draw_target(None, draw_target(enabled));
        if let Ok(style) =
            ProgressStyle::with_template("{spinner} {msg} [{bar:40}] {pos}/{len} ({eta})")
        {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.set_message("matching");
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn draw_target(enabled: bool) -> ProgressDrawTarget {
    if enabled {
        ProgressDrawTarget::stderr()
    } else {
        ProgressDrawTarget::hidden()
    }
}

impl MatchObserver for ProgressObserver {
    fn on_progress(&self, done: usize, total: usize) {
        if self.bar.length() != Some(total as u64) {
            self.bar.set_length(total as u64);
        }
        // parallel runs report completions out of order
        if (done as u64) > self.bar.position() {
            self.bar.set_position(done as u64);
        }
    }
}
