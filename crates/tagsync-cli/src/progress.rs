//! Terminal reporter: a progress bar with preview and error lines above it.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use tagsync_core::sync::{SyncEvent, SyncReporter};

const TEMPLATE: &str =
    "{msg}: {percent:>3}% [{wide_bar}] {pos}/{len} packages [{elapsed_precise}<{eta_precise}]";

pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Draws on stderr when `enabled` and stderr is a terminal.
    pub fn new(enabled: bool) -> Self {
        let bar = if enabled {
            ProgressBar::new(0)
        } else {
            ProgressBar::hidden()
        };
        let bar_style = ProgressStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        bar.set_style(bar_style);
        bar.set_message("Syncing packages");
        Self { bar }
    }
}

impl SyncReporter for ProgressReporter {
    fn report(&mut self, event: SyncEvent<'_>) {
        match event {
            SyncEvent::Started { total } => self.bar.set_length(total as u64),
            SyncEvent::Finished { .. } => self.bar.finish_and_clear(),
            _ => {}
        }

        if let Some(message) = event.message() {
            let line = match event {
                SyncEvent::Failed { .. } => style(message).red().to_string(),
                SyncEvent::Finished { .. } => style(message).bold().to_string(),
                _ => message,
            };
            self.bar.suspend(|| println!("{line}"));
        }

        if event.completes_record() {
            self.bar.inc(1);
        }
    }
}
