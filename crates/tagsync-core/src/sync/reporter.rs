//! Progress and outcome reporting for sync runs.

use std::io::Write;

use super::apply::SyncMode;
use super::transform::NormalizedRecord;
use crate::error::HubError;

/// Something that happened while applying records.
#[derive(Debug, Clone, Copy)]
pub enum SyncEvent<'a> {
    /// Applying is about to start
    Started { total: usize },
    /// Dry run: the record would be added
    Planned {
        record: &'a NormalizedRecord,
        target_tag: &'a str,
    },
    /// The record was added on the target
    Applied {
        record: &'a NormalizedRecord,
        target_tag: &'a str,
    },
    /// Adding the record failed; the run continues
    Failed {
        record: &'a NormalizedRecord,
        error: &'a HubError,
    },
    /// Every record has been processed
    Finished { mode: SyncMode },
}

impl SyncEvent<'_> {
    /// The line shown to the user for this event, if any.
    pub fn message(&self) -> Option<String> {
        match self {
            SyncEvent::Planned { record, target_tag } => Some(format!(
                "Would add package {} to tag {} with owner {} and blocked status to {}",
                record.package_name,
                target_tag,
                record.owner,
                capitalized(record.blocked)
            )),
            SyncEvent::Failed { record, error } => Some(format!(
                "Error adding package {}: {}",
                record.package_name, error
            )),
            SyncEvent::Finished { mode } => Some(mode.summary().to_string()),
            SyncEvent::Started { .. } | SyncEvent::Applied { .. } => None,
        }
    }

    /// Whether this event completes one record.
    pub fn completes_record(&self) -> bool {
        matches!(
            self,
            SyncEvent::Planned { .. } | SyncEvent::Applied { .. } | SyncEvent::Failed { .. }
        )
    }
}

/// `True`/`False`, the way the Koji tooling prints flags.
fn capitalized(flag: bool) -> &'static str {
    if flag { "True" } else { "False" }
}

/// Receives sync events as they happen.
pub trait SyncReporter {
    fn report(&mut self, event: SyncEvent<'_>);
}

/// Writes event messages as lines to any writer.
#[derive(Debug)]
pub struct WriterReporter<W: Write> {
    writer: W,
}

impl<W: Write> WriterReporter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> SyncReporter for WriterReporter<W> {
    fn report(&mut self, event: SyncEvent<'_>) {
        if let Some(message) = event.message() {
            // Write failures never abort a run.
            let _ = writeln!(self.writer, "{message}");
        }
    }
}
