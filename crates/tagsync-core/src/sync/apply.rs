//! Applying normalized records to the target tag.

use tracing::debug;

use super::reporter::{SyncEvent, SyncReporter};
use super::transform::NormalizedRecord;
use crate::error::HubError;
use crate::hub::KojiSession;

/// Whether records are written or only previewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
    #[default]
    Apply,
    DryRun,
}

impl SyncMode {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run { Self::DryRun } else { Self::Apply }
    }

    pub fn is_dry_run(&self) -> bool {
        matches!(self, Self::DryRun)
    }

    /// Line printed once every record has been processed.
    pub fn summary(&self) -> &'static str {
        match self {
            Self::Apply => "All packages have been synchronized.",
            Self::DryRun => "Dry run completed. No changes were made.",
        }
    }
}

/// A record the target refused.
#[derive(Debug)]
pub struct PackageFailure {
    pub package_name: String,
    pub error: HubError,
}

/// Outcome of applying one batch.
#[derive(Debug)]
pub struct SyncReport {
    pub mode: SyncMode,
    /// Records processed (previewed, applied or failed)
    pub processed: usize,
    /// Records the target accepted
    pub applied: usize,
    pub failures: Vec<PackageFailure>,
}

impl SyncReport {
    fn new(mode: SyncMode) -> Self {
        Self {
            mode,
            processed: 0,
            applied: 0,
            failures: Vec::new(),
        }
    }

    pub fn summary(&self) -> &'static str {
        self.mode.summary()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Writes records to one target tag, isolating per-record failures.
pub struct Applier<'a> {
    target: &'a dyn KojiSession,
    target_tag: &'a str,
    mode: SyncMode,
}

impl<'a> Applier<'a> {
    pub fn new(target: &'a dyn KojiSession, target_tag: &'a str, mode: SyncMode) -> Self {
        Self {
            target,
            target_tag,
            mode,
        }
    }

    /// Process every record in order. A failed record is reported and
    /// skipped; the remaining records are still processed.
    pub fn apply(
        &self,
        records: &[NormalizedRecord],
        reporter: &mut dyn SyncReporter,
    ) -> SyncReport {
        let mut report = SyncReport::new(self.mode);
        reporter.report(SyncEvent::Started {
            total: records.len(),
        });

        for record in records {
            match self.mode {
                SyncMode::DryRun => reporter.report(SyncEvent::Planned {
                    record,
                    target_tag: self.target_tag,
                }),
                SyncMode::Apply => self.apply_one(record, reporter, &mut report),
            }
            report.processed += 1;
        }

        reporter.report(SyncEvent::Finished { mode: self.mode });
        report
    }

    fn apply_one(
        &self,
        record: &NormalizedRecord,
        reporter: &mut dyn SyncReporter,
        report: &mut SyncReport,
    ) {
        let result = self.target.package_list_add(
            self.target_tag,
            &record.package_name,
            &record.owner,
            record.blocked,
        );

        match result {
            Ok(()) => {
                debug!(
                    package = %record.package_name,
                    package_id = record.package_id,
                    tag = self.target_tag,
                    "Added package"
                );
                report.applied += 1;
                reporter.report(SyncEvent::Applied {
                    record,
                    target_tag: self.target_tag,
                });
            }
            Err(error) => {
                debug!(
                    package = %record.package_name,
                    package_id = record.package_id,
                    %error,
                    "Adding package failed"
                );
                reporter.report(SyncEvent::Failed {
                    record,
                    error: &error,
                });
                report.failures.push(PackageFailure {
                    package_name: record.package_name.clone(),
                    error,
                });
            }
        }
    }
}
