//! The sync pipeline: open sessions, list the source tag, normalize, apply.
//!
//! Session setup and listing failures abort the run before anything is
//! written. Failures while applying affect only the record at hand.

pub mod apply;
pub mod reporter;
pub mod transform;

pub use apply::{Applier, PackageFailure, SyncMode, SyncReport};
pub use reporter::{SyncEvent, SyncReporter, WriterReporter};
pub use transform::{NormalizedRecord, normalize};

use tracing::info;

use crate::endpoint::EndpointRef;
use crate::error::SyncError;
use crate::hub::{HubSessionFactory, SessionFactory};

/// What to sync, from where, to where.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub source: EndpointRef,
    pub source_tag: String,
    pub target: EndpointRef,
    pub target_tag: String,
    /// Owner written for every record instead of the source owner
    pub override_owner: Option<String>,
    pub mode: SyncMode,
}

impl SyncOptions {
    pub fn new(
        source: &str,
        source_tag: impl Into<String>,
        target: &str,
        target_tag: impl Into<String>,
    ) -> Self {
        Self {
            source: EndpointRef::classify(source),
            source_tag: source_tag.into(),
            target: EndpointRef::classify(target),
            target_tag: target_tag.into(),
            override_owner: None,
            mode: SyncMode::Apply,
        }
    }

    /// Override every owner. An empty owner means no override.
    pub fn with_override_owner(mut self, owner: impl Into<String>) -> Self {
        let owner = owner.into();
        self.override_owner = if owner.is_empty() { None } else { Some(owner) };
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.mode = SyncMode::from_dry_run(dry_run);
        self
    }
}

/// Sync command orchestrator.
#[derive(Debug)]
pub struct SyncCommand<F> {
    factory: F,
}

impl SyncCommand<HubSessionFactory> {
    /// Sync command over real hubs and the standard config locations.
    pub fn with_defaults() -> Self {
        Self::new(HubSessionFactory::with_defaults())
    }
}

impl<F: SessionFactory> SyncCommand<F> {
    pub fn new(factory: F) -> Self {
        Self { factory }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Run one sync.
    ///
    /// Both sessions are opened before the source is listed; the returned
    /// report lists the records the target refused.
    pub fn execute(
        &self,
        options: &SyncOptions,
        reporter: &mut dyn SyncReporter,
    ) -> Result<SyncReport, SyncError> {
        let source = self.factory.open(&options.source)?;
        let target = self.factory.open(&options.target)?;

        let entries = source
            .list_packages(&options.source_tag)
            .map_err(|error| SyncError::Listing {
                tag: options.source_tag.clone(),
                source: error,
            })?;
        info!(
            count = entries.len(),
            tag = %options.source_tag,
            "Listed source packages"
        );

        let records = normalize(entries, options.override_owner.as_deref());
        let applier = Applier::new(target.as_ref(), &options.target_tag, options.mode);
        Ok(applier.apply(&records, reporter))
    }
}
