//! Tagsync Core Library
//!
//! Copies package membership entries (name, owner, blocked flag) from one
//! Koji tag to another, possibly on a different hub.

pub mod config;
pub mod endpoint;
pub mod error;
pub mod hub;
pub mod sync;
pub mod xmlrpc;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{ProfileConfig, ProfileLoader};

    // Endpoints and sessions
    pub use crate::endpoint::EndpointRef;
    pub use crate::hub::{
        HubClient, HubSessionFactory, KojiSession, LoginMethod, PackageEntry, SessionFactory,
    };

    // Sync
    pub use crate::sync::{
        NormalizedRecord, SyncCommand, SyncEvent, SyncMode, SyncOptions, SyncReport, SyncReporter,
        WriterReporter,
    };

    // Errors
    pub use crate::error::{ConfigError, HubError, SessionError, SyncError};
}
