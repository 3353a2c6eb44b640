//! Error types for profile resolution, hub calls and the sync pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while resolving a Koji client profile.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("no configuration for profile name: {0}")]
    UnknownProfile(String),

    #[error("invalid value for '{key}' in profile {profile}: {value}")]
    InvalidValue {
        profile: String,
        key: String,
        value: String,
    },
}

/// Failure of a single call against a Koji hub.
#[derive(Debug, Error)]
pub enum HubError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("hub returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// XML-RPC fault raised by the hub (e.g. `koji.GenericError`).
    #[error("{message} (fault {code})")]
    Fault { code: i64, message: String },

    #[error("malformed hub response: {0}")]
    Decode(String),

    #[error("TLS setup failed for {}: {message}", .path.display())]
    Tls { path: PathBuf, message: String },

    #[error("login failed: {0}")]
    Login(String),

    #[error("{0}")]
    Unsupported(String),
}

impl HubError {
    pub(crate) fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }
}

/// Cause of a failed session setup.
#[derive(Debug, Error)]
pub enum SessionFailure {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Hub(#[from] HubError),

    #[error("invalid hub URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Fatal error while opening a session for one endpoint.
#[derive(Debug, Error)]
#[error("{endpoint}: {source}")]
pub struct SessionError {
    pub endpoint: String,
    #[source]
    pub source: SessionFailure,
}

impl SessionError {
    pub fn new(endpoint: impl Into<String>, source: impl Into<SessionFailure>) -> Self {
        Self {
            endpoint: endpoint.into(),
            source: source.into(),
        }
    }
}

/// Fatal errors that abort a sync run before any mutation.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("listing packages of tag {tag} failed: {source}")]
    Listing {
        tag: String,
        #[source]
        source: HubError,
    },
}
