//! Koji client configuration.
//!
//! Profiles live in INI files shared with the `koji` command-line client:
//! `/etc/koji.conf`, drop-in directories, and `~/.koji/config`.

pub mod paths;
pub mod profile;

pub use profile::{DEFAULT_SERVER, DEFAULT_TIMEOUT, ProfileConfig, ProfileLoader};
