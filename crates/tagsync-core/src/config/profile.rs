//! Koji client profiles and the loader that resolves them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::{Ini, ParseOption};
use tracing::debug;

use super::paths::{default_search_paths, expand_home, expand_search_path};
use crate::error::ConfigError;

/// Hub URL used when a profile does not set `server`.
pub const DEFAULT_SERVER: &str = "http://localhost/kojihub";

/// Call timeout used when a profile does not set `timeout`.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60 * 60 * 12);

/// A resolved profile: hub location plus credential material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileConfig {
    /// Profile (section) name
    pub name: String,
    /// Hub XML-RPC URL
    pub server: String,
    /// Client certificate with its private key, PEM
    pub cert: Option<PathBuf>,
    /// Client CA certificate
    pub ca: Option<PathBuf>,
    /// CA used to verify the hub
    pub serverca: Option<PathBuf>,
    /// Kerberos principal to log in as (default credential when unset)
    pub principal: Option<String>,
    pub timeout: Duration,
    pub no_ssl_verify: bool,
}

impl ProfileConfig {
    /// A profile with Koji client defaults for everything but the server.
    pub fn new(name: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            server: server.into(),
            cert: None,
            ca: None,
            serverca: None,
            principal: None,
            timeout: DEFAULT_TIMEOUT,
            no_ssl_verify: false,
        }
    }

    /// Build a profile from merged section options (lowercase keys).
    pub fn from_options(
        name: &str,
        options: &HashMap<String, String>,
        home_dir: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let value = |key: &str| {
            options
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };
        let path = |key: &str| value(key).map(|v| expand_home(v, home_dir));

        let mut profile = Self::new(name, value("server").unwrap_or(DEFAULT_SERVER));
        profile.cert = path("cert");
        profile.ca = path("ca");
        profile.serverca = path("serverca");
        profile.principal = value("principal").map(str::to_string);

        if let Some(raw) = value("timeout") {
            let seconds: u64 = raw.parse().map_err(|_| invalid(name, "timeout", raw))?;
            profile.timeout = Duration::from_secs(seconds);
        }
        if let Some(raw) = value("no_ssl_verify") {
            profile.no_ssl_verify =
                parse_bool(raw).ok_or_else(|| invalid(name, "no_ssl_verify", raw))?;
        }

        Ok(profile)
    }

    /// Whether `cert`, `ca` and `serverca` are all configured.
    pub fn has_certificates(&self) -> bool {
        self.cert.is_some() && self.ca.is_some() && self.serverca.is_some()
    }
}

fn invalid(profile: &str, key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        profile: profile.to_string(),
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Some(true),
        "0" | "no" | "false" | "off" => Some(false),
        _ => None,
    }
}

/// Resolves profile names against layered Koji client config files.
#[derive(Debug, Clone)]
pub struct ProfileLoader {
    search_paths: Vec<PathBuf>,
    extra_files: Vec<PathBuf>,
    home_dir: Option<PathBuf>,
}

impl ProfileLoader {
    /// Create a loader with an explicit search path (increasing precedence).
    pub fn new(search_paths: Vec<PathBuf>, home_dir: Option<PathBuf>) -> Self {
        Self {
            search_paths,
            extra_files: Vec::new(),
            home_dir,
        }
    }

    /// Create a loader over the standard system and per-user locations.
    pub fn with_defaults() -> Self {
        let home_dir = dirs::home_dir();
        Self::new(default_search_paths(home_dir.as_deref()), home_dir)
    }

    /// Add files that must exist and take precedence over the search path.
    pub fn with_extra_files(mut self, files: impl IntoIterator<Item = PathBuf>) -> Self {
        self.extra_files.extend(files);
        self
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Concrete config files to read, lowest precedence first.
    pub fn config_files(&self) -> Result<Vec<PathBuf>, ConfigError> {
        let mut files = Vec::new();
        for path in &self.search_paths {
            files.extend(expand_search_path(path)?);
        }
        for path in &self.extra_files {
            if !path.is_file() {
                return Err(ConfigError::Io {
                    path: path.clone(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "config file not found",
                    ),
                });
            }
            files.push(path.clone());
        }
        Ok(files)
    }

    /// Resolve a profile, merging its section key by key across all files.
    pub fn load(&self, profile: &str) -> Result<ProfileConfig, ConfigError> {
        let mut merged: HashMap<String, String> = HashMap::new();
        let mut found = false;

        for file in self.config_files()? {
            if let Some(section) = read_section(&file, profile)? {
                debug!(profile, file = %file.display(), "Found profile section");
                found = true;
                merged.extend(section);
            }
        }

        if !found {
            return Err(ConfigError::UnknownProfile(profile.to_string()));
        }

        ProfileConfig::from_options(profile, &merged, self.home_dir.as_deref())
    }
}

fn read_section(
    path: &Path,
    profile: &str,
) -> Result<Option<HashMap<String, String>>, ConfigError> {
    let options = ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        ..ParseOption::default()
    };

    let ini = Ini::load_from_file_opt(path, options).map_err(|e| match e {
        ini::Error::Io(source) => ConfigError::Io {
            path: path.to_path_buf(),
            source,
        },
        ini::Error::Parse(err) => ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        },
    })?;

    Ok(ini.section(Some(profile)).map(|props| {
        props
            .iter()
            .map(|(key, value)| (key.to_ascii_lowercase(), value.to_string()))
            .collect()
    }))
}
