//! Koji client config path resolution helpers.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// System-wide config file.
pub const SYSTEM_CONFIG: &str = "/etc/koji.conf";

/// System-wide drop-in directory.
pub const SYSTEM_CONFIG_DIR: &str = "/etc/koji.conf.d";

/// Search path in increasing precedence, relative to `home_dir` for the
/// per-user entries. Each drop-in dir is read before its main file, so the
/// main file has the last word.
pub fn default_search_paths(home_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG_DIR), PathBuf::from(SYSTEM_CONFIG)];
    if let Some(home) = home_dir {
        paths.push(home.join(".koji").join("config.d"));
        paths.push(home.join(".koji").join("config"));
    }
    paths
}

/// Expand one search path entry into the files it stands for.
///
/// Directories contribute their `*.conf` files in name order, plain files
/// contribute themselves, and missing entries contribute nothing.
pub fn expand_search_path(path: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    if path.is_dir() {
        let entries = std::fs::read_dir(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let file = entry.path();
            if file.is_file() && file.extension().is_some_and(|ext| ext == "conf") {
                files.push(file);
            }
        }
        files.sort();
        Ok(files)
    } else if path.is_file() {
        Ok(vec![path.to_path_buf()])
    } else {
        Ok(Vec::new())
    }
}

/// Expand a leading `~` against the home directory.
pub fn expand_home(value: &str, home_dir: Option<&Path>) -> PathBuf {
    match (value.strip_prefix('~'), home_dir) {
        (Some(""), Some(home)) => home.to_path_buf(),
        (Some(rest), Some(home)) if rest.starts_with('/') => home.join(&rest[1..]),
        _ => PathBuf::from(value),
    }
}
