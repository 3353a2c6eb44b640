//! Hub endpoint identifiers.

use std::fmt;

/// How a command-line endpoint identifier reaches a hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointRef {
    /// Literal hub URL; the session is anonymous
    DirectUrl(String),
    /// Named profile from the Koji client configuration
    Profile(String),
}

impl EndpointRef {
    /// Classify an identifier: `http://` and `https://` prefixes are URLs,
    /// everything else names a profile.
    pub fn classify(identifier: &str) -> Self {
        if identifier.starts_with("http://") || identifier.starts_with("https://") {
            Self::DirectUrl(identifier.to_string())
        } else {
            Self::Profile(identifier.to_string())
        }
    }

    /// Check if this is a literal URL.
    pub fn is_direct_url(&self) -> bool {
        matches!(self, Self::DirectUrl(_))
    }

    /// Check if this names a profile.
    pub fn is_profile(&self) -> bool {
        matches!(self, Self::Profile(_))
    }

    /// Get the profile name if this is a profile reference.
    pub fn as_profile(&self) -> Option<&str> {
        match self {
            Self::Profile(name) => Some(name),
            _ => None,
        }
    }

    /// The identifier as given on the command line.
    pub fn as_str(&self) -> &str {
        match self {
            Self::DirectUrl(url) => url,
            Self::Profile(name) => name,
        }
    }
}

impl fmt::Display for EndpointRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectUrl(url) => write!(f, "{url}"),
            Self::Profile(name) => write!(f, "profile '{name}'"),
        }
    }
}
