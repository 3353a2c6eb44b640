//! Koji hub sessions.
//!
//! [`KojiSession`] is the capability the sync pipeline consumes; [`HubClient`]
//! implements it over XML-RPC, and [`SessionFactory`] turns endpoint
//! identifiers into authenticated sessions.

pub mod auth;
pub mod client;
pub mod factory;

pub use auth::{LoginMethod, ssllogin_url};
pub use client::{HubClient, SessionTokens};
pub use factory::{HubSessionFactory, SessionFactory};

use crate::error::HubError;
use crate::xmlrpc::Value;

/// One package entry of a tag, as returned by `listPackages`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntry {
    pub package_id: i64,
    pub package_name: String,
    pub owner_name: String,
    pub blocked: bool,
}

impl PackageEntry {
    pub fn new(
        package_id: i64,
        package_name: impl Into<String>,
        owner_name: impl Into<String>,
        blocked: bool,
    ) -> Self {
        Self {
            package_id,
            package_name: package_name.into(),
            owner_name: owner_name.into(),
            blocked,
        }
    }

    /// Decode one struct of a `listPackages` result.
    pub fn from_value(value: &Value) -> Result<Self, HubError> {
        let package_id = member(value, "package_id")?
            .as_i64()
            .ok_or_else(|| mistyped("package_id", "an integer"))?;
        let package_name = member(value, "package_name")?
            .as_str()
            .ok_or_else(|| mistyped("package_name", "a string"))?;
        let owner_name = member(value, "owner_name")?
            .as_str()
            .ok_or_else(|| mistyped("owner_name", "a string"))?;
        let blocked = member(value, "blocked")?
            .as_bool()
            .ok_or_else(|| mistyped("blocked", "a boolean"))?;

        Ok(Self::new(package_id, package_name, owner_name, blocked))
    }
}

fn member<'v>(value: &'v Value, name: &str) -> Result<&'v Value, HubError> {
    value
        .get(name)
        .ok_or_else(|| HubError::decode(format!("package entry without '{name}'")))
}

fn mistyped(name: &str, expected: &str) -> HubError {
    HubError::decode(format!("package entry field '{name}' is not {expected}"))
}

/// The two hub operations a sync run needs.
pub trait KojiSession {
    /// All package entries of `tag`.
    fn list_packages(&self, tag: &str) -> Result<Vec<PackageEntry>, HubError>;

    /// Add `package` to `tag`, or update its owner and blocked flag.
    fn package_list_add(
        &self,
        tag: &str,
        package: &str,
        owner: &str,
        blocked: bool,
    ) -> Result<(), HubError>;
}
