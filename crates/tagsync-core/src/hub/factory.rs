//! Turning endpoint identifiers into hub sessions.

use tracing::info;
use url::Url;

use super::KojiSession;
use super::auth;
use super::client::HubClient;
use crate::config::{DEFAULT_TIMEOUT, ProfileLoader};
use crate::endpoint::EndpointRef;
use crate::error::{SessionError, SessionFailure};

/// Produces an authenticated session for an endpoint.
pub trait SessionFactory {
    fn open(&self, endpoint: &EndpointRef) -> Result<Box<dyn KojiSession>, SessionError>;
}

/// Session factory backed by real hubs and the Koji client configuration.
#[derive(Debug, Clone)]
pub struct HubSessionFactory {
    loader: ProfileLoader,
}

impl HubSessionFactory {
    pub fn new(loader: ProfileLoader) -> Self {
        Self { loader }
    }

    /// Factory over the standard config locations.
    pub fn with_defaults() -> Self {
        Self::new(ProfileLoader::with_defaults())
    }

    pub fn loader(&self) -> &ProfileLoader {
        &self.loader
    }

    /// Connect to `endpoint`: URLs get an anonymous session, profiles are
    /// resolved and logged in.
    pub fn connect(&self, endpoint: &EndpointRef) -> Result<HubClient, SessionFailure> {
        match endpoint {
            EndpointRef::DirectUrl(raw) => {
                let url = parse_url(raw)?;
                info!(hub = %url, "Using anonymous session");
                Ok(HubClient::anonymous(url, DEFAULT_TIMEOUT)?)
            }
            EndpointRef::Profile(name) => {
                let profile = self.loader.load(name)?;
                let url = parse_url(&profile.server)?;
                Ok(auth::login(&profile, url)?)
            }
        }
    }
}

impl SessionFactory for HubSessionFactory {
    fn open(&self, endpoint: &EndpointRef) -> Result<Box<dyn KojiSession>, SessionError> {
        match self.connect(endpoint) {
            Ok(client) => Ok(Box::new(client)),
            Err(failure) => Err(SessionError::new(endpoint.to_string(), failure)),
        }
    }
}

fn parse_url(raw: &str) -> Result<Url, SessionFailure> {
    Url::parse(raw).map_err(|source| SessionFailure::InvalidUrl {
        url: raw.to_string(),
        source,
    })
}
