//! Profile logins: client certificates or the ambient Kerberos credential.

use std::path::Path;

use reqwest::blocking::ClientBuilder;
use reqwest::{Certificate, Identity};
use tracing::info;
use url::Url;

use super::client::HubClient;
use crate::config::ProfileConfig;
use crate::error::HubError;

/// How a profile authenticates against its hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMethod {
    /// `sslLogin` over TLS with the profile's client certificate
    Certificate,
    /// `sslLogin` at the `/ssllogin` path with a GSSAPI `Negotiate` token
    Kerberos,
}

impl LoginMethod {
    /// Certificate login needs `cert`, `ca` and `serverca`; anything less
    /// falls back to Kerberos.
    pub fn for_profile(profile: &ProfileConfig) -> Self {
        if profile.has_certificates() {
            Self::Certificate
        } else {
            Self::Kerberos
        }
    }
}

/// Path Kerberos logins are sent to, relative to the hub URL.
pub fn ssllogin_url(server: &Url) -> Url {
    let mut url = server.clone();
    let path = format!("{}/ssllogin", server.path().trim_end_matches('/'));
    url.set_path(&path);
    url
}

/// Log in to the hub of `profile`.
pub fn login(profile: &ProfileConfig, url: Url) -> Result<HubClient, HubError> {
    let method = LoginMethod::for_profile(profile);
    info!(profile = %profile.name, hub = %url, ?method, "Logging in");

    match method {
        LoginMethod::Certificate => certificate_login(profile, url),
        LoginMethod::Kerberos => kerberos_login(profile, url),
    }
}

fn certificate_login(profile: &ProfileConfig, url: Url) -> Result<HubClient, HubError> {
    let Some(cert) = profile.cert.as_deref() else {
        return Err(HubError::Login(format!(
            "profile {} has no client certificate",
            profile.name
        )));
    };

    let pem = read_pem(cert)?;
    let identity = Identity::from_pem(&pem).map_err(|e| HubError::Tls {
        path: cert.to_path_buf(),
        message: e.to_string(),
    })?;

    let http = base_builder(profile)?.identity(identity).build()?;
    let mut client = HubClient::new(http, url.clone());
    client.ssl_login(&url, None)?;
    Ok(client)
}

#[cfg(feature = "gssapi")]
fn kerberos_login(profile: &ProfileConfig, url: Url) -> Result<HubClient, HubError> {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    let host = url
        .host_str()
        .ok_or_else(|| HubError::Login(format!("hub URL {url} has no host")))?;
    let token = negotiate::initial_token(host, profile.principal.as_deref())?;
    let authorization = format!("Negotiate {}", STANDARD.encode(token));

    let http = base_builder(profile)?.build()?;
    let login_url = ssllogin_url(&url);
    let mut client = HubClient::new(http, url);
    client.ssl_login(&login_url, Some(&authorization))?;
    Ok(client)
}

#[cfg(not(feature = "gssapi"))]
fn kerberos_login(profile: &ProfileConfig, _url: Url) -> Result<HubClient, HubError> {
    Err(HubError::Unsupported(format!(
        "profile {} has no complete certificate configuration and this build \
         has no Kerberos support (rebuild with the `gssapi` feature)",
        profile.name
    )))
}

/// Client builder carrying the profile's timeout and hub trust settings.
fn base_builder(profile: &ProfileConfig) -> Result<ClientBuilder, HubError> {
    let mut builder = HubClient::builder(profile.timeout);

    if let Some(serverca) = profile.serverca.as_deref() {
        let pem = read_pem(serverca)?;
        let roots = Certificate::from_pem_bundle(&pem).map_err(|e| HubError::Tls {
            path: serverca.to_path_buf(),
            message: e.to_string(),
        })?;
        for root in roots {
            builder = builder.add_root_certificate(root);
        }
    }
    if profile.no_ssl_verify {
        builder = builder.danger_accept_invalid_certs(true);
    }

    Ok(builder)
}

fn read_pem(path: &Path) -> Result<Vec<u8>, HubError> {
    std::fs::read(path).map_err(|e| HubError::Tls {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(feature = "gssapi")]
mod negotiate {
    use libgssapi::context::{ClientCtx, CtxFlags};
    use libgssapi::credential::{Cred, CredUsage};
    use libgssapi::error::Error as GssError;
    use libgssapi::name::Name;
    use libgssapi::oid::{GSS_MECH_KRB5, GSS_NT_HOSTBASED_SERVICE, GSS_NT_KRB5_PRINCIPAL, OidSet};

    use crate::error::HubError;

    fn gss(e: GssError) -> HubError {
        HubError::Login(format!("GSSAPI: {e}"))
    }

    /// First `Negotiate` token for `HTTP@host`, using the default credential
    /// cache (or `principal` when given).
    pub fn initial_token(host: &str, principal: Option<&str>) -> Result<Vec<u8>, HubError> {
        let mut mechs = OidSet::new().map_err(gss)?;
        mechs.add(&GSS_MECH_KRB5).map_err(gss)?;

        let client_name = match principal {
            Some(principal) => {
                Some(Name::new(principal.as_bytes(), Some(&GSS_NT_KRB5_PRINCIPAL)).map_err(gss)?)
            }
            None => None,
        };
        let cred = Cred::acquire(client_name.as_ref(), None, CredUsage::Initiate, Some(&mechs))
            .map_err(gss)?;

        let service = format!("HTTP@{host}");
        let target = Name::new(service.as_bytes(), Some(&GSS_NT_HOSTBASED_SERVICE))
            .map_err(gss)?
            .canonicalize(Some(&GSS_MECH_KRB5))
            .map_err(gss)?;

        let mut ctx = ClientCtx::new(
            Some(cred),
            target,
            CtxFlags::GSS_C_MUTUAL_FLAG,
            Some(&GSS_MECH_KRB5),
        );
        let token = ctx
            .step(None, None)
            .map_err(gss)?
            .ok_or_else(|| HubError::Login("GSSAPI produced no initial token".to_string()))?;

        Ok(token.to_vec())
    }
}
