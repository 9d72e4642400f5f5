//! Exchanges the OAuth2 proxy's session cookie for the caller's identity.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url, header::COOKIE};
use serde::{Deserialize, Serialize};

/// The name of the session cookie set by the OAuth2 proxy.
pub const SESSION_COOKIE: &str = "_oauth2_proxy";

/// How long to wait for the userinfo endpoint before giving up.
pub const DEFAULT_USERINFO_TIMEOUT: Duration = Duration::from_secs(5);

/// The verified identity of the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// The caller's user name at the identity provider.
    #[serde(rename = "user")]
    pub username: String,
    /// The caller's email address. This is the key that links a caller to their data.
    pub email: String,
}

impl Identity {
    /// The identity handed out when authentication is bypassed for development.
    pub fn stub() -> Self {
        Self {
            username: "test".to_owned(),
            email: "test@example.com".to_owned(),
        }
    }
}

/// The reasons an identity could not be resolved.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum IdentityError {
    /// The request did not carry the session cookie.
    #[error("the session cookie is missing")]
    MissingCookie,

    /// The server was started without a userinfo endpoint.
    #[error("no userinfo endpoint has been configured")]
    MissingEndpoint,

    /// The userinfo endpoint could not be reached or timed out.
    #[error("could not reach the userinfo endpoint: {0}")]
    Transport(String),

    /// The userinfo endpoint did not accept the session.
    #[error("the userinfo endpoint responded with {0}")]
    Rejected(StatusCode),

    /// The userinfo endpoint responded with something other than the expected JSON.
    #[error("could not decode the userinfo response: {0}")]
    MalformedBody(String),
}

#[derive(Debug, Clone)]
enum IdentitySource {
    Stub,
    Userinfo { client: Client, endpoint: Url },
    Unconfigured,
}

/// Resolves the caller's [Identity] from their session cookie.
///
/// Whether authentication is bypassed is decided once, when the resolver is
/// constructed.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    source: IdentitySource,
}

impl IdentityResolver {
    /// A resolver that skips authentication and always returns [Identity::stub].
    ///
    /// For local development only.
    pub fn bypass() -> Self {
        tracing::warn!("Authentication is bypassed, every caller is {:?}", Identity::stub());

        Self {
            source: IdentitySource::Stub,
        }
    }

    /// A resolver that asks the OAuth2 proxy's userinfo `endpoint` who the caller is.
    ///
    /// If `endpoint` is `None` the resolver rejects every request.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be constructed.
    pub fn userinfo(endpoint: Option<Url>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let source = match endpoint {
            Some(endpoint) => {
                let client = Client::builder().timeout(timeout).build()?;
                IdentitySource::Userinfo { client, endpoint }
            }
            None => {
                tracing::error!(
                    "No userinfo endpoint configured, all authenticated requests will be rejected"
                );
                IdentitySource::Unconfigured
            }
        };

        Ok(Self { source })
    }

    /// Whether this resolver skips authentication.
    pub fn is_bypass(&self) -> bool {
        matches!(self.source, IdentitySource::Stub)
    }

    /// Resolve the identity behind `session_cookie`, the value of the [SESSION_COOKIE] cookie.
    ///
    /// # Errors
    ///
    /// Returns an [IdentityError] if the cookie is missing, no endpoint is
    /// configured, the endpoint cannot be reached or does not answer 200 OK,
    /// or the response is not the expected JSON.
    pub async fn resolve(&self, session_cookie: Option<&str>) -> Result<Identity, IdentityError> {
        let (client, endpoint) = match &self.source {
            IdentitySource::Stub => return Ok(Identity::stub()),
            IdentitySource::Unconfigured => return Err(IdentityError::MissingEndpoint),
            IdentitySource::Userinfo { client, endpoint } => (client, endpoint),
        };

        let session_cookie = session_cookie.ok_or(IdentityError::MissingCookie)?;

        let response = client
            .get(endpoint.clone())
            .header(COOKIE, format!("{SESSION_COOKIE}={session_cookie}"))
            .send()
            .await
            .map_err(|error| IdentityError::Transport(error.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(IdentityError::Rejected(status));
        }

        let identity = response
            .json::<Identity>()
            .await
            .map_err(|error| IdentityError::MalformedBody(error.to_string()))?;

        tracing::debug!("Resolved session to {}", identity.email);

        Ok(identity)
    }
}
