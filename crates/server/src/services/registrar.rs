//! The `register` capability used by the bulk importer.
//!
//! Registration can happen in-process ([`RegistrationService`]) or through a
//! remote `registerUser` endpoint ([`RemoteRegistrar`]). Either way a failed
//! call is reported as a [`RegistrarError`] and the importer skips the row.

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;
use rollcall_core::{RegisteredUser, RegistrationError, RegistrationPayload, RegistrationRequest};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use super::registration::RegistrationService;

/// Timeout for a single remote registration call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors returned by a [`Registrar`].
#[derive(Debug, Error)]
pub enum RegistrarError {
    /// The registrar rejected the payload.
    #[error("registration rejected: {0}")]
    Rejected(#[from] RegistrationError),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Registration endpoint returned an unexpected status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Something that can register a validated payload.
pub trait Registrar: Send + Sync {
    /// Register `payload`, returning the stored user.
    fn register(
        &self,
        payload: RegistrationPayload,
    ) -> impl Future<Output = Result<RegisteredUser, RegistrarError>> + Send;
}

/// Error body returned by the `registerUser` endpoint.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for a remote `registerUser` endpoint.
#[derive(Debug, Clone)]
pub struct RemoteRegistrar {
    client: reqwest::Client,
    endpoint: Url,
}

impl RemoteRegistrar {
    /// Create a client posting to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(endpoint: Url) -> Result<Self, RegistrarError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { client, endpoint })
    }
}

impl Registrar for RemoteRegistrar {
    async fn register(&self, payload: RegistrationPayload) -> Result<RegisteredUser, RegistrarError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&RegistrationRequest::from(payload))
            .send()
            .await?;
        let status = response.status();

        if status.is_success() {
            return response
                .json::<RegisteredUser>()
                .await
                .map_err(|e| RegistrarError::Parse(e.to_string()));
        }

        let message = response.text().await.unwrap_or_default();

        if status == StatusCode::BAD_REQUEST
            && let Some(rejection) = serde_json::from_str::<ErrorBody>(&message)
                .ok()
                .and_then(|body| RegistrationError::from_message(&body.error))
        {
            return Err(RegistrarError::Rejected(rejection));
        }

        Err(RegistrarError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Registrar selected at start-up.
#[derive(Debug, Clone)]
pub enum Registrars {
    /// Register into this process's store.
    Local(RegistrationService),
    /// Register through a remote endpoint.
    Remote(RemoteRegistrar),
}

impl Registrar for Registrars {
    async fn register(&self, payload: RegistrationPayload) -> Result<RegisteredUser, RegistrarError> {
        match self {
            Self::Local(service) => Registrar::register(service, payload).await,
            Self::Remote(remote) => remote.register(payload).await,
        }
    }
}
