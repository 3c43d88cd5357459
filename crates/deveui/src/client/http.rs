use crate::{AttemptOutcome, DevEui, Endpoint, Error, Registrar, Result};
use core::time::Duration;
use reqwest::{Client, StatusCode};
use serde::Serialize;

/// Status the registration API uses to report an already registered DevEUI.
pub const CONFLICT_STATUS: StatusCode = StatusCode::UNPROCESSABLE_ENTITY;

#[derive(Serialize)]
struct RegistrationRequest {
    deveui: DevEui,
}

/// [`Registrar`] that POSTs `{"deveui": "<16 hex>"}` to the registration API.
///
/// - any 2xx status is a success,
/// - `422 Unprocessable Entity` is a conflict,
/// - everything else, including transport errors and timeouts, is a
///   transient error.
///
/// The underlying [`Client`] pools connections, so a single `HttpRegistrar`
/// should be shared by every worker.
#[derive(Clone, Debug)]
pub struct HttpRegistrar {
    http: Client,
}

impl HttpRegistrar {
    /// Builds a registrar with a fresh connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            // POST must not silently become a GET on redirect.
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { http })
    }

    /// Wraps an existing client.
    pub const fn with_client(http: Client) -> Self {
        Self { http }
    }

    async fn post(&self, deveui: DevEui, endpoint: &Endpoint, timeout: Duration) -> Result<StatusCode> {
        let response = self
            .http
            .post(endpoint.url().clone())
            .timeout(timeout)
            .json(&RegistrationRequest { deveui })
            .send()
            .await?;
        Ok(response.status())
    }
}

impl Registrar for HttpRegistrar {
    async fn attempt(&self, deveui: DevEui, endpoint: &Endpoint, timeout: Duration) -> AttemptOutcome {
        match self.post(deveui, endpoint, timeout).await {
            Ok(status) => classify(status),
            Err(e) => AttemptOutcome::TransientError(e),
        }
    }
}

/// Maps a response status to an attempt outcome.
pub fn classify(status: StatusCode) -> AttemptOutcome {
    if status.is_success() {
        AttemptOutcome::Success
    } else if status == CONFLICT_STATUS {
        AttemptOutcome::Conflict
    } else {
        AttemptOutcome::TransientError(Error::UnexpectedStatus {
            status: status.as_u16(),
        })
    }
}
