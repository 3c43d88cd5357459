//! Error types of the batch API.
//!
//! `ApiError` covers every request the daemon refuses. It implements
//! [`IntoResponse`] so handlers can return it directly; the body is
//! `{"error": "<message>"}` with a status matching the variant.
//!
//! ## Error Cases
//! - `InvalidRequest`: the batch size is zero or above the configured maximum.
//! - `NotFound`: no batch has the requested id.
//! - `ServiceOverloaded`: the job queue is full.
//! - `ServiceShutdown`: a request arrived while the daemon was shutting down.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The request was well formed but asked for something out of bounds.
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Batch {id} not found")]
    NotFound { id: Uuid },

    /// The queue cannot take more batches right now.
    #[error("Service is overloaded: {details}")]
    ServiceOverloaded { details: String },

    #[error("Service is shutting down")]
    ServiceShutdown,
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::ServiceOverloaded { .. } | Self::ServiceShutdown => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            #[cfg(feature = "tracing")]
            tracing::warn!("Rejecting request: {self}");
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
