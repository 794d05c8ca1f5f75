//! Mapping of domain errors onto HTTP responses.

use axum::http::StatusCode;
use tracing::warn;
use tryhub_core::{Error, ErrorKind};

/// Handler error: a status and a plain-text message.
pub type ApiError = (StatusCode, String);

pub fn status_for(err: &Error) -> StatusCode {
    match (err.kind(), err) {
        (_, Error::UpstreamTimeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
        (ErrorKind::Validation, _) => StatusCode::BAD_REQUEST,
        (ErrorKind::NotFound, _) => StatusCode::NOT_FOUND,
        (ErrorKind::Upstream, _) => StatusCode::BAD_GATEWAY,
        (ErrorKind::Invariant, _) => StatusCode::SERVICE_UNAVAILABLE,
        (ErrorKind::Internal, _) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn api_error(err: Error) -> ApiError {
    let status = status_for(&err);
    if status.is_server_error() {
        warn!(status = %status, error = %err, "Request failed");
    }
    (status, err.to_string())
}
