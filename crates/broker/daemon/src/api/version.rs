//! Broker API version precondition
//!
//! Every protocol request must carry `X-Broker-Api-Version`; the platform
//! announces which protocol revision it speaks. A request without the
//! header is rejected before any handler runs.

use crate::error::ApiError;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Header the platform uses to announce its protocol version
pub const API_VERSION_HEADER: &str = "x-broker-api-version";

/// Middleware rejecting requests without a version header
pub async fn require_api_version(request: Request, next: Next) -> Response {
    let present = request
        .headers()
        .get(API_VERSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| !value.trim().is_empty())
        .unwrap_or(false);

    if present {
        next.run(request).await
    } else {
        ApiError::PreconditionFailed(format!(
            "requests must include the {} header",
            API_VERSION_HEADER
        ))
        .into_response()
    }
}
