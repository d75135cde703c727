//! Inbound request metadata.

use axum::http::HeaderMap;

/// Header set by the request-id layers in `server`.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Request id assigned by the middleware stack, or `"unknown"` outside it.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}
