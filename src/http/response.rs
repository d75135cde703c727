//! Client-visible responses.
//!
//! # Responsibilities
//! - Map `ServiceError` to a status and a fixed body
//! - Relay the resolution service's answer through the edge service
//!
//! # Design Decisions
//! - Bodies are constants; error detail stays in the logs
//! - JSON bodies are `{"message": ...}`, everything else is plain text

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::{ServiceError, Upstream};
use crate::upstream::Relayed;

pub const INVALID_INPUT: &str = "invalid input";
pub const INVALID_ZIPCODE: &str = "invalid zipcode";
pub const ZIPCODE_NOT_FOUND: &str = "can not find zipcode";
pub const RESOLUTION_UNAVAILABLE: &str = "service b unavailable";
pub const TEMPERATURE_UNAVAILABLE: &str = "failed to get temperature";

#[derive(Debug, Serialize)]
struct Message {
    message: &'static str,
}

fn message(status: StatusCode, message: &'static str) -> Response {
    (status, Json(Message { message })).into_response()
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        match (&self, status) {
            (ServiceError::MalformedInput(_), _) => (status, INVALID_INPUT).into_response(),
            (ServiceError::InvalidFormat(_), _) => message(status, INVALID_ZIPCODE),
            (_, StatusCode::NOT_FOUND) => message(status, ZIPCODE_NOT_FOUND),
            _ if self.upstream() == Some(Upstream::Resolution) => (status, RESOLUTION_UNAVAILABLE).into_response(),
            _ => (status, TEMPERATURE_UNAVAILABLE).into_response(),
        }
    }
}

/// Hand the resolution service's answer back unchanged.
///
/// A 200 is always labelled `application/json`; other statuses keep whatever
/// content type the resolution service sent.
pub fn relay(relayed: Relayed) -> Response {
    let content_type = if relayed.status == StatusCode::OK {
        Some(HeaderValue::from_static("application/json"))
    } else {
        relayed.content_type
    };

    let mut response = Response::new(Body::from(relayed.body));
    *response.status_mut() = relayed.status;
    if let Some(content_type) = content_type {
        response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    }
    response
}
