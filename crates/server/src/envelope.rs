//! Response shapes shared by every route.
//!
//! Voice-platform routes wrap their payload in `{"statusCode", "body"}` and
//! the HTTP status mirrors `statusCode`. Everything else (auth rejections,
//! malformed input, admin failures) renders `{"error", "status_code"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use loadbridge_core::errors::InterfaceError;
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct Envelope<T> {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(status: StatusCode, body: T) -> Self {
        Self { status_code: status.as_u16(), body }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into(), message: None, correlation_id: None }
    }
}

/// Envelope for an error raised while serving a voice-platform route.
pub fn envelope_error(error: &InterfaceError) -> Envelope<ErrorBody> {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = match error {
        InterfaceError::Conflict { message, correlation_id } => ErrorBody {
            error: "Load already booked".to_string(),
            message: Some(message.clone()),
            correlation_id: Some(correlation_id.clone()),
        },
        InterfaceError::ServiceUnavailable { correlation_id, .. }
        | InterfaceError::Internal { correlation_id, .. } => ErrorBody {
            error: error.user_message().to_string(),
            message: None,
            correlation_id: Some(correlation_id.clone()),
        },
        other => ErrorBody {
            error: other.message().to_string(),
            message: None,
            correlation_id: Some(other.correlation_id().to_string()),
        },
    };
    Envelope::new(status, body)
}

#[derive(Clone, Debug, Serialize)]
pub struct PlainError {
    pub error: String,
    pub status_code: u16,
}

pub fn plain_error(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(PlainError { error: error.into(), status_code: status.as_u16() })).into_response()
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use loadbridge_core::errors::InterfaceError;

    use super::{envelope_error, Envelope};

    #[test]
    fn envelope_status_drives_http_status() {
        let response = Envelope::new(StatusCode::CREATED, serde_json::json!({})).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[test]
    fn conflict_keeps_detail_in_message() {
        let envelope = envelope_error(&InterfaceError::Conflict {
            message: "Load L1 has already been booked by another carrier".to_string(),
            correlation_id: "req-1".to_string(),
        });

        assert_eq!(envelope.status_code, 409);
        assert_eq!(envelope.body.error, "Load already booked");
        assert_eq!(
            envelope.body.message.as_deref(),
            Some("Load L1 has already been booked by another carrier")
        );
    }

    #[test]
    fn internal_errors_hide_detail() {
        let envelope = envelope_error(&InterfaceError::ServiceUnavailable {
            message: "database is locked".to_string(),
            correlation_id: "req-2".to_string(),
        });

        assert_eq!(envelope.status_code, 503);
        assert!(!envelope.body.error.contains("locked"));
    }
}
