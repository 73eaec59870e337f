//! Response envelope.
//!
//! Every endpoint answers `{ success: 0|1, data?, message?, error? }` with
//! the HTTP status mirroring the semantic outcome.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// The wire envelope.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub success: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    pub fn data(value: impl Serialize) -> Self {
        Self {
            success: 1,
            data: serde_json::to_value(value).ok(),
            message: None,
            error: None,
        }
    }

    pub fn message(success: u8, message: impl Into<String>) -> Self {
        Self {
            success,
            data: None,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            success: 0,
            data: None,
            message: None,
            error: Some(error.into()),
        }
    }
}

/// 200 with a data payload.
pub fn ok_data(value: impl Serialize) -> Response {
    (StatusCode::OK, Json(Envelope::data(value))).into_response()
}

/// 200 with only a message.
pub fn ok_message(message: impl Into<String>) -> Response {
    (StatusCode::OK, Json(Envelope::message(1, message))).into_response()
}

/// 202: the upstream job is still running; not an error.
pub fn accepted(message: impl Into<String>) -> Response {
    (StatusCode::ACCEPTED, Json(Envelope::message(1, message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let env = Envelope::data(serde_json::json!({ "id": 1 }));
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(value["success"], 1);
        assert_eq!(value["data"]["id"], 1);
        assert!(value.get("message").is_none());
        assert!(value.get("error").is_none());

        let env = Envelope::error("boom");
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(value["success"], 0);
        assert_eq!(value["error"], "boom");
    }
}
