use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capi::SendResult;

#[derive(Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Body of the acknowledgment returned to the chat platform. The HTTP status
/// is 200 either way; this is where success and failure are told apart.
#[derive(Debug, Deserialize, Serialize)]
pub struct WebhookResponse {
    pub status: ResponseStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events_received: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fbtrace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<SendResult> for WebhookResponse {
    fn from(result: SendResult) -> Self {
        match result {
            SendResult::Success {
                events_received,
                fbtrace_id,
                ..
            } => WebhookResponse {
                status: ResponseStatus::Success,
                message: "Event sent to Meta successfully".to_string(),
                events_received: Some(events_received),
                fbtrace_id: Some(fbtrace_id),
                error: None,
            },
            SendResult::Failure { error, .. } => WebhookResponse {
                status: ResponseStatus::Error,
                message: "Failed to send to Meta, but webhook acknowledged".to_string(),
                events_received: None,
                fbtrace_id: None,
                error: Some(error),
            },
        }
    }
}

/// Liveness payload for `/` and `/_liveness`.
#[derive(Debug, Deserialize, Serialize)]
pub struct ServiceInfo {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Detailed health payload: echoes non-secret configuration only.
#[derive(Debug, Deserialize, Serialize)]
pub struct HealthInfo {
    pub status: String,
    pub meta_pixel_id: String,
    pub api_version: String,
}

/// Validation failures rejected at the interface, before the sender runs.
/// These are the only paths allowed to answer with a non-200 status.
#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("webhook submitted with an empty phone")]
    EmptyPhone,
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        match self {
            WebhookError::EmptyPhone => (StatusCode::BAD_REQUEST, self.to_string()),
        }
        .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_result_maps_to_success_body() {
        let result = SendResult::Success {
            events_received: 1,
            fbtrace_id: "AbCdEf".to_string(),
            response: json!({"events_received": 1}),
        };

        let body = WebhookResponse::from(result);
        assert_eq!(body.status, ResponseStatus::Success);
        assert_eq!(body.events_received, Some(1));
        assert_eq!(body.fbtrace_id.as_deref(), Some("AbCdEf"));
        assert_eq!(body.error, None);
    }

    #[test]
    fn failure_result_maps_to_error_body_without_optional_fields() {
        let result = SendResult::Failure {
            error: "CAPI returned 400 Bad Request".to_string(),
            error_detail: Some(json!({"error": {"message": "bad"}})),
        };

        let body = WebhookResponse::from(result);
        assert_eq!(body.status, ResponseStatus::Error);
        assert!(body.error.unwrap().contains("400"));

        let result = SendResult::Failure {
            error: "boom".to_string(),
            error_detail: None,
        };
        let serialized = serde_json::to_string(&WebhookResponse::from(result)).unwrap();
        assert!(!serialized.contains("events_received"));
        assert!(!serialized.contains("fbtrace_id"));
    }

    #[test]
    fn empty_phone_rejects_with_400() {
        let response = WebhookError::EmptyPhone.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
