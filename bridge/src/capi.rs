use chrono::{DateTime, Utc};
use http::StatusCode;
use reqwest::header;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::payload::{self, CapiRequest, ConversionEvent};
use crate::phone;
use crate::prometheus::{report_capi_failure, report_event_forwarded};

/// Outcome of one delivery attempt. Every failure path below the webhook
/// boundary is converted into a `Failure` value so the interface layer can
/// always render a deterministic acknowledgment.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SendResult {
    Success {
        events_received: u64,
        fbtrace_id: String,
        response: Value,
    },
    Failure {
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        error_detail: Option<Value>,
    },
}

impl SendResult {
    pub fn is_success(&self) -> bool {
        matches!(self, SendResult::Success { .. })
    }

    fn failure(error: impl AsRef<str>) -> Self {
        SendResult::Failure {
            error: error.as_ref().to_string(),
            error_detail: None,
        }
    }

    /// Failure for a non-2xx response, keeping the body (parsed when it is
    /// JSON, raw otherwise) for debugging attribution rejections.
    fn failure_status(status: StatusCode, body: String) -> Self {
        let error_detail = serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body));
        SendResult::Failure {
            error: format!("CAPI returned {status}"),
            error_detail: Some(error_detail),
        }
    }
}

/// Meta Conversion API client. Holds the immutable endpoint and credentials
/// resolved at startup plus a reqwest client bounding the single outbound
/// attempt; safe to share across requests.
pub struct CapiClient {
    events_url: String,
    access_token: String,
    client: reqwest::Client,
}

impl CapiClient {
    pub fn new(config: &Config) -> CapiClient {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent("manychat-capi-bridge")
            .timeout(config.request_timeout.0)
            .build()
            .expect("failed to construct reqwest client for the CAPI sender");

        CapiClient {
            events_url: config.capi_events_url(),
            access_token: config.meta_access_token.clone(),
            client,
        }
    }

    /// Send one conversion event. Exactly one POST, no retries; a timeout is
    /// an ordinary failure outcome.
    pub async fn send_event(&self, conversion: ConversionEvent, now: DateTime<Utc>) -> SendResult {
        let event = payload::build_event(&conversion, now);
        info!(
            "event payload built for phone {}",
            phone::mask(&conversion.phone)
        );

        let request = CapiRequest {
            data: vec![event],
            access_token: self.access_token.clone(),
        };

        let response = match self.client.post(&self.events_url).json(&request).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("failed to send event to CAPI: {}", e);
                report_capi_failure(if e.is_timeout() { "timeout" } else { "connection" });
                return SendResult::failure(e.to_string());
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                error!("failed to read CAPI response body: {}", e);
                report_capi_failure("body");
                return SendResult::failure(e.to_string());
            }
        };

        if !status.is_success() {
            error!("CAPI rejected event: {} {}", status, body);
            report_capi_failure("status");
            return SendResult::failure_status(status, body);
        }

        match serde_json::from_str::<Value>(&body) {
            Ok(response_data) => {
                let events_received = response_data
                    .get("events_received")
                    .and_then(Value::as_u64)
                    .unwrap_or(0);
                let fbtrace_id = response_data
                    .get("fbtrace_id")
                    .and_then(Value::as_str)
                    .unwrap_or("N/A")
                    .to_string();

                info!(
                    "event sent, events_received={} fbtrace_id={}",
                    events_received, fbtrace_id
                );
                report_event_forwarded();

                SendResult::Success {
                    events_received,
                    fbtrace_id,
                    response: response_data,
                }
            }
            Err(e) => {
                warn!("CAPI returned 2xx with an unparsable body: {}", e);
                report_capi_failure("body");
                SendResult::failure(format!("unexpected CAPI response body: {e}"))
            }
        }
    }

    /// Live connection probe: one real send with a synthetic conversion.
    pub async fn test_connection(&self, now: DateTime<Utc>) -> bool {
        info!("testing CAPI connection");

        let result = self
            .send_event(
                ConversionEvent {
                    phone: "+1234567890".to_string(),
                    event_name: payload::TEST_EVENT.to_string(),
                    flow_name: Some("Test Flow".to_string()),
                    ..Default::default()
                },
                now,
            )
            .await;

        if let SendResult::Failure { error, .. } = &result {
            error!("CAPI connection test failed: {}", error);
        }

        result.is_success()
    }
}
