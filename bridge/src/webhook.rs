use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{error, info, instrument};

use crate::api::{HealthInfo, ResponseStatus, ServiceInfo, WebhookError, WebhookResponse};
use crate::capi::SendResult;
use crate::payload::{ConversionEvent, CONVERSATION_STARTED_EVENT, TEST_EVENT};
use crate::phone;
use crate::router;

/// Inbound webhook body. Only `phone` is required; the JSON extractor
/// rejects requests missing it before the handler runs.
#[derive(Debug, Default, Deserialize)]
pub struct WebhookPayload {
    pub phone: String,
    pub timestamp: Option<String>,
    pub flow_name: Option<String>,
    pub user_id: Option<String>,
    pub full_name: Option<String>,

    // Campaign attribution parameters
    pub fbclid: Option<String>,
    pub fbc: Option<String>,
    pub fbp: Option<String>,
}

impl WebhookPayload {
    /// Extra subscriber attributes for custom_data. Gated on user_id, the
    /// way the chat platform's subscriber payloads arrive.
    fn additional_data(&self) -> Option<Map<String, Value>> {
        let user_id = self.user_id.as_ref()?;

        let mut data = Map::new();
        data.insert("user_id".to_string(), Value::String(user_id.clone()));
        if let Some(full_name) = &self.full_name {
            data.insert("full_name".to_string(), Value::String(full_name.clone()));
        }
        Some(data)
    }
}

/// Main webhook endpoint. Whatever the downstream outcome, the platform gets
/// a 200 acknowledgment with the outcome carried in the body: a durably
/// received webhook must not be retried against a flaky CAPI.
#[instrument(skip_all)]
pub async fn webhook(
    state: State<router::State>,
    payload: Json<WebhookPayload>,
) -> Result<Json<WebhookResponse>, WebhookError> {
    let payload = payload.0;

    if payload.phone.trim().is_empty() {
        return Err(WebhookError::EmptyPhone);
    }

    info!(
        "webhook received: phone={} flow={}",
        phone::mask(&payload.phone),
        payload.flow_name.as_deref().unwrap_or("N/A")
    );

    let conversion = ConversionEvent {
        phone: payload.phone.clone(),
        event_name: CONVERSATION_STARTED_EVENT.to_string(),
        timestamp: payload.timestamp.clone(),
        flow_name: payload.flow_name.clone(),
        additional_data: payload.additional_data(),
        fbclid: payload.fbclid.clone(),
        fbc: payload.fbc.clone(),
        fbp: payload.fbp.clone(),
    };

    let now = state.timesource.current_time();
    let result = state.capi.send_event(conversion, now).await;

    if !result.is_success() {
        error!("failed to forward event to CAPI");
    }

    Ok(Json(result.into()))
}

/// Manual trigger for sending events without the chat platform.
#[instrument(skip_all)]
pub async fn test_event(
    state: State<router::State>,
    payload: Json<WebhookPayload>,
) -> Result<Json<SendResult>, WebhookError> {
    let payload = payload.0;

    if payload.phone.trim().is_empty() {
        return Err(WebhookError::EmptyPhone);
    }

    info!("test event triggered");

    let conversion = ConversionEvent {
        phone: payload.phone,
        event_name: TEST_EVENT.to_string(),
        timestamp: payload.timestamp,
        flow_name: Some(
            payload
                .flow_name
                .unwrap_or_else(|| "Test Flow".to_string()),
        ),
        ..Default::default()
    };

    let now = state.timesource.current_time();
    Ok(Json(state.capi.send_event(conversion, now).await))
}

pub async fn test_connection(state: State<router::State>) -> Json<WebhookResponse> {
    let now = state.timesource.current_time();
    let ok = state.capi.test_connection(now).await;

    Json(WebhookResponse {
        status: if ok {
            ResponseStatus::Success
        } else {
            ResponseStatus::Error
        },
        message: if ok {
            "Meta CAPI connection successful".to_string()
        } else {
            "Meta CAPI connection failed".to_string()
        },
        events_received: None,
        fbtrace_id: None,
        error: None,
    })
}

pub async fn index() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        status: "running".to_string(),
        service: "manychat-capi-bridge".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn health(state: State<router::State>) -> Json<HealthInfo> {
    Json(HealthInfo {
        status: "healthy".to_string(),
        meta_pixel_id: state.config.meta_pixel_id.clone(),
        api_version: state.config.meta_api_version.clone(),
    })
}
