use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{phone, timestamp};

/// Sentinel values Meta expects for chat-originated conversions.
pub const EVENT_SOURCE_URL: &str = "whatsapp://conversation";
pub const ACTION_SOURCE: &str = "chat";

/// Meta's standard event for Click-to-WhatsApp ads.
pub const CONVERSATION_STARTED_EVENT: &str = "messaging_conversation_started_7d";
/// Event name used by manual test sends and the connection probe.
pub const TEST_EVENT: &str = "whatsapp_conversation_started";

/// One conversion to report upstream: the raw inbound fields plus the
/// attribution parameters, before any normalization or hashing.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ConversionEvent {
    pub phone: String,
    pub event_name: String,
    pub timestamp: Option<String>,
    pub flow_name: Option<String>,
    pub additional_data: Option<Map<String, Value>>,
    pub fbclid: Option<String>,
    pub fbc: Option<String>,
    pub fbp: Option<String>,
}

impl ConversionEvent {
    /// custom_data before the fbclid merge: flow_name plus any extra
    /// subscriber attributes.
    fn custom_data(&self) -> Map<String, Value> {
        let mut data = Map::new();
        if let Some(flow_name) = &self.flow_name {
            data.insert("flow_name".to_string(), Value::String(flow_name.clone()));
        }
        if let Some(additional) = &self.additional_data {
            data.extend(additional.clone());
        }
        data
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UserData {
    pub ph: Vec<String>,
    pub external_id: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fbc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fbp: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CapiEvent {
    pub event_name: String,
    pub event_time: i64,
    pub event_source_url: String,
    pub action_source: String,
    pub user_data: UserData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<Map<String, Value>>,
}

/// Wire envelope for the CAPI events endpoint.
#[derive(Debug, Serialize, Clone)]
pub struct CapiRequest {
    pub data: Vec<CapiEvent>,
    pub access_token: String,
}

/// Build the outbound CAPI event for one conversion. Total: degenerate input
/// produces a degenerate (empty-string) hash, never an error.
///
/// `now` backs the timestamp fallback and is injected by the caller so the
/// clock can be substituted in tests.
pub fn build_event(conversion: &ConversionEvent, now: DateTime<Utc>) -> CapiEvent {
    let hashed_phone = phone::hash(&phone::normalize(&conversion.phone));
    let event_time = timestamp::resolve(conversion.timestamp.as_deref(), now);

    let user_data = UserData {
        // Meta requires both; the hashed phone doubles as the external id
        ph: vec![hashed_phone.clone()],
        external_id: vec![hashed_phone],
        fbc: conversion.fbc.clone(),
        fbp: conversion.fbp.clone(),
    };

    // fbclid lands in custom_data while fbc/fbp live in user_data. The
    // asymmetry is the downstream schema's, not ours.
    let mut custom_data = conversion.custom_data();
    if let Some(fbclid) = &conversion.fbclid {
        custom_data.insert("fbclid".to_string(), Value::String(fbclid.clone()));
    }

    CapiEvent {
        event_name: conversion.event_name.clone(),
        event_time,
        event_source_url: EVENT_SOURCE_URL.to_string(),
        action_source: ACTION_SOURCE.to_string(),
        user_data,
        custom_data: if custom_data.is_empty() {
            None
        } else {
            Some(custom_data)
        },
    }
}
