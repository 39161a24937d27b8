use std::borrow::Cow;

use chrono::{DateTime, SecondsFormat, Utc};
use reelchat_logging::reel_debug;
use serde::Serialize;
use serde_json::Value;

/// JSON body posted to every webhook endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    pub chat_input: String,
    pub message: String,
    pub timestamp: String,
    pub session_id: String,
}

impl WebhookRequest {
    pub fn new(text: &str, now: DateTime<Utc>) -> Self {
        Self {
            chat_input: text.to_string(),
            message: text.to_string(),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            session_id: format!("session_{}", now.timestamp_millis()),
        }
    }
}

/// Decoded webhook response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    /// Body that could not be parsed as JSON.
    Text(String),
}

impl Payload {
    /// Serialized form shown to the user when no video URL was found.
    /// Text bodies are wrapped as `{"response": text}`.
    pub fn to_json_string(&self) -> String {
        match self {
            Payload::Json(value) => value.to_string(),
            Payload::Text(text) => serde_json::json!({ "response": text }).to_string(),
        }
    }

    /// Flat text used by the pattern-based extractors.
    pub(crate) fn search_text(&self) -> Cow<'_, str> {
        match self {
            Payload::Json(Value::String(text)) | Payload::Text(text) => Cow::Borrowed(text),
            Payload::Json(value) => Cow::Owned(value.to_string()),
        }
    }

    pub(crate) fn as_object(&self) -> Option<&serde_json::Map<String, Value>> {
        match self {
            Payload::Json(Value::Object(map)) => Some(map),
            _ => None,
        }
    }
}

/// JSON when the content type says so or the body parses anyway, text otherwise.
pub fn decode_payload(body: &str, content_type: Option<&str>) -> Payload {
    let declared_json = content_type
        .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false);
    match serde_json::from_str::<Value>(body) {
        Ok(value) => Payload::Json(value),
        Err(err) => {
            if declared_json {
                reel_debug!("Body declared as JSON failed to parse ({}); keeping text", err);
            }
            Payload::Text(body.to_string())
        }
    }
}
