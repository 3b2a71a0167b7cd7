use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::record::Record;

/// Response envelope returned by every backend endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope {
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
}

impl ApiEnvelope {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            message: None,
            data: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_data(mut self, data: JsonValue) -> Self {
        self.data = Some(data);
        self
    }

    /// 200–299 is success for reads and writes alike.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Non-blank message from the envelope.
    pub fn message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty())
    }

    /// Unwraps the payload: `data.data` when present, else `data`.
    pub fn payload(&self) -> Option<&JsonValue> {
        let data = self.data.as_ref().filter(|data| !data.is_null())?;
        match data.get("data") {
            Some(inner) if !inner.is_null() => Some(inner),
            _ => Some(data),
        }
    }

    /// Payload as a record, when it is a JSON object.
    pub fn payload_record(&self) -> Option<Record> {
        self.payload().cloned().and_then(Record::from_json)
    }

    /// Identifier of the created or updated entity (`id`, then `_id`).
    pub fn record_id(&self) -> Option<String> {
        let payload = self.payload()?;
        ["id", "_id"]
            .iter()
            .filter_map(|key| payload.get(*key))
            .find_map(|value| match value {
                JsonValue::String(id) if !id.trim().is_empty() => Some(id.clone()),
                JsonValue::Number(id) => Some(id.to_string()),
                _ => None,
            })
    }
}
