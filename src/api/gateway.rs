//! Submission Gateway: turns a validated record into the backend's wire
//! shape, performs the writes and interprets the envelopes.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use crate::forms::flow::{FormFlow, PlannedWrite, SubmitTarget};
use crate::record::Record;

use super::credentials::CredentialSource;
use super::envelope::ApiEnvelope;
use super::query::ListQuery;
use super::transport::{ApiRequest, HttpMethod, Transport};

pub const AUTH_REQUIRED: &str = "Authentication required. Please log in.";

/// Error taxonomy shared by submissions, fetches and role resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Unauthenticated,
    Validation,
    Network,
    Api,
    UnsupportedRole,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unauthenticated => "unauthenticated",
            ErrorKind::Validation => "validation",
            ErrorKind::Network => "network",
            ErrorKind::Api => "api",
            ErrorKind::UnsupportedRole => "unsupported-role",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionError {
    pub kind: ErrorKind,
    pub message: String,
}

impl SubmissionError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind, self.message)
    }
}

impl std::error::Error for SubmissionError {}

/// Outcome of one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<SubmissionError>,
}

impl SubmissionResult {
    pub fn accepted(record_id: Option<String>) -> Self {
        Self {
            ok: true,
            record_id,
            error: None,
        }
    }

    pub fn failed(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            record_id: None,
            error: Some(SubmissionError::new(kind, message)),
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|error| error.kind)
    }
}

impl From<SubmissionError> for SubmissionResult {
    fn from(error: SubmissionError) -> Self {
        Self {
            ok: false,
            record_id: None,
            error: Some(error),
        }
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListPage {
    pub items: Vec<Record>,
    pub total: Option<u64>,
    pub page: u32,
    pub limit: u32,
}

#[derive(Clone)]
pub struct SubmissionGateway {
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialSource>,
}

impl fmt::Debug for SubmissionGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubmissionGateway").finish_non_exhaustive()
    }
}

impl SubmissionGateway {
    pub fn new(transport: Arc<dyn Transport>, credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    /// Maps `record` through the flow's wire mapping and performs the planned
    /// writes in order, stopping at the first failure. The credential is
    /// checked before anything else; without one no request is sent.
    pub async fn submit(
        &self,
        flow: &dyn FormFlow,
        record: &Record,
        target: &SubmitTarget,
    ) -> SubmissionResult {
        let label = flow.descriptor().label;
        let Some(token) = self.credentials.bearer() else {
            warn!(form = label, "submission refused: no credential");
            return SubmissionResult::failed(ErrorKind::Unauthenticated, AUTH_REQUIRED);
        };

        let writes = match flow.commit(record, target) {
            Ok(writes) => writes,
            Err(err) => {
                warn!(form = label, error = %err, "record could not be mapped to wire shape");
                return SubmissionResult::failed(ErrorKind::Validation, err.to_string());
            }
        };

        info!(form = label, writes = writes.len(), "submitting");
        let fallback = format!("Failed to submit {}", label);
        let mut record_id = None;
        for write in writes {
            let envelope = match self.perform(write, &token).await {
                Ok(envelope) => envelope,
                Err(error) => {
                    warn!(form = label, kind = %error.kind, message = %error.message, "submission failed");
                    return error.into();
                }
            };
            if !envelope.is_success() {
                let message = envelope.message().unwrap_or(&fallback).to_string();
                warn!(form = label, status = envelope.status, message = %message, "submission rejected");
                return SubmissionResult::failed(ErrorKind::Api, message);
            }
            if record_id.is_none() {
                record_id = envelope.record_id();
            }
        }

        let record_id = record_id.or_else(|| target.record_id().map(str::to_string));
        info!(form = label, record_id = ?record_id, "submission accepted");
        SubmissionResult::accepted(record_id)
    }

    /// Reads one entity and returns its unwrapped payload.
    pub async fn fetch(&self, path: &str) -> Result<Record, SubmissionError> {
        let envelope = self.read(ApiRequest::new(HttpMethod::Get, path)).await?;
        envelope.payload_record().ok_or_else(|| {
            SubmissionError::new(ErrorKind::Api, format!("Unexpected response from {}", path))
        })
    }

    /// Reads one page of a list endpoint.
    pub async fn list(&self, path: &str, query: &ListQuery) -> Result<ListPage, SubmissionError> {
        let request = ApiRequest::new(HttpMethod::Get, path).with_query(query.pairs());
        let envelope = self.read(request).await?;
        let payload = envelope.payload().cloned().unwrap_or(JsonValue::Null);
        Ok(ListPage {
            items: list_items(&payload),
            total: list_total(&payload),
            page: query.page(),
            limit: query.limit(),
        })
    }

    async fn read(&self, request: ApiRequest) -> Result<ApiEnvelope, SubmissionError> {
        let token = self
            .credentials
            .bearer()
            .ok_or_else(|| SubmissionError::new(ErrorKind::Unauthenticated, AUTH_REQUIRED))?;
        let path = request.path.clone();
        let envelope = self
            .transport
            .send(request.with_bearer(token))
            .await
            .map_err(|err| SubmissionError::new(ErrorKind::Network, err.to_string()))?;
        if envelope.is_success() {
            Ok(envelope)
        } else {
            let message = envelope
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| format!("Failed to load {}", path));
            Err(SubmissionError::new(ErrorKind::Api, message))
        }
    }

    async fn perform(&self, write: PlannedWrite, token: &str) -> Result<ApiEnvelope, SubmissionError> {
        debug!(method = write.method.as_str(), path = %write.path, "sending write");
        let request = ApiRequest::new(write.method, write.path)
            .with_bearer(token)
            .with_body(write.body);
        self.transport
            .send(request)
            .await
            .map_err(|err| SubmissionError::new(ErrorKind::Network, err.to_string()))
    }
}

/// Items of a list payload: the payload itself when it is an array, else the
/// first array-valued field of the object.
fn list_items(payload: &JsonValue) -> Vec<Record> {
    let items = match payload {
        JsonValue::Array(items) => Some(items),
        JsonValue::Object(map) => map.values().find_map(JsonValue::as_array),
        _ => None,
    };
    items
        .map(|items| items.iter().cloned().filter_map(Record::from_json).collect())
        .unwrap_or_default()
}

fn list_total(payload: &JsonValue) -> Option<u64> {
    payload
        .get("total")
        .or_else(|| payload.get("pagination").and_then(|page| page.get("total")))
        .and_then(JsonValue::as_u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn result_serializes_with_camel_case_and_kebab_kinds() {
        let failed = SubmissionResult::failed(ErrorKind::UnsupportedRole, "nope");
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({ "ok": false, "error": { "kind": "unsupported-role", "message": "nope" } })
        );
        let ok = SubmissionResult::accepted(Some("42".into()));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({ "ok": true, "recordId": "42" })
        );
    }

    #[test]
    fn list_items_accepts_bare_and_keyed_arrays() {
        let bare = json!([{ "id": 1 }, { "id": 2 }, "skip"]);
        assert_eq!(list_items(&bare).len(), 2);

        let keyed = json!({ "jobs": [{ "id": 1 }], "pagination": { "total": 31 } });
        assert_eq!(list_items(&keyed).len(), 1);
        assert_eq!(list_total(&keyed), Some(31));
        assert_eq!(list_items(&json!("x")), Vec::<Record>::new());
    }
}
