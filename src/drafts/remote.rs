use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::api::credentials::CredentialSource;
use crate::api::envelope::ApiEnvelope;
use crate::api::gateway::{ErrorKind, SubmissionError};
use crate::api::transport::{ApiRequest, HttpMethod, Transport};
use crate::record::Record;

use super::{Draft, DraftKey};

const DRAFTS: &str = "/api/drafts";

/// Best-effort remote mirror of local drafts.
#[async_trait]
pub trait RemoteDrafts: Send + Sync {
    async fn save(&self, draft: &Draft) -> Result<(), SubmissionError>;
    async fn load(&self, key: &DraftKey) -> Result<Option<Record>, SubmissionError>;
    async fn clear(&self, key: &DraftKey) -> Result<(), SubmissionError>;
}

/// Drafts resource of the REST backend, tagged by form `type` and `ownerKey`.
#[derive(Clone)]
pub struct ApiRemoteDrafts {
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialSource>,
}

impl ApiRemoteDrafts {
    pub fn new(transport: Arc<dyn Transport>, credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    fn request(&self, method: HttpMethod) -> ApiRequest {
        let request = ApiRequest::new(method, DRAFTS);
        match self.credentials.bearer() {
            Some(token) => request.with_bearer(token),
            None => request,
        }
    }

    fn query(key: &DraftKey) -> Vec<(String, String)> {
        vec![
            ("type".to_string(), key.kind.remote_type().to_string()),
            ("ownerKey".to_string(), key.owner_key()),
        ]
    }

    async fn dispatch(&self, request: ApiRequest) -> Result<ApiEnvelope, SubmissionError> {
        self.transport
            .send(request)
            .await
            .map_err(|err| SubmissionError::new(ErrorKind::Network, err.to_string()))
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiEnvelope, SubmissionError> {
        checked(self.dispatch(request).await?)
    }
}

fn checked(envelope: ApiEnvelope) -> Result<ApiEnvelope, SubmissionError> {
    if envelope.is_success() {
        Ok(envelope)
    } else {
        let message = envelope.message().unwrap_or("Draft request failed").to_string();
        Err(SubmissionError::new(ErrorKind::Api, message))
    }
}

#[async_trait]
impl RemoteDrafts for ApiRemoteDrafts {
    async fn save(&self, draft: &Draft) -> Result<(), SubmissionError> {
        let body = json!({
            "draftData": draft.payload.to_json(),
            "type": draft.key.kind.remote_type(),
            "ownerKey": draft.owner_key,
        });
        self.send(self.request(HttpMethod::Post).with_body(body)).await?;
        Ok(())
    }

    /// A stored draft comes back either as `{ draftData: {...} }` or as the
    /// bare record.
    async fn load(&self, key: &DraftKey) -> Result<Option<Record>, SubmissionError> {
        let request = self.request(HttpMethod::Get).with_query(Self::query(key));
        let envelope = self.dispatch(request).await?;
        if envelope.status == 404 {
            return Ok(None);
        }
        let envelope = checked(envelope)?;
        let Some(record) = envelope.payload_record() else {
            return Ok(None);
        };
        let record = match record.nested("draftData") {
            Some(inner) => inner.clone(),
            None => record,
        };
        Ok((!record.is_empty()).then_some(record))
    }

    async fn clear(&self, key: &DraftKey) -> Result<(), SubmissionError> {
        let request = self.request(HttpMethod::Delete).with_query(Self::query(key));
        self.send(request).await?;
        Ok(())
    }
}
