#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dashboard_forms::api::{
    ApiEnvelope, ApiRequest, ErrorKind, StaticCredential, SubmissionError, SubmissionGateway,
    Transport, TransportError,
};
use dashboard_forms::drafts::{Draft, DraftKey, RemoteDrafts};
use dashboard_forms::Record;
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Fresh directory that outlives the calling test.
pub fn temp_base() -> std::path::PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Transport double: replays queued responses in order and records every
/// request. An empty queue answers `200` with no data.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<ApiEnvelope, TransportError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, response: Result<ApiEnvelope, TransportError>) -> &Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiEnvelope, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ApiEnvelope::new(200)))
    }
}

pub fn gateway_with_token(transport: &Arc<MockTransport>) -> SubmissionGateway {
    SubmissionGateway::new(transport.clone(), Arc::new(StaticCredential::new("token-123")))
}

pub fn gateway_without_token(transport: &Arc<MockTransport>) -> SubmissionGateway {
    SubmissionGateway::new(transport.clone(), Arc::new(StaticCredential::none()))
}

/// In-memory remote draft service that can be switched into failure mode.
#[derive(Default)]
pub struct MockRemoteDrafts {
    drafts: Mutex<BTreeMap<String, Record>>,
    failing: bool,
    pub saves: AtomicUsize,
    pub clears: AtomicUsize,
}

impl MockRemoteDrafts {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            failing: true,
            ..Self::default()
        })
    }

    pub fn seed(&self, key: &DraftKey, record: Record) {
        self.drafts.lock().unwrap().insert(key.owner_key(), record);
    }

    pub fn stored(&self, key: &DraftKey) -> Option<Record> {
        self.drafts.lock().unwrap().get(&key.owner_key()).cloned()
    }

    fn check(&self) -> Result<(), SubmissionError> {
        if self.failing {
            Err(SubmissionError::new(ErrorKind::Network, "remote drafts unavailable"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RemoteDrafts for MockRemoteDrafts {
    async fn save(&self, draft: &Draft) -> Result<(), SubmissionError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.drafts
            .lock()
            .unwrap()
            .insert(draft.owner_key.clone(), draft.payload.clone());
        Ok(())
    }

    async fn load(&self, key: &DraftKey) -> Result<Option<Record>, SubmissionError> {
        self.check()?;
        Ok(self.stored(key))
    }

    async fn clear(&self, key: &DraftKey) -> Result<(), SubmissionError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.drafts.lock().unwrap().remove(&key.owner_key());
        Ok(())
    }
}

/// Profile record that passes validation.
pub fn valid_profile() -> Record {
    Record::new()
        .with("fullName", "Ada Admin")
        .with("phoneNumber", "+44 20 7946 0958")
        .with("departments", vec!["Ops"])
}
