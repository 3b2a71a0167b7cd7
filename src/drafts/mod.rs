//! Draft persistence: in-progress records survive reloads through a
//! synchronous local store, mirrored best-effort to the remote drafts API.

pub mod local;
pub mod remote;

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::forms::kinds::FormKind;
use crate::record::Record;

pub use local::{JsonDraftStore, LocalDraftStore, MemoryDraftStore};
pub use remote::{ApiRemoteDrafts, RemoteDrafts};

/// Identifies one draft: who owns it, which form it belongs to and, for
/// edit sessions scoped per record, which entity it edits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftKey {
    pub owner: String,
    pub kind: FormKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
}

impl DraftKey {
    pub fn new(owner: impl Into<String>, kind: FormKind) -> Self {
        Self {
            owner: owner.into(),
            kind,
            record_id: None,
        }
    }

    pub fn for_record(owner: impl Into<String>, kind: FormKind, record_id: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            kind,
            record_id: Some(record_id.into()),
        }
    }

    /// `owner:slot` or `owner:slot:record`, e.g. `local:jobDraft:42`.
    pub fn owner_key(&self) -> String {
        match &self.record_id {
            Some(id) => format!("{}:{}:{}", self.owner, self.kind.draft_slot(), id),
            None => format!("{}:{}", self.owner, self.kind.draft_slot()),
        }
    }
}

impl fmt::Display for DraftKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.owner_key())
    }
}

/// Snapshot of an unsubmitted record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub owner_key: String,
    pub key: DraftKey,
    pub payload: Record,
    pub saved_at: DateTime<Utc>,
}

impl Draft {
    pub fn new(key: DraftKey, payload: Record) -> Self {
        Self {
            owner_key: key.owner_key(),
            key,
            payload,
            saved_at: Utc::now(),
        }
    }
}

/// Write-through draft persistence. The local store is authoritative; the
/// remote side is mirrored fire-and-forget and its failures are only logged.
#[derive(Clone)]
pub struct DraftPersistence {
    local: Arc<dyn LocalDraftStore>,
    remote: Option<Arc<dyn RemoteDrafts>>,
}

impl fmt::Debug for DraftPersistence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DraftPersistence")
            .field("remote", &self.remote.is_some())
            .finish()
    }
}

impl DraftPersistence {
    pub fn new(local: Arc<dyn LocalDraftStore>) -> Self {
        Self { local, remote: None }
    }

    pub fn with_remote(mut self, remote: Arc<dyn RemoteDrafts>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Writes the draft locally before returning, then spawns the remote save
    /// when a tokio runtime is available. The returned handle lets callers
    /// await the mirror; dropping it does not cancel the task.
    pub fn save(&self, key: &DraftKey, record: &Record) -> Result<Option<JoinHandle<()>>> {
        let draft = Draft::new(key.clone(), record.clone());
        self.local.write(&draft)?;
        debug!(key = %key, fields = record.len(), "draft saved locally");
        Ok(self.spawn_remote(key, move |remote| async move {
            if let Err(err) = remote.save(&draft).await {
                warn!(key = %draft.key, error = %err, "remote draft save failed; local copy kept");
            }
        }))
    }

    /// Remote copy first, then the local one. Remote errors fall through to
    /// local storage silently apart from a log line.
    pub async fn load(&self, key: &DraftKey) -> Result<Option<Record>> {
        if let Some(remote) = &self.remote {
            match remote.load(key).await {
                Ok(Some(record)) if !record.is_empty() => {
                    info!(key = %key, "draft restored from remote");
                    return Ok(Some(record));
                }
                Ok(_) => debug!(key = %key, "no remote draft"),
                Err(err) => warn!(key = %key, error = %err, "remote draft load failed; using local copy"),
            }
        }
        let local = self.local.read(key)?.map(|draft| draft.payload);
        if local.is_some() {
            info!(key = %key, "draft restored from local storage");
        }
        Ok(local)
    }

    /// Local draft with its metadata, without touching the remote side.
    pub fn load_local(&self, key: &DraftKey) -> Result<Option<Draft>> {
        self.local.read(key)
    }

    /// Removes the local copy and spawns the remote clear.
    pub fn clear(&self, key: &DraftKey) -> Result<Option<JoinHandle<()>>> {
        let removed = self.local.remove(key)?;
        info!(key = %key, removed, "draft cleared");
        let owned = key.clone();
        Ok(self.spawn_remote(key, move |remote| async move {
            if let Err(err) = remote.clear(&owned).await {
                warn!(key = %owned, error = %err, "remote draft clear failed");
            }
        }))
    }

    /// Local drafts, most recent first.
    pub fn list(&self) -> Result<Vec<Draft>> {
        self.local.list()
    }

    fn spawn_remote<F, Fut>(&self, key: &DraftKey, task: F) -> Option<JoinHandle<()>>
    where
        F: FnOnce(Arc<dyn RemoteDrafts>) -> Fut,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let remote = Arc::clone(self.remote.as_ref()?);
        match Handle::try_current() {
            Ok(handle) => Some(handle.spawn(task(remote))),
            Err(_) => {
                debug!(key = %key, "no async runtime; remote draft sync skipped");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_key_includes_record_only_when_scoped() {
        let key = DraftKey::new("u1", FormKind::JobPosting);
        assert_eq!(key.owner_key(), "u1:jobDraft");
        let scoped = DraftKey::for_record("u1", FormKind::Product, "p9");
        assert_eq!(scoped.owner_key(), "u1:productDraft:p9");
    }

    #[test]
    fn save_without_runtime_is_local_only() {
        let local = Arc::new(MemoryDraftStore::default());
        let persistence = DraftPersistence::new(local.clone());
        let key = DraftKey::new("u1", FormKind::ProfileEdit);
        let handle = persistence
            .save(&key, &Record::new().with("fullName", "Ada"))
            .unwrap();
        assert!(handle.is_none());
        assert_eq!(
            local.read(&key).unwrap().unwrap().payload.text("fullName"),
            "Ada"
        );
    }

    #[tokio::test]
    async fn round_trip_through_local_store() {
        let persistence = DraftPersistence::new(Arc::new(MemoryDraftStore::default()));
        let key = DraftKey::new("u1", FormKind::JobPosting);
        let record = Record::new()
            .with("title", "Engineer")
            .with("salary", Record::new().with("min", 10));
        persistence.save(&key, &record).unwrap();
        assert_eq!(persistence.load(&key).await.unwrap(), Some(record));

        persistence.clear(&key).unwrap();
        assert_eq!(persistence.load(&key).await.unwrap(), None);
    }

    #[test]
    fn draft_serializes_camel_case() {
        let draft = Draft::new(DraftKey::new("u1", FormKind::Product), Record::new());
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["ownerKey"], "u1:productDraft");
        assert!(json.get("savedAt").is_some());
        assert_eq!(json["key"]["kind"], "product");
    }
}
