use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;

use crate::errors::{FormsError, Result};
use crate::utils::persistence::{canonical_name, ensure_dir, write_atomic};

use super::{Draft, DraftKey};

const DRAFT_EXTENSION: &str = "json";

/// Synchronous key-value storage for drafts on the local device.
pub trait LocalDraftStore: Send + Sync {
    fn write(&self, draft: &Draft) -> Result<()>;
    fn read(&self, key: &DraftKey) -> Result<Option<Draft>>;
    /// Returns whether a draft existed.
    fn remove(&self, key: &DraftKey) -> Result<bool>;
    fn list(&self) -> Result<Vec<Draft>>;
}

/// One pretty-printed JSON file per draft key.
#[derive(Debug, Clone)]
pub struct JsonDraftStore {
    dir: PathBuf,
}

impl JsonDraftStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        ensure_dir(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn draft_path(&self, key: &DraftKey) -> PathBuf {
        self.dir
            .join(format!("{}.{}", canonical_name(&key.owner_key()), DRAFT_EXTENSION))
    }

    /// Parses a draft file. Unreadable or corrupt drafts are logged and
    /// treated as absent.
    fn read_path(path: &Path) -> Result<Option<Draft>> {
        let data = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        match serde_json::from_str::<Draft>(&data) {
            Ok(draft) => Ok(Some(draft)),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring corrupt draft file");
                Ok(None)
            }
        }
    }
}

impl LocalDraftStore for JsonDraftStore {
    fn write(&self, draft: &Draft) -> Result<()> {
        let data = serde_json::to_string_pretty(draft)?;
        write_atomic(&self.draft_path(&draft.key), &data)
    }

    fn read(&self, key: &DraftKey) -> Result<Option<Draft>> {
        let draft = Self::read_path(&self.draft_path(key))?;
        // Distinct keys may sanitize to the same file name.
        Ok(draft.filter(|draft| draft.key == *key))
    }

    fn remove(&self, key: &DraftKey) -> Result<bool> {
        if self.read(key)?.is_none() {
            return Ok(false);
        }
        fs::remove_file(self.draft_path(key))?;
        Ok(true)
    }

    fn list(&self) -> Result<Vec<Draft>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut drafts = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(DRAFT_EXTENSION) {
                continue;
            }
            if let Some(draft) = Self::read_path(&path)? {
                drafts.push(draft);
            }
        }
        drafts.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(drafts)
    }
}

/// In-process store for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    drafts: Mutex<BTreeMap<DraftKey, Draft>>,
}

impl MemoryDraftStore {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<DraftKey, Draft>>> {
        self.drafts
            .lock()
            .map_err(|_| FormsError::Storage("draft store lock poisoned".into()))
    }
}

impl LocalDraftStore for MemoryDraftStore {
    fn write(&self, draft: &Draft) -> Result<()> {
        self.lock()?.insert(draft.key.clone(), draft.clone());
        Ok(())
    }

    fn read(&self, key: &DraftKey) -> Result<Option<Draft>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn remove(&self, key: &DraftKey) -> Result<bool> {
        Ok(self.lock()?.remove(key).is_some())
    }

    fn list(&self) -> Result<Vec<Draft>> {
        let mut drafts: Vec<Draft> = self.lock()?.values().cloned().collect();
        drafts.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(drafts)
    }
}
