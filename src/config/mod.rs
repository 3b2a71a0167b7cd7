//! Persisted settings for the form tooling, stored as JSON under the
//! application home directory.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::drafts::DraftKey;
use crate::errors::{FormsError, Result};
use crate::forms::kinds::FormKind;
use crate::utils::persistence::{ensure_dir, write_atomic};
use crate::utils::PathResolver;

const BACKUP_PREFIX: &str = "config_";
const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Owner part of every draft key.
    pub owner: String,
    /// Edit sessions keep one draft per record instead of one per form kind.
    pub scope_drafts_by_record: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drafts_dir: Option<PathBuf>,
    pub default_page_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            owner: "local".into(),
            scope_drafts_by_record: true,
            drafts_dir: None,
            default_page_size: 10,
        }
    }
}

impl Config {
    /// Draft key for a session over `kind`, scoped to `record_id` when the
    /// configuration asks for per-record drafts.
    pub fn draft_key(&self, kind: FormKind, record_id: Option<&str>) -> DraftKey {
        match record_id {
            Some(id) if self.scope_drafts_by_record => DraftKey::for_record(&self.owner, kind, id),
            _ => DraftKey::new(&self.owner, kind),
        }
    }

    /// Draft directory: the override when set, else `<base>/drafts`.
    pub fn drafts_dir_in(&self, base: &Path) -> PathBuf {
        self.drafts_dir
            .clone()
            .unwrap_or_else(|| PathResolver::drafts_dir_in(base))
    }
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
    backups_dir: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(PathResolver::base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        ensure_dir(&PathResolver::config_dir_in(&base))?;
        let backups_dir = PathResolver::config_backup_dir_in(&base);
        ensure_dir(&backups_dir)?;
        Ok(Self {
            path: PathResolver::config_file_in(&base),
            backups_dir,
            base,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file means defaults; missing keys take their default values.
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no configuration file, using defaults");
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.path)?;
        serde_json::from_str(&data).map_err(|err| {
            FormsError::Config(format!("{}: {}", self.path.display(), err))
        })
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)?;
        info!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    /// Writes a timestamped copy and returns its file name.
    pub fn backup(&self, config: &Config, note: Option<&str>) -> Result<String> {
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT);
        let mut name = format!("{}{}", BACKUP_PREFIX, timestamp);
        if let Some(label) = sanitize_note(note) {
            name.push('_');
            name.push_str(&label);
        }
        name.push('.');
        name.push_str(BACKUP_EXTENSION);
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.backups_dir.join(&name), &json)?;
        info!(backup = %name, "configuration backup written");
        Ok(name)
    }

    pub fn restore(&self, backup_name: &str) -> Result<Config> {
        let path = self.backups_dir.join(backup_name);
        if !path.exists() {
            return Err(FormsError::Storage(format!(
                "configuration backup `{}` not found",
                backup_name
            )));
        }
        let config: Config = serde_json::from_str(&fs::read_to_string(&path)?)?;
        self.save(&config)?;
        Ok(config)
    }

    /// Backup file names, newest first.
    pub fn list_backups(&self) -> Result<Vec<String>> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(name.to_string());
            }
        }
        entries.sort_by(|a, b| parse_timestamp(b).cmp(&parse_timestamp(a)).then(b.cmp(a)));
        Ok(entries)
    }
}

fn sanitize_note(note: Option<&str>) -> Option<String> {
    let mut sanitized = String::new();
    for ch in note?.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
        } else if !sanitized.is_empty() && !sanitized.ends_with('-') {
            sanitized.push('-');
        }
    }
    let trimmed = sanitized.trim_matches('-');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_timestamp(name: &str) -> Option<NaiveDateTime> {
    let stamp = name.strip_prefix(BACKUP_PREFIX)?.get(..15)?;
    NaiveDateTime::parse_from_str(stamp, BACKUP_TIMESTAMP_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        assert_eq!(manager.load().unwrap(), Config::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let temp = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let config = Config {
            owner: "user-7".into(),
            default_page_size: 25,
            ..Config::default()
        };
        manager.save(&config).unwrap();
        assert_eq!(manager.load().unwrap(), config);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(manager.path(), r#"{ "owner": "ops" }"#).unwrap();
        let config = manager.load().unwrap();
        assert_eq!(config.owner, "ops");
        assert_eq!(config.default_page_size, 10);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let temp = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        fs::write(manager.path(), "owner = ops").unwrap();
        assert!(matches!(manager.load(), Err(FormsError::Config(_))));
    }

    #[test]
    fn backup_and_restore() {
        let temp = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(temp.path().to_path_buf()).unwrap();
        let config = Config {
            default_page_size: 25,
            ..Config::default()
        };
        let name = manager.backup(&config, Some("Before Upgrade!")).unwrap();
        assert!(name.starts_with("config_"));
        assert!(name.ends_with("_before-upgrade.json"));
        assert_eq!(manager.list_backups().unwrap(), vec![name.clone()]);

        let restored = manager.restore(&name).unwrap();
        assert_eq!(restored.default_page_size, 25);
        assert_eq!(manager.load().unwrap(), restored);
        assert!(manager.restore("config_missing.json").is_err());
    }

    #[test]
    fn draft_scope_follows_configuration() {
        let scoped = Config::default();
        assert_eq!(
            scoped.draft_key(FormKind::JobPosting, Some("42")).owner_key(),
            "local:jobDraft:42"
        );
        let shared = Config {
            scope_drafts_by_record: false,
            ..Config::default()
        };
        assert_eq!(
            shared.draft_key(FormKind::JobPosting, Some("42")).owner_key(),
            "local:jobDraft"
        );
        assert_eq!(
            scoped.draft_key(FormKind::Product, None).owner_key(),
            "local:productDraft"
        );
    }
}
