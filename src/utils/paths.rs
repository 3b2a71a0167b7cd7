use dirs::home_dir;
use std::{env, path::PathBuf};

const DEFAULT_DIR_NAME: &str = ".dashboard_forms";
const HOME_ENV: &str = "DASHBOARD_FORMS_HOME";
const DRAFTS_DIR: &str = "drafts";
const CONFIG_DIR: &str = "config";
const CONFIG_BACKUP_DIR: &str = "backups";
const CONFIG_FILE: &str = "config.json";

/// Resolves the on-disk layout used by drafts and configuration.
pub struct PathResolver;

impl PathResolver {
    /// Application data directory, `$DASHBOARD_FORMS_HOME` or `~/.dashboard_forms`.
    pub fn base_dir() -> PathBuf {
        if let Some(custom) = env::var_os(HOME_ENV) {
            return PathBuf::from(custom);
        }
        home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME)
    }

    pub fn resolve_base(custom: Option<PathBuf>) -> PathBuf {
        custom.unwrap_or_else(Self::base_dir)
    }

    pub fn drafts_dir_in(base: &std::path::Path) -> PathBuf {
        base.join(DRAFTS_DIR)
    }

    pub fn config_dir_in(base: &std::path::Path) -> PathBuf {
        base.join(CONFIG_DIR)
    }

    pub fn config_file_in(base: &std::path::Path) -> PathBuf {
        Self::config_dir_in(base).join(CONFIG_FILE)
    }

    pub fn config_backup_dir_in(base: &std::path::Path) -> PathBuf {
        Self::config_dir_in(base).join(CONFIG_BACKUP_DIR)
    }
}
