//! `formctl`: terminal front-end over the form library.
//!
//! The CLI works against the local draft store only. Finished forms end with
//! a preview of the writes the submission gateway would perform.

mod commands;
pub mod output;
mod prompts;

use std::env;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use strsim::levenshtein;
use thiserror::Error;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use crate::config::{Config, ConfigManager};
use crate::drafts::{DraftPersistence, JsonDraftStore};
use crate::errors::FormsError;
use crate::roles::UnsupportedRole;

pub use prompts::TerminalInteraction;

/// Set to any value to read wizard answers line by line from stdin.
pub const SCRIPT_ENV: &str = "FORMCTL_SCRIPT";

const COMMANDS: [&str; 6] = ["kinds", "role", "fill", "drafts", "payload", "help"];

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Forms(#[from] FormsError),
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    UnsupportedRole(UnsupportedRole),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::UnsupportedRole(_) => 2,
            _ => 1,
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Forms(FormsError::from(err))
    }
}

/// Settings, draft store and runtime shared by the stateful commands.
pub(crate) struct CliContext {
    config: Config,
    drafts_dir: PathBuf,
    drafts: Arc<DraftPersistence>,
    runtime: Runtime,
    scripted: bool,
}

impl CliContext {
    fn load() -> Result<Self, CliError> {
        let manager = ConfigManager::new()?;
        let config = manager.load()?;
        let drafts_dir = config.drafts_dir_in(manager.base_dir());
        let store = JsonDraftStore::new(&drafts_dir)?;
        let runtime = Builder::new_current_thread().enable_all().build()?;
        debug!(dir = %drafts_dir.display(), "draft store ready");
        Ok(Self {
            config,
            drafts_dir,
            drafts: Arc::new(DraftPersistence::new(Arc::new(store))),
            runtime,
            scripted: env::var_os(SCRIPT_ENV).is_some(),
        })
    }
}

/// Runs one `formctl` invocation. `args` excludes the program name.
pub fn run<I>(args: I) -> Result<(), CliError>
where
    I: IntoIterator<Item = String>,
{
    let args: Vec<String> = args.into_iter().collect();
    let Some((command, rest)) = args.split_first() else {
        print_usage();
        return Err(CliError::Usage("missing command".into()));
    };

    if env::var_os(SCRIPT_ENV).is_some() {
        output::set_preferences(output::OutputPreferences {
            plain_mode: true,
            quiet_mode: false,
        });
    }

    match command.as_str() {
        "kinds" => commands::kinds(),
        "role" => commands::role(rest),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        "fill" | "drafts" | "payload" => {
            let context = CliContext::load()?;
            match command.as_str() {
                "fill" => commands::fill(&context, rest),
                "drafts" => commands::drafts(&context, rest),
                _ => commands::payload(&context, rest),
            }
        }
        other => Err(unknown_command(other)),
    }
}

fn unknown_command(input: &str) -> CliError {
    let suggestion = COMMANDS
        .iter()
        .map(|name| (levenshtein(name, input), *name))
        .min_by_key(|(distance, _)| *distance)
        .filter(|(distance, _)| *distance <= 3);
    match suggestion {
        Some((_, name)) => CliError::Usage(format!("unknown command `{}`; did you mean `{}`?", input, name)),
        None => CliError::Usage(format!("unknown command `{}`", input)),
    }
}

pub fn print_usage() {
    println!("Usage: formctl <command> [args]");
    println!();
    println!("Commands:");
    println!("  kinds                          List form kinds and their steps");
    println!("  role <name>                    Resolve a role to its profile capabilities");
    println!("  fill <kind> [--record <id>]    Fill a form; answers are kept as a draft");
    println!("                                 (--record edits start from defaults, not the stored entity)");
    println!("  drafts list                    List saved drafts");
    println!("  drafts show <kind> [id]        Print a saved draft");
    println!("  drafts clear <kind> [id]       Delete a saved draft");
    println!("  payload <kind> [id]            Print the API writes for a saved draft");
    println!();
    println!("Set {}=1 to answer prompts line by line from stdin.", SCRIPT_ENV);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typo_suggests_closest_command() {
        let err = unknown_command("draft");
        assert!(err.to_string().contains("did you mean `drafts`"));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn missing_command_is_a_usage_error() {
        assert!(matches!(run(Vec::new()), Err(CliError::Usage(_))));
    }
}
