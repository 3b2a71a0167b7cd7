use thiserror::Error;

use crate::api::gateway::SubmissionError;
use crate::forms::wizard::NavigationError;

/// Error type that captures failures of the form, draft and configuration layers.
#[derive(Debug, Error)]
pub enum FormsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid step list: {0}")]
    InvalidSteps(String),
    #[error("Unknown form kind: {0}")]
    UnknownFormKind(String),
    #[error("Navigation refused: {0}")]
    Navigation(#[from] NavigationError),
    #[error("Request failed: {0}")]
    Remote(#[from] SubmissionError),
}

pub type Result<T> = std::result::Result<T, FormsError>;
