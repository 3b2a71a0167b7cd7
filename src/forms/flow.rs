use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::api::transport::HttpMethod;
use crate::errors::Result;
use crate::record::Record;

use super::kinds::FormKind;
use super::step::StepList;

/// Whether a submission creates a new entity or updates an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitTarget {
    Create,
    Update { id: String },
}

impl SubmitTarget {
    pub fn from_record_id(id: Option<String>) -> Self {
        match id {
            Some(id) if !id.trim().is_empty() => SubmitTarget::Update { id },
            _ => SubmitTarget::Create,
        }
    }

    pub fn record_id(&self) -> Option<&str> {
        match self {
            SubmitTarget::Create => None,
            SubmitTarget::Update { id } => Some(id.as_str()),
        }
    }
}

/// One backend write derived from a record.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedWrite {
    pub method: HttpMethod,
    pub path: String,
    pub body: JsonValue,
}

impl PlannedWrite {
    pub fn new(method: HttpMethod, path: impl Into<String>, body: &impl Serialize) -> Result<Self> {
        Ok(Self {
            method,
            path: path.into(),
            body: serde_json::to_value(body)?,
        })
    }
}

/// Metadata describing a full wizard: its kind, display label and steps.
#[derive(Debug, Clone)]
pub struct FormDescriptor {
    pub kind: FormKind,
    pub label: &'static str,
    pub steps: StepList,
}

impl FormDescriptor {
    pub fn new(kind: FormKind, label: &'static str, steps: StepList) -> Self {
        Self { kind, label, steps }
    }
}

/// High-level form contract for the dashboard's creation and edit wizards.
///
/// Implementations describe their steps, supply the initial record, and map
/// a validated record onto the backend writes that persist it.
pub trait FormFlow: Send + Sync {
    /// Descriptor controlling step order and field behaviour.
    fn descriptor(&self) -> &FormDescriptor;

    fn kind(&self) -> FormKind {
        self.descriptor().kind
    }

    /// Initial record for a fresh session.
    fn defaults(&self) -> Record;

    /// Maps the record onto the ordered writes that persist it. Every wire
    /// field is produced, blank values included.
    fn commit(&self, record: &Record, target: &SubmitTarget) -> Result<Vec<PlannedWrite>>;

    /// Endpoint that returns the entity being edited.
    fn fetch_path(&self, _id: &str) -> Option<String> {
        None
    }

    /// Converts a fetched entity into the record shape the steps expect.
    fn hydrate(&self, entity: Record) -> Record {
        entity
    }
}
