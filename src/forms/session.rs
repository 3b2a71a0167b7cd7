//! A running form: field store, wizard controller and draft persistence
//! wired together for one record.

use std::fmt;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::api::gateway::{SubmissionGateway, SubmissionResult};
use crate::drafts::{DraftKey, DraftPersistence};
use crate::errors::Result;
use crate::record::{Record, Value};

use super::field_store::FieldStore;
use super::flow::{FormFlow, SubmitTarget};
use super::validation::{FieldDescriptor, FieldError};
use super::wizard::{NavigationError, WizardController};

pub struct FormSession {
    flow: Arc<dyn FormFlow>,
    key: DraftKey,
    target: SubmitTarget,
    store: FieldStore,
    wizard: WizardController,
    drafts: Arc<DraftPersistence>,
    restored: bool,
}

impl fmt::Debug for FormSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormSession")
            .field("kind", &self.flow.kind())
            .field("key", &self.key)
            .field("target", &self.target)
            .field("state", &self.wizard.state())
            .finish()
    }
}

impl FormSession {
    /// Starts a session from the flow defaults, overlaid with the saved
    /// draft when one exists.
    pub async fn open(
        flow: Arc<dyn FormFlow>,
        key: DraftKey,
        target: SubmitTarget,
        drafts: Arc<DraftPersistence>,
    ) -> Result<Self> {
        let store = FieldStore::new(flow.defaults());
        Self::assemble(flow, key, target, drafts, store).await
    }

    /// Starts an edit session: the fetched entity is hydrated over the
    /// defaults, then any saved draft is applied on top.
    pub async fn open_existing(
        flow: Arc<dyn FormFlow>,
        key: DraftKey,
        id: &str,
        drafts: Arc<DraftPersistence>,
        gateway: &SubmissionGateway,
    ) -> Result<Self> {
        let mut store = FieldStore::new(flow.defaults());
        if let Some(path) = flow.fetch_path(id) {
            let entity = gateway.fetch(&path).await?;
            store.set_many(flow.hydrate(entity));
        }
        let target = SubmitTarget::Update { id: id.to_string() };
        Self::assemble(flow, key, target, drafts, store).await
    }

    async fn assemble(
        flow: Arc<dyn FormFlow>,
        key: DraftKey,
        target: SubmitTarget,
        drafts: Arc<DraftPersistence>,
        mut store: FieldStore,
    ) -> Result<Self> {
        let draft = drafts.load(&key).await?;
        let restored = draft.is_some();
        if let Some(draft) = draft {
            store.set_many(draft);
        }

        let persistence = Arc::clone(&drafts);
        let listener_key = key.clone();
        store.subscribe(move |record| {
            if let Err(err) = persistence.save(&listener_key, record) {
                error!(key = %listener_key, error = %err, "failed to persist draft");
            }
        });

        let wizard = WizardController::new(flow.descriptor().steps.clone());
        info!(key = %key, restored, steps = wizard.len(), "form session opened");
        Ok(Self {
            flow,
            key,
            target,
            store,
            wizard,
            drafts,
            restored,
        })
    }

    pub fn flow(&self) -> &dyn FormFlow {
        self.flow.as_ref()
    }

    pub fn key(&self) -> &DraftKey {
        &self.key
    }

    pub fn target(&self) -> &SubmitTarget {
        &self.target
    }

    pub fn wizard(&self) -> &WizardController {
        &self.wizard
    }

    /// Whether a saved draft was applied when the session opened.
    pub fn restored_from_draft(&self) -> bool {
        self.restored
    }

    pub fn record(&self) -> &Record {
        self.store.record()
    }

    pub fn snapshot(&self) -> Record {
        self.store.get()
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.store.set(field, value);
    }

    pub fn set_many(&mut self, partial: Record) {
        self.store.set_many(partial);
    }

    /// Writes through a descriptor, so nested fields land inside their parent.
    pub fn set_field(&mut self, descriptor: &FieldDescriptor, value: Value) {
        let (field, value) = descriptor.write(value);
        self.store.set(field, value);
    }

    pub fn push_item(&mut self, field: &str, item: &str) -> bool {
        self.store.push_item(field, item)
    }

    pub fn remove_item(&mut self, field: &str, index: usize) -> Option<Value> {
        self.store.remove_item(field, index)
    }

    /// Errors the current step would report on `next`.
    pub fn current_errors(&self) -> Vec<FieldError> {
        self.wizard.current_step().validate(self.store.record())
    }

    pub fn next(&mut self) -> std::result::Result<usize, NavigationError> {
        self.wizard.next(self.store.record())
    }

    pub fn back(&mut self) -> std::result::Result<usize, NavigationError> {
        self.wizard.back()
    }

    pub fn jump_to(&mut self, index: usize) -> std::result::Result<usize, NavigationError> {
        self.wizard.jump_to(index)
    }

    /// Validates the last step and sends the record. On success the session
    /// becomes terminal and its draft is cleared; on failure it stays on the
    /// last step with the draft intact.
    pub async fn submit(
        &mut self,
        gateway: &SubmissionGateway,
    ) -> std::result::Result<SubmissionResult, NavigationError> {
        let record = self.store.get();
        let flow = Arc::clone(&self.flow);
        let target = self.target.clone();
        let result = self
            .wizard
            .submit(&record, || gateway.submit(flow.as_ref(), &record, &target))
            .await?;
        if result.ok {
            if let Err(err) = self.drafts.clear(&self.key) {
                error!(key = %self.key, error = %err, "submitted, but the draft could not be cleared");
            }
        }
        Ok(result)
    }

    /// Drops the saved draft and starts over from the flow defaults.
    pub fn discard_draft(&mut self) -> Result<Option<JoinHandle<()>>> {
        let handle = self.drafts.clear(&self.key)?;
        self.store.reset(self.flow.defaults());
        self.wizard = WizardController::new(self.flow.descriptor().steps.clone());
        self.restored = false;
        Ok(handle)
    }
}
