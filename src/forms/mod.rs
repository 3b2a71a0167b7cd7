//! Stepped form framework: record storage, field validation, step lists,
//! the wizard state machine and the concrete dashboard form kinds.

pub mod field_store;
pub mod flow;
pub mod interaction;
pub mod kinds;
pub mod session;
pub mod step;
pub mod validation;
pub mod wizard;

pub use field_store::FieldStore;
pub use flow::{FormDescriptor, FormFlow, PlannedWrite, SubmitTarget};
pub use interaction::{
    ConfirmationResponse, FormInteraction, FormOutcome, FormRunner, PromptContext, PromptResponse,
    ScriptedInteraction,
};
pub use kinds::FormKind;
pub use session::FormSession;
pub use step::{StepDefinition, StepList};
pub use validation::{FieldDescriptor, FieldError, FieldKind, Validator};
pub use wizard::{NavigationError, WizardController, WizardState};
