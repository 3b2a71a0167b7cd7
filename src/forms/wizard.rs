//! Step sequencing for multi-page forms.
//!
//! The controller owns the current step index and the furthest index reached
//! through validated transitions. Moving forward always validates the step
//! being left; moving backward never does. Submission is only possible from
//! the last step and is the single path into the terminal state.

use std::future::Future;

use thiserror::Error;
use tracing::debug;

use crate::api::gateway::SubmissionResult;
use crate::record::Record;

use super::step::{StepDefinition, StepList};
use super::validation::FieldError;

/// Position of a wizard session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    Step(usize),
    Submitted,
}

/// Reasons a navigation or submission request was refused. The session is
/// left unchanged in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("step `{step}` has {} invalid field(s)", errors.len())]
    Invalid {
        step: &'static str,
        errors: Vec<FieldError>,
    },
    #[error("step {requested} has not been reached yet (furthest validated step is {highest})")]
    NotYetReachable { requested: usize, highest: usize },
    #[error("step {0} does not exist")]
    OutOfRange(usize),
    #[error("submission is only possible from the last step")]
    NotOnLastStep,
    #[error("the form has already been submitted")]
    AlreadySubmitted,
}

impl NavigationError {
    /// Field errors carried by a validation refusal.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            NavigationError::Invalid { errors, .. } => errors,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone)]
pub struct WizardController {
    steps: StepList,
    current: usize,
    highest_validated: usize,
    submitted: bool,
}

impl WizardController {
    pub fn new(steps: StepList) -> Self {
        Self {
            steps,
            current: 0,
            highest_validated: 0,
            submitted: false,
        }
    }

    pub fn steps(&self) -> &StepList {
        &self.steps
    }

    pub fn state(&self) -> WizardState {
        if self.submitted {
            WizardState::Submitted
        } else {
            WizardState::Step(self.current)
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_step(&self) -> &StepDefinition {
        // `current` never leaves 0..len and the list is never empty.
        &self.steps[self.current]
    }

    pub fn step_name(&self) -> &'static str {
        self.current_step().name()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_first(&self) -> bool {
        self.current == 0
    }

    pub fn is_last(&self) -> bool {
        self.current == self.steps.last_index()
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Furthest step index reached through validated forward transitions.
    pub fn highest_validated(&self) -> usize {
        self.highest_validated
    }

    /// 1-based position and total, for "Step i / N" headers.
    pub fn progress(&self) -> (usize, usize) {
        (self.current + 1, self.steps.len())
    }

    /// Validates the current step and advances when it passes. On the last
    /// step a successful validation leaves the index where it is.
    pub fn next(&mut self, record: &Record) -> Result<usize, NavigationError> {
        self.ensure_open()?;
        let step = self.current_step();
        let errors = step.validate(record);
        if !errors.is_empty() {
            debug!(
                step = step.name(),
                errors = errors.len(),
                "wizard refused to advance"
            );
            return Err(NavigationError::Invalid {
                step: step.name(),
                errors,
            });
        }
        self.current = (self.current + 1).min(self.steps.last_index());
        self.highest_validated = self.highest_validated.max(self.current);
        Ok(self.current)
    }

    /// Steps back one page. Never validated.
    pub fn back(&mut self) -> Result<usize, NavigationError> {
        self.ensure_open()?;
        self.current = self.current.saturating_sub(1);
        Ok(self.current)
    }

    /// Moves to any earlier step, or forward up to the furthest validated step.
    pub fn jump_to(&mut self, index: usize) -> Result<usize, NavigationError> {
        self.ensure_open()?;
        if index >= self.steps.len() {
            return Err(NavigationError::OutOfRange(index));
        }
        if index > self.current && index > self.highest_validated {
            return Err(NavigationError::NotYetReachable {
                requested: index,
                highest: self.highest_validated,
            });
        }
        self.current = index;
        Ok(self.current)
    }

    /// Runs every step validator, collecting all field errors.
    pub fn validate_all(&self, record: &Record) -> Vec<FieldError> {
        self.steps
            .iter()
            .flat_map(|step| step.validate(record))
            .collect()
    }

    /// Checks that a submission may start: the session is open, on the last
    /// step, and the last step validates.
    pub fn ready_to_submit(&self, record: &Record) -> Result<(), NavigationError> {
        self.ensure_open()?;
        if !self.is_last() {
            return Err(NavigationError::NotOnLastStep);
        }
        let step = self.current_step();
        let errors = step.validate(record);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(NavigationError::Invalid {
                step: step.name(),
                errors,
            })
        }
    }

    /// Validates the final step, then awaits `send`. A successful result moves
    /// the wizard into the terminal state; a failed one leaves it on the last
    /// step so the user can retry. Nothing is retried automatically.
    pub async fn submit<F, Fut>(
        &mut self,
        record: &Record,
        send: F,
    ) -> Result<SubmissionResult, NavigationError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = SubmissionResult>,
    {
        self.ready_to_submit(record)?;
        let result = send().await;
        if result.ok {
            self.submitted = true;
        }
        Ok(result)
    }

    fn ensure_open(&self) -> Result<(), NavigationError> {
        if self.submitted {
            Err(NavigationError::AlreadySubmitted)
        } else {
            Ok(())
        }
    }
}
