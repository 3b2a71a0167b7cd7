use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::errors::{FormsError, Result};
use crate::record::Record;

use super::validation::{FieldDescriptor, FieldError};

type CheckCallback = dyn Fn(&Record) -> Vec<FieldError> + Send + Sync;

/// Cross-field rule attached to a step. `fields` lists the field paths the
/// rule reads; they must be exposed by the owning step.
#[derive(Clone)]
pub struct StepCheck {
    fields: Vec<&'static str>,
    check: Arc<CheckCallback>,
}

impl StepCheck {
    pub fn fields(&self) -> &[&'static str] {
        &self.fields
    }
}

impl fmt::Debug for StepCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepCheck")
            .field("fields", &self.fields)
            .finish()
    }
}

/// One named page of a wizard: the fields it renders and how it is validated.
#[derive(Debug, Clone)]
pub struct StepDefinition {
    name: &'static str,
    fields: Vec<FieldDescriptor>,
    checks: Vec<StepCheck>,
}

impl StepDefinition {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
            checks: Vec::new(),
        }
    }

    pub fn field(mut self, descriptor: FieldDescriptor) -> Self {
        self.fields.push(descriptor);
        self
    }

    pub fn check<F>(mut self, fields: &[&'static str], check: F) -> Self
    where
        F: Fn(&Record) -> Vec<FieldError> + Send + Sync + 'static,
    {
        self.checks.push(StepCheck {
            fields: fields.to_vec(),
            check: Arc::new(check),
        });
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn checks(&self) -> &[StepCheck] {
        &self.checks
    }

    /// Field paths rendered by this step.
    pub fn exposed_fields(&self) -> BTreeSet<String> {
        self.fields.iter().map(FieldDescriptor::path).collect()
    }

    pub fn required_fields(&self) -> BTreeSet<String> {
        self.fields
            .iter()
            .filter(|descriptor| descriptor.required)
            .map(FieldDescriptor::path)
            .collect()
    }

    /// Validates the record against this step. Field rules run first, then
    /// cross-field checks; an empty result means the step may be left forward.
    pub fn validate(&self, record: &Record) -> Vec<FieldError> {
        let mut errors: Vec<FieldError> = self
            .fields
            .iter()
            .filter_map(|descriptor| descriptor.validate(record))
            .collect();
        for check in &self.checks {
            for error in (check.check)(record) {
                if !errors.iter().any(|existing| existing.field == error.field) {
                    errors.push(error);
                }
            }
        }
        errors
    }
}

/// Ordered, non-empty sequence of steps.
#[derive(Debug, Clone)]
pub struct StepList {
    steps: Vec<StepDefinition>,
}

impl StepList {
    pub fn new(steps: Vec<StepDefinition>) -> Result<Self> {
        if steps.is_empty() {
            return Err(FormsError::InvalidSteps(
                "a wizard needs at least one step".into(),
            ));
        }
        let mut names = BTreeSet::new();
        for step in &steps {
            if !names.insert(step.name) {
                return Err(FormsError::InvalidSteps(format!(
                    "duplicate step name `{}`",
                    step.name
                )));
            }
            let mut seen = BTreeSet::new();
            for descriptor in &step.fields {
                if !seen.insert(descriptor.path()) {
                    return Err(FormsError::InvalidSteps(format!(
                        "field `{}` appears twice in step `{}`",
                        descriptor.path(),
                        step.name
                    )));
                }
            }
            for check in &step.checks {
                if let Some(missing) = check
                    .fields
                    .iter()
                    .find(|field| !seen.contains(**field))
                {
                    return Err(FormsError::InvalidSteps(format!(
                        "step `{}` checks `{}` without rendering it",
                        step.name, missing
                    )));
                }
            }
        }
        Ok(Self { steps })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&StepDefinition> {
        self.steps.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StepDefinition> {
        self.steps.iter()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.steps.iter().map(StepDefinition::name).collect()
    }

    pub fn last_index(&self) -> usize {
        self.steps.len() - 1
    }

    /// Finds the descriptor for a field path across all steps.
    pub fn descriptor(&self, path: &str) -> Option<&FieldDescriptor> {
        self.steps
            .iter()
            .flat_map(|step| step.fields.iter())
            .find(|descriptor| descriptor.path() == path)
    }
}

impl std::ops::Index<usize> for StepList {
    type Output = StepDefinition;

    fn index(&self, index: usize) -> &Self::Output {
        &self.steps[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::validation::{FieldKind, Validator};

    fn text(key: &'static str) -> FieldDescriptor {
        FieldDescriptor::new(key, key, FieldKind::Text, Validator::NonEmpty)
    }

    #[test]
    fn empty_step_list_is_rejected() {
        assert!(matches!(
            StepList::new(Vec::new()),
            Err(FormsError::InvalidSteps(_))
        ));
    }

    #[test]
    fn duplicate_step_names_are_rejected() {
        let result = StepList::new(vec![StepDefinition::new("A"), StepDefinition::new("A")]);
        assert!(result.is_err());
    }

    #[test]
    fn checks_must_reference_exposed_fields() {
        let step = StepDefinition::new("Salary")
            .field(text("min"))
            .check(&["min", "max"], |_| Vec::new());
        let err = StepList::new(vec![step]).unwrap_err();
        assert!(err.to_string().contains("`max`"));
    }

    #[test]
    fn required_fields_are_a_subset_of_exposed_fields() {
        let step = StepDefinition::new("Basics")
            .field(text("title"))
            .field(text("recruiter").with_optional());
        assert!(step.required_fields().is_subset(&step.exposed_fields()));
        assert_eq!(step.required_fields().len(), 1);
    }

    #[test]
    fn validate_runs_field_rules_then_checks() {
        let step = StepDefinition::new("Salary")
            .field(FieldDescriptor::new(
                "min",
                "Minimum",
                FieldKind::Number,
                Validator::Number,
            ))
            .field(FieldDescriptor::new(
                "max",
                "Maximum",
                FieldKind::Number,
                Validator::Number,
            ))
            .check(&["min", "max"], |record| {
                match (record.number("min"), record.number("max")) {
                    (Some(min), Some(max)) if min > max => {
                        vec![FieldError::new("max", "Maximum must not be below minimum")]
                    }
                    _ => Vec::new(),
                }
            });

        let ok = Record::new().with("min", 1).with("max", 2);
        assert!(step.validate(&ok).is_empty());

        let inverted = Record::new().with("min", 5).with("max", 2);
        let errors = step.validate(&inverted);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "max");

        let missing = Record::new();
        let errors = step.validate(&missing);
        assert_eq!(errors.len(), 2);
    }
}
