//! Field-by-field driver for a [`FormSession`], independent of the front-end
//! that collects the answers.

use std::fmt;
use std::io::{BufRead, Write};

use tracing::{debug, warn};

use crate::errors::Result;
use crate::record::{Record, Value};

use super::session::FormSession;
use super::validation::{FieldDescriptor, FieldError};

/// How a wizard run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome {
    /// Every step validated and the user confirmed the summary.
    Completed(Record),
    Cancelled,
}

/// Describes how prompts can be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResponse {
    /// Raw text for the field, parsed according to its kind.
    Value(String),
    /// Keep the current value.
    Keep,
    /// Go back to the previous field, or the previous step from the first field.
    Back,
    /// Abort the wizard. Answers given so far stay in the draft.
    Cancel,
    Help,
}

/// Responses accepted when confirming the collected data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationResponse {
    Confirm,
    Back,
    Cancel,
}

/// Everything a front-end needs to render one prompt.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub descriptor: &'a FieldDescriptor,
    pub current: Option<&'a Value>,
    pub step_name: &'static str,
    /// 1-based step position and step count.
    pub step: (usize, usize),
}

pub trait FormInteraction {
    fn prompt_field(&mut self, context: &PromptContext<'_>) -> PromptResponse;

    fn confirm(&mut self, summary: &[String]) -> ConfirmationResponse;

    fn report_errors(&mut self, errors: &[FieldError]);

    fn show_help(&mut self, _descriptor: &FieldDescriptor) {}
}

/// Walks a session's steps, prompting each field through a
/// [`FormInteraction`] and advancing the wizard when a step is answered.
pub struct FormRunner;

impl FormRunner {
    pub fn run<I: FormInteraction>(session: &mut FormSession, interaction: &mut I) -> Result<FormOutcome> {
        let mut pending: Option<Vec<usize>> = None;
        loop {
            let step = session.wizard().current_step().clone();
            let indices = pending
                .take()
                .unwrap_or_else(|| (0..step.fields().len()).collect());
            let position = (session.wizard().current() + 1, session.wizard().len());

            let mut cursor = 0;
            let mut retreat = false;
            while cursor < indices.len() {
                let descriptor = &step.fields()[indices[cursor]];
                let context = PromptContext {
                    descriptor,
                    current: descriptor.read(session.record()),
                    step_name: step.name(),
                    step: position,
                };
                match interaction.prompt_field(&context) {
                    PromptResponse::Value(raw) => {
                        session.set_field(descriptor, descriptor.kind.parse(&raw));
                        match descriptor.validate(session.record()) {
                            Some(error) => interaction.report_errors(&[error]),
                            None => cursor += 1,
                        }
                    }
                    PromptResponse::Keep => cursor += 1,
                    PromptResponse::Back if cursor > 0 => cursor -= 1,
                    PromptResponse::Back => {
                        retreat = true;
                        break;
                    }
                    PromptResponse::Help => interaction.show_help(descriptor),
                    PromptResponse::Cancel => {
                        debug!(step = step.name(), "wizard cancelled");
                        return Ok(FormOutcome::Cancelled);
                    }
                }
            }

            if retreat {
                session.back()?;
                continue;
            }

            if !session.wizard().is_last() {
                if let Err(err) = session.next() {
                    interaction.report_errors(err.field_errors());
                    pending = Some(failing_indices(step.fields(), err.field_errors()));
                }
                continue;
            }

            let errors = session.current_errors();
            if !errors.is_empty() {
                interaction.report_errors(&errors);
                pending = Some(failing_indices(step.fields(), &errors));
                continue;
            }
            match interaction.confirm(&summary_lines(session)) {
                ConfirmationResponse::Confirm => return Ok(FormOutcome::Completed(session.snapshot())),
                ConfirmationResponse::Back => continue,
                ConfirmationResponse::Cancel => return Ok(FormOutcome::Cancelled),
            }
        }
    }
}

/// Fields to prompt again after a refusal; every field when the errors
/// name none of them.
fn failing_indices(fields: &[FieldDescriptor], errors: &[FieldError]) -> Vec<usize> {
    let failing: Vec<usize> = fields
        .iter()
        .enumerate()
        .filter(|(_, descriptor)| errors.iter().any(|error| error.field == descriptor.path()))
        .map(|(index, _)| index)
        .collect();
    if failing.is_empty() {
        (0..fields.len()).collect()
    } else {
        failing
    }
}

/// "Label: value" lines for every field of every step.
pub fn summary_lines(session: &FormSession) -> Vec<String> {
    let mut lines = vec!["Review your entries:".to_string()];
    for step in session.wizard().steps().iter() {
        lines.push(format!("[{}]", step.name()));
        for descriptor in step.fields() {
            let value = descriptor
                .read(session.record())
                .filter(|value| !value.is_blank())
                .map(ToString::to_string)
                .unwrap_or_else(|| "[unfilled]".to_string());
            lines.push(format!("  {}: {}", descriptor.label, value));
        }
    }
    lines
}

/// Line-oriented answers, one per prompt. An empty line keeps the current
/// value; `<back>`, `<cancel>` and `<help>` map to the matching responses.
/// End of input cancels.
pub struct ScriptedInteraction<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ScriptedInteraction<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn next_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }

    /// Writes one line of output. Answers keep coming from the input even
    /// when the output side is gone, so a failed write is only logged.
    fn emit(&mut self, line: fmt::Arguments<'_>) {
        if let Err(err) = self.output.write_fmt(format_args!("{}\n", line)) {
            warn!(error = %err, "scripted output write failed");
        }
    }
}

impl<R: BufRead, W: Write> FormInteraction for ScriptedInteraction<R, W> {
    fn prompt_field(&mut self, context: &PromptContext<'_>) -> PromptResponse {
        self.emit(format_args!(
            "[{}/{} {}] {}:",
            context.step.0, context.step.1, context.step_name, context.descriptor.label
        ));
        let Some(line) = self.next_line() else {
            return PromptResponse::Cancel;
        };
        match line.trim() {
            "" => PromptResponse::Keep,
            "<back>" => PromptResponse::Back,
            "<cancel>" => PromptResponse::Cancel,
            "<help>" => PromptResponse::Help,
            _ => PromptResponse::Value(line),
        }
    }

    fn confirm(&mut self, summary: &[String]) -> ConfirmationResponse {
        for line in summary {
            self.emit(format_args!("{}", line));
        }
        self.emit(format_args!("Submit? [y/back/n]"));
        match self.next_line().map(|line| line.trim().to_lowercase()) {
            Some(answer) if answer == "y" || answer == "yes" => ConfirmationResponse::Confirm,
            Some(answer) if answer == "back" || answer == "<back>" => ConfirmationResponse::Back,
            _ => ConfirmationResponse::Cancel,
        }
    }

    fn report_errors(&mut self, errors: &[FieldError]) {
        for error in errors {
            self.emit(format_args!("! {}", error));
        }
    }

    fn show_help(&mut self, descriptor: &FieldDescriptor) {
        let help = descriptor.help.unwrap_or("No additional help for this field.");
        self.emit(format_args!("? {}", help));
    }
}
