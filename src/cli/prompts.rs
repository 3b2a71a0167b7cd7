//! Terminal front-end for [`FormRunner`](crate::forms::FormRunner) built on
//! dialoguer.

use dialoguer::{theme::ColorfulTheme, Input, MultiSelect, Select};
use tracing::warn;

use crate::cli::output;
use crate::forms::{
    ConfirmationResponse, FieldDescriptor, FieldError, FieldKind, FormInteraction, PromptContext,
    PromptResponse,
};
use crate::record::Value;

const BACK_TOKEN: &str = ":back";
const CANCEL_TOKEN: &str = ":cancel";
const HELP_TOKEN: &str = "?";

const KEEP_LABEL: &str = "(keep current)";
const BACK_LABEL: &str = "<- Back";
const CANCEL_LABEL: &str = "Cancel";

pub struct TerminalInteraction {
    theme: ColorfulTheme,
    last_step: Option<usize>,
}

impl Default for TerminalInteraction {
    fn default() -> Self {
        Self {
            theme: ColorfulTheme::default(),
            last_step: None,
        }
    }
}

impl TerminalInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    fn header(&mut self, context: &PromptContext<'_>) {
        if self.last_step != Some(context.step.0) {
            output::section(format!(
                "Step {} / {}: {}",
                context.step.0, context.step.1, context.step_name
            ));
            output::info(format!(
                "Enter keeps the current value, `{}` goes back, `{}` aborts, `{}` shows help.",
                BACK_TOKEN, CANCEL_TOKEN, HELP_TOKEN
            ));
            self.last_step = Some(context.step.0);
        }
    }

    fn text(&self, context: &PromptContext<'_>) -> PromptResponse {
        let current = context
            .current
            .filter(|value| !value.is_blank())
            .map(ToString::to_string);
        let prompt = match &current {
            Some(current) => format!("{} [{}]", context.descriptor.label, current),
            None => context.descriptor.label.to_string(),
        };
        let answer = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text();
        match answer {
            Ok(raw) => interpret(&raw),
            Err(err) => {
                warn!(error = %err, "terminal prompt failed");
                PromptResponse::Cancel
            }
        }
    }

    fn choice(&self, context: &PromptContext<'_>, options: &[String]) -> PromptResponse {
        let mut items: Vec<&str> = options.iter().map(String::as_str).collect();
        items.extend([KEEP_LABEL, BACK_LABEL, CANCEL_LABEL]);
        let current = context.current.map(ToString::to_string).unwrap_or_default();
        let default = options
            .iter()
            .position(|option| option.eq_ignore_ascii_case(&current))
            .unwrap_or(options.len());
        let selection = Select::with_theme(&self.theme)
            .with_prompt(context.descriptor.label)
            .items(&items)
            .default(default)
            .interact_opt();
        match selection {
            Ok(Some(index)) if index < options.len() => PromptResponse::Value(options[index].clone()),
            Ok(Some(index)) if index == options.len() => PromptResponse::Keep,
            Ok(Some(index)) if index == options.len() + 1 => PromptResponse::Back,
            Ok(_) => PromptResponse::Cancel,
            Err(err) => {
                warn!(error = %err, "terminal selection failed");
                PromptResponse::Cancel
            }
        }
    }

    fn multi_choice(&self, context: &PromptContext<'_>, options: &[String]) -> PromptResponse {
        let selected: Vec<String> = match context.current {
            Some(Value::List(items)) => items.iter().map(ToString::to_string).collect(),
            _ => Vec::new(),
        };
        let defaults: Vec<bool> = options
            .iter()
            .map(|option| selected.iter().any(|item| item.eq_ignore_ascii_case(option)))
            .collect();
        let selection = MultiSelect::with_theme(&self.theme)
            .with_prompt(format!("{} (space to toggle, esc to cancel)", context.descriptor.label))
            .items(options)
            .defaults(&defaults)
            .interact_opt();
        match selection {
            Ok(Some(indices)) => {
                let chosen: Vec<&str> = indices.iter().map(|index| options[*index].as_str()).collect();
                PromptResponse::Value(chosen.join(", "))
            }
            Ok(None) => PromptResponse::Cancel,
            Err(err) => {
                warn!(error = %err, "terminal selection failed");
                PromptResponse::Cancel
            }
        }
    }
}

fn interpret(raw: &str) -> PromptResponse {
    match raw.trim() {
        "" => PromptResponse::Keep,
        BACK_TOKEN => PromptResponse::Back,
        CANCEL_TOKEN => PromptResponse::Cancel,
        HELP_TOKEN => PromptResponse::Help,
        _ => PromptResponse::Value(raw.to_string()),
    }
}

impl FormInteraction for TerminalInteraction {
    fn prompt_field(&mut self, context: &PromptContext<'_>) -> PromptResponse {
        self.header(context);
        match &context.descriptor.kind {
            FieldKind::Choice(options) => self.choice(context, options),
            FieldKind::MultiChoice(options) => self.multi_choice(context, options),
            _ => self.text(context),
        }
    }

    fn confirm(&mut self, summary: &[String]) -> ConfirmationResponse {
        output::section("Review");
        for line in summary.iter().skip(1) {
            println!("{}", line);
        }
        self.last_step = None;
        let selection = Select::with_theme(&self.theme)
            .with_prompt("Finish this form?")
            .items(&["Confirm", "Back", CANCEL_LABEL])
            .default(0)
            .interact_opt();
        match selection {
            Ok(Some(0)) => ConfirmationResponse::Confirm,
            Ok(Some(1)) => ConfirmationResponse::Back,
            Ok(_) => ConfirmationResponse::Cancel,
            Err(err) => {
                warn!(error = %err, "terminal confirmation failed");
                ConfirmationResponse::Cancel
            }
        }
    }

    fn report_errors(&mut self, errors: &[FieldError]) {
        for error in errors {
            output::warning(error);
        }
    }

    fn show_help(&mut self, descriptor: &FieldDescriptor) {
        let hint = match &descriptor.kind {
            FieldKind::Number => "Numeric value.".to_string(),
            FieldKind::Boolean => "Answer yes or no.".to_string(),
            FieldKind::Date => "Date in YYYY-MM-DD format.".to_string(),
            FieldKind::List => "Comma-separated entries.".to_string(),
            FieldKind::Choice(options) | FieldKind::MultiChoice(options) => {
                format!("One of: {}", options.join(", "))
            }
            FieldKind::Text | FieldKind::LongText => String::new(),
        };
        match descriptor.help {
            Some(help) => output::info(format!("{} {}", help, hint).trim()),
            None if !hint.is_empty() => output::info(hint),
            None => output::info("No additional help for this field."),
        }
    }
}
