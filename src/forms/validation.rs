//! Field-level validation used by step definitions.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::record::{parse_finite, Record, Value};

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Supported data kinds for form fields. Drives how raw input is parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    LongText,
    Number,
    Boolean,
    Date,
    Choice(Vec<String>),
    MultiChoice(Vec<String>),
    List,
}

impl FieldKind {
    pub fn choices(options: &[&str]) -> Self {
        FieldKind::Choice(options.iter().map(|option| option.to_string()).collect())
    }

    pub fn multi_choices(options: &[&str]) -> Self {
        FieldKind::MultiChoice(options.iter().map(|option| option.to_string()).collect())
    }

    /// Converts raw user input into a typed value for this kind.
    pub fn parse(&self, raw: &str) -> Value {
        let trimmed = raw.trim();
        match self {
            FieldKind::Number => parse_finite(trimmed)
                .map(Value::Number)
                .unwrap_or_else(|| Value::Text(trimmed.to_string())),
            FieldKind::Boolean => match trimmed.to_lowercase().as_str() {
                "y" | "yes" | "true" | "1" => Value::Bool(true),
                "n" | "no" | "false" | "0" => Value::Bool(false),
                _ => Value::Text(trimmed.to_string()),
            },
            FieldKind::List | FieldKind::MultiChoice(_) => Value::list(
                trimmed
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty()),
            ),
            FieldKind::Text
            | FieldKind::LongText
            | FieldKind::Date
            | FieldKind::Choice(_) => Value::Text(trimmed.to_string()),
        }
    }
}

type ValidatorCallback = dyn Fn(&Value) -> Result<(), String> + Send + Sync;
type SharedValidatorCallback = Arc<ValidatorCallback>;

/// Built-in validation helpers.
#[derive(Clone)]
pub enum Validator {
    None,
    NonEmpty,
    NonEmptyList,
    Email,
    Url,
    Number,
    PositiveNumber,
    NonNegativeNumber,
    IntegerAtLeast(i64),
    Date,
    OneOf(Vec<String>),
    MaxLength(usize),
    Custom(SharedValidatorCallback),
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validator::Custom(_) => write!(f, "Custom(..)"),
            Validator::OneOf(options) => f.debug_tuple("OneOf").field(options).finish(),
            Validator::IntegerAtLeast(min) => f.debug_tuple("IntegerAtLeast").field(min).finish(),
            Validator::MaxLength(max) => f.debug_tuple("MaxLength").field(max).finish(),
            other => write!(f, "{}", other.name()),
        }
    }
}

impl Validator {
    pub fn one_of(options: &[&str]) -> Self {
        Validator::OneOf(options.iter().map(|option| option.to_string()).collect())
    }

    pub fn custom<F>(check: F) -> Self
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        Validator::Custom(Arc::new(check))
    }

    fn name(&self) -> &'static str {
        match self {
            Validator::None => "None",
            Validator::NonEmpty => "NonEmpty",
            Validator::NonEmptyList => "NonEmptyList",
            Validator::Email => "Email",
            Validator::Url => "Url",
            Validator::Number => "Number",
            Validator::PositiveNumber => "PositiveNumber",
            Validator::NonNegativeNumber => "NonNegativeNumber",
            Validator::IntegerAtLeast(_) => "IntegerAtLeast",
            Validator::Date => "Date",
            Validator::OneOf(_) => "OneOf",
            Validator::MaxLength(_) => "MaxLength",
            Validator::Custom(_) => "Custom",
        }
    }

    /// Checks a present, non-blank value.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            Validator::None => Ok(()),
            Validator::NonEmpty => {
                if value.is_blank() {
                    Err("Value cannot be empty".into())
                } else {
                    Ok(())
                }
            }
            Validator::NonEmptyList => match value.as_list() {
                Some(items) if !items.is_empty() => Ok(()),
                Some(_) => Err("Add at least one entry".into()),
                None => Err("Expected a list of entries".into()),
            },
            Validator::Email => {
                let text = value.as_text().unwrap_or_default().trim();
                let mut parts = text.splitn(2, '@');
                let local = parts.next().unwrap_or_default();
                let domain = parts.next().unwrap_or_default();
                if local.is_empty()
                    || domain.is_empty()
                    || domain.contains('@')
                    || !domain.contains('.')
                    || domain.starts_with('.')
                    || domain.ends_with('.')
                    || text.contains(char::is_whitespace)
                {
                    Err("Enter a valid email address".into())
                } else {
                    Ok(())
                }
            }
            Validator::Url => {
                let text = value.as_text().unwrap_or_default().trim();
                let rest = text
                    .strip_prefix("https://")
                    .or_else(|| text.strip_prefix("http://"));
                match rest {
                    Some(host) if !host.is_empty() && !host.starts_with('/') => Ok(()),
                    _ => Err("Enter a URL starting with http:// or https://".into()),
                }
            }
            Validator::Number => value
                .as_number()
                .map(|_| ())
                .ok_or_else(|| "Enter a numeric value".into()),
            Validator::PositiveNumber => match value.as_number() {
                Some(number) if number > 0.0 => Ok(()),
                Some(_) => Err("Value must be greater than zero".into()),
                None => Err("Enter a numeric value".into()),
            },
            Validator::NonNegativeNumber => match value.as_number() {
                Some(number) if number >= 0.0 => Ok(()),
                Some(_) => Err("Value must be zero or positive".into()),
                None => Err("Enter a numeric value".into()),
            },
            Validator::IntegerAtLeast(min) => match value.as_number() {
                Some(number) if number.fract() == 0.0 && number >= *min as f64 => Ok(()),
                Some(_) => Err(format!("Enter a whole number ({} or greater)", min)),
                None => Err("Enter a whole number".into()),
            },
            Validator::Date => {
                let text = value.as_text().unwrap_or_default().trim();
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .map(|_| ())
                    .map_err(|_| "Use YYYY-MM-DD format".into())
            }
            Validator::OneOf(options) => {
                let matches = |candidate: &str| {
                    let normalized = candidate.trim().to_lowercase();
                    options
                        .iter()
                        .any(|option| option.to_lowercase() == normalized)
                };
                let ok = match value {
                    Value::List(items) => items.iter().all(|item| matches(&item.to_string())),
                    other => matches(&other.to_string()),
                };
                if ok {
                    Ok(())
                } else {
                    Err(format!("Value must be one of: {}", options.join(", ")))
                }
            }
            Validator::MaxLength(max) => {
                let length = value.to_string().chars().count();
                if length > *max {
                    Err(format!("Cannot exceed {} characters (got {})", max, length))
                } else {
                    Ok(())
                }
            }
            Validator::Custom(func) => func(value),
        }
    }
}

/// Declarative description of a single form field.
///
/// `parent` addresses a key inside a nested record field, so `salary.min`
/// is described as key `min` with parent `salary`.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub key: &'static str,
    pub parent: Option<&'static str>,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub help: Option<&'static str>,
    pub validator: Validator,
}

impl FieldDescriptor {
    pub fn new(
        key: &'static str,
        label: &'static str,
        kind: FieldKind,
        validator: Validator,
    ) -> Self {
        Self {
            key,
            parent: None,
            label,
            kind,
            required: true,
            help: None,
            validator,
        }
    }

    pub fn nested(
        parent: &'static str,
        key: &'static str,
        label: &'static str,
        kind: FieldKind,
        validator: Validator,
    ) -> Self {
        Self {
            parent: Some(parent),
            ..Self::new(key, label, kind, validator)
        }
    }

    pub fn with_optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }

    /// Dotted path used in error reports, e.g. `salary.min`.
    pub fn path(&self) -> String {
        match self.parent {
            Some(parent) => format!("{}.{}", parent, self.key),
            None => self.key.to_string(),
        }
    }

    /// Top-level record field this descriptor writes to.
    pub fn field(&self) -> &'static str {
        self.parent.unwrap_or(self.key)
    }

    pub fn read<'r>(&self, record: &'r Record) -> Option<&'r Value> {
        match self.parent {
            Some(parent) => record.nested(parent)?.get(self.key),
            None => record.get(self.key),
        }
    }

    /// Field name and value to hand to the field store for an update of this
    /// descriptor; nested descriptors produce a partial nested record.
    pub fn write(&self, value: Value) -> (&'static str, Value) {
        match self.parent {
            Some(parent) => (parent, Value::Nested(Record::new().with(self.key, value))),
            None => (self.key, value),
        }
    }

    pub fn validate(&self, record: &Record) -> Option<FieldError> {
        match self.read(record) {
            Some(value) if !value.is_blank() => self
                .validator
                .check(value)
                .err()
                .map(|message| FieldError::new(self.path(), message)),
            _ if self.required => Some(FieldError::new(
                self.path(),
                format!("{} is required", self.label),
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(validator: Validator, value: impl Into<Value>) -> Result<(), String> {
        validator.check(&value.into())
    }

    #[test]
    fn email_validator_accepts_plain_addresses() {
        assert!(check(Validator::Email, "hr@techcorp.co.uk").is_ok());
        assert!(check(Validator::Email, "hr@techcorp").is_err());
        assert!(check(Validator::Email, "@techcorp.com").is_err());
        assert!(check(Validator::Email, "a b@techcorp.com").is_err());
    }

    #[test]
    fn url_validator_requires_scheme_and_host() {
        assert!(check(Validator::Url, "https://example.com").is_ok());
        assert!(check(Validator::Url, "example.com").is_err());
        assert!(check(Validator::Url, "https:///path").is_err());
    }

    #[test]
    fn numeric_validators_read_text_inputs() {
        assert!(check(Validator::PositiveNumber, "50000").is_ok());
        assert!(check(Validator::PositiveNumber, 0).is_err());
        assert!(check(Validator::NonNegativeNumber, 0).is_ok());
        assert!(check(Validator::IntegerAtLeast(1), 1.5).is_err());
        assert!(check(Validator::IntegerAtLeast(1), "3").is_ok());
    }

    #[test]
    fn non_finite_numbers_fail_every_numeric_validator() {
        for raw in ["inf", "-inf", "NaN", "1e400", "infinity"] {
            for validator in [
                Validator::Number,
                Validator::PositiveNumber,
                Validator::NonNegativeNumber,
                Validator::IntegerAtLeast(0),
            ] {
                assert!(check(validator.clone(), raw).is_err(), "{:?} accepted {}", validator, raw);
            }
        }
        assert!(check(Validator::PositiveNumber, f64::INFINITY).is_err());
        assert!(check(Validator::Number, f64::NAN).is_err());
    }

    #[test]
    fn non_finite_input_stays_text() {
        assert_eq!(FieldKind::Number.parse("1e400"), Value::Text("1e400".into()));
        assert_eq!(FieldKind::Number.parse(" inf "), Value::Text("inf".into()));
        assert_eq!(FieldKind::Number.parse("NaN"), Value::Text("NaN".into()));
        assert_eq!(FieldKind::Number.parse("1e300"), Value::Number(1e300));
    }

    #[test]
    fn one_of_is_case_insensitive_and_checks_every_list_item() {
        let validator = Validator::one_of(&["Frontend", "Backend"]);
        assert!(check(validator.clone(), "frontend").is_ok());
        assert!(check(validator.clone(), vec!["Backend", "FRONTEND"]).is_ok());
        assert!(check(validator, vec!["Backend", "Sales"]).is_err());
    }

    #[test]
    fn date_validator_uses_iso_format() {
        assert!(check(Validator::Date, "2025-12-31").is_ok());
        assert!(check(Validator::Date, "31/12/2025").is_err());
    }

    #[test]
    fn required_descriptor_reports_label_on_blank() {
        let descriptor =
            FieldDescriptor::new("title", "Job title", FieldKind::Text, Validator::NonEmpty);
        let error = descriptor.validate(&Record::new().with("title", " ")).unwrap();
        assert_eq!(error.field, "title");
        assert_eq!(error.message, "Job title is required");
    }

    #[test]
    fn optional_descriptor_skips_blank_but_checks_present_values() {
        let descriptor =
            FieldDescriptor::new("website", "Website", FieldKind::Text, Validator::Url)
                .with_optional();
        assert!(descriptor.validate(&Record::new()).is_none());
        assert!(descriptor
            .validate(&Record::new().with("website", "nope"))
            .is_some());
    }

    #[test]
    fn nested_descriptor_reads_and_writes_inside_parent() {
        let descriptor = FieldDescriptor::nested(
            "salary",
            "min",
            "Minimum salary",
            FieldKind::Number,
            Validator::PositiveNumber,
        );
        let (field, value) = descriptor.write(Value::Number(10.0));
        assert_eq!(field, "salary");
        let record = Record::new().with(field, value);
        assert_eq!(descriptor.read(&record), Some(&Value::Number(10.0)));
        assert_eq!(descriptor.path(), "salary.min");
    }

    #[test]
    fn field_kind_parses_raw_input() {
        assert_eq!(FieldKind::Number.parse("42"), Value::Number(42.0));
        assert_eq!(FieldKind::Boolean.parse("Yes"), Value::Bool(true));
        assert_eq!(
            FieldKind::List.parse("rust, sql ,"),
            Value::list(["rust", "sql"])
        );
    }
}
