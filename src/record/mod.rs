//! Record data model shared by the field store, drafts and payload mapping.
//!
//! A [`Record`] is an ordered mapping from field name to [`Value`]. Values are
//! scalars, lists of values, or nested records (salary ranges, locations,
//! profile sub-documents). The JSON form of a record is a plain object, so
//! drafts and API payloads serialize without any tagging.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Single field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<Value>),
    Nested(Record),
}

impl Value {
    /// Builds a list value from any iterator of convertible items.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// True for values a user would consider "not filled in".
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(text) => text.trim().is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Nested(record) => record.is_empty(),
            Value::Bool(_) | Value::Number(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Numeric view of the value. Text is parsed, so form inputs that hold
    /// numbers as strings still read as numbers. Only finite numbers count.
    pub fn as_number(&self) -> Option<f64> {
        let number = match self {
            Value::Number(number) => Some(*number),
            Value::Text(text) => parse_finite(text),
            _ => None,
        };
        number.filter(|number| number.is_finite())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Nested(record) => Some(record),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(flag) => serde_json::Value::Bool(*flag),
            Value::Number(number) => serde_json::Number::from_f64(*number)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(text) => serde_json::Value::String(text.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Nested(record) => record.to_json(),
        }
    }
}

/// Parses a decimal number, refusing `inf`, `NaN` and overflowing input.
pub fn parse_finite(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(flag) => write!(f, "{}", if *flag { "yes" } else { "no" }),
            Value::Number(number) if number.fract() == 0.0 && number.abs() < 1e15 => {
                write!(f, "{:.0}", number)
            }
            Value::Number(number) => write!(f, "{}", number),
            Value::Text(text) => write!(f, "{}", text),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "{}", parts.join(", "))
            }
            Value::Nested(record) => {
                let parts: Vec<String> = record
                    .iter()
                    .map(|(key, value)| format!("{}: {}", key, value))
                    .collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<Vec<&str>> for Value {
    fn from(value: Vec<&str>) -> Self {
        Value::list(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::list(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Nested(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(flag) => Value::Bool(flag),
            serde_json::Value::Number(number) => {
                number.as_f64().map(Value::Number).unwrap_or(Value::Null)
            }
            serde_json::Value::String(text) => Value::Text(text),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Nested(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

/// Mapping from field name to value for the record under construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from a JSON object; any other JSON shape yields `None`.
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        match Value::from(value) {
            Value::Nested(record) => Some(record),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.0
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        )
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Replaces the field outright, without nested merging.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Assigns one field. A nested value written over an existing nested value
    /// is merged key by key so that sibling keys survive.
    pub fn assign(&mut self, field: impl Into<String>, value: Value) {
        let field = field.into();
        match (self.0.get_mut(&field), value) {
            (Some(Value::Nested(existing)), Value::Nested(incoming)) => existing.merge(incoming),
            (_, value) => {
                self.0.insert(field, value);
            }
        }
    }

    /// Assigns every field of `other` using [`Record::assign`] semantics.
    pub fn merge(&mut self, other: Record) {
        for (field, value) in other.0 {
            self.assign(field, value);
        }
    }

    /// Text of a field, or an empty string when absent or not text.
    pub fn text(&self, field: &str) -> String {
        match self.get(field) {
            Some(Value::Text(text)) => text.trim().to_string(),
            Some(number @ Value::Number(_)) => number.to_string(),
            _ => String::new(),
        }
    }

    /// Text items of a list field; non-text items are rendered with `Display`.
    pub fn list(&self, field: &str) -> Vec<String> {
        match self.get(field) {
            Some(Value::List(items)) => items
                .iter()
                .map(ToString::to_string)
                .filter(|item| !item.trim().is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(Value::as_number)
    }

    pub fn flag(&self, field: &str) -> bool {
        self.get(field).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn nested(&self, field: &str) -> Option<&Record> {
        self.get(field).and_then(Value::as_record)
    }

    pub fn is_blank(&self, field: &str) -> bool {
        self.get(field).map(Value::is_blank).unwrap_or(true)
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
