use serde::{Deserialize, Serialize};

use crate::api::transport::HttpMethod;
use crate::errors::Result;
use crate::forms::flow::{FormDescriptor, FormFlow, PlannedWrite, SubmitTarget};
use crate::forms::step::{StepDefinition, StepList};
use crate::forms::validation::{FieldDescriptor, FieldKind, Validator};
use crate::record::{Record, Value};

use super::FormKind;

const CURRENT_USER: &str = "/api/users/me";
const LIST_FIELDS: [&str; 3] = ["departments", "assignedRegions", "permissions"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileFields {
    pub full_name: String,
    pub phone_number: String,
    pub bio: String,
    pub departments: Vec<String>,
    pub assigned_regions: Vec<String>,
    pub permissions: Vec<String>,
}

/// Wire body of `PATCH /api/users/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub profile: ProfileFields,
}

impl ProfileUpdate {
    pub fn from_record(record: &Record) -> Self {
        Self {
            profile: ProfileFields {
                full_name: record.text("fullName"),
                phone_number: record.text("phoneNumber"),
                bio: record.text("bio"),
                departments: record.list("departments"),
                assigned_regions: record.list("assignedRegions"),
                permissions: record.list("permissions"),
            },
        }
    }
}

fn phone_number() -> Validator {
    Validator::custom(|value| {
        let text = value.to_string();
        let digits = text.chars().filter(char::is_ascii_digit).count();
        let allowed = text
            .chars()
            .all(|ch| ch.is_ascii_digit() || matches!(ch, '+' | ' ' | '-' | '(' | ')'));
        if allowed && (7..=15).contains(&digits) {
            Ok(())
        } else {
            Err("Enter a phone number with 7 to 15 digits".into())
        }
    })
}

/// Single-page profile editor used by the admin-like roles.
#[derive(Debug, Clone)]
pub struct ProfileEditFlow {
    descriptor: FormDescriptor,
}

impl ProfileEditFlow {
    pub fn new() -> Result<Self> {
        let profile = StepDefinition::new("Profile")
            .field(FieldDescriptor::new("fullName", "Full name", FieldKind::Text, Validator::NonEmpty))
            .field(
                FieldDescriptor::new("phoneNumber", "Phone number", FieldKind::Text, phone_number())
                    .with_optional(),
            )
            .field(
                FieldDescriptor::new("bio", "Bio", FieldKind::LongText, Validator::MaxLength(500))
                    .with_optional(),
            )
            .field(
                FieldDescriptor::new("departments", "Departments", FieldKind::List, Validator::None)
                    .with_optional(),
            )
            .field(
                FieldDescriptor::new(
                    "assignedRegions",
                    "Assigned regions",
                    FieldKind::List,
                    Validator::None,
                )
                .with_optional(),
            )
            .field(
                FieldDescriptor::new("permissions", "Permissions", FieldKind::List, Validator::None)
                    .with_optional(),
            );

        let steps = StepList::new(vec![profile])?;
        Ok(Self {
            descriptor: FormDescriptor::new(FormKind::ProfileEdit, FormKind::ProfileEdit.label(), steps),
        })
    }
}

impl FormFlow for ProfileEditFlow {
    fn descriptor(&self) -> &FormDescriptor {
        &self.descriptor
    }

    fn defaults(&self) -> Record {
        let mut record = Record::new()
            .with("fullName", "")
            .with("phoneNumber", "")
            .with("bio", "");
        for field in LIST_FIELDS {
            record.insert(field, Value::List(Vec::new()));
        }
        record
    }

    fn commit(&self, record: &Record, _target: &SubmitTarget) -> Result<Vec<PlannedWrite>> {
        let body = ProfileUpdate::from_record(record);
        Ok(vec![PlannedWrite::new(HttpMethod::Patch, CURRENT_USER, &body)?])
    }

    fn fetch_path(&self, _id: &str) -> Option<String> {
        Some(CURRENT_USER.to_string())
    }

    /// Reads the nested profile, falling back to the top-level full name.
    fn hydrate(&self, entity: Record) -> Record {
        let profile = entity.nested("profile").cloned().unwrap_or_default();
        let full_name = match profile.text("fullName") {
            name if name.is_empty() => entity.text("fullName"),
            name => name,
        };
        let mut record = self.defaults();
        record.insert("fullName", full_name);
        record.insert("phoneNumber", profile.text("phoneNumber"));
        record.insert("bio", profile.text("bio"));
        for field in LIST_FIELDS {
            record.insert(field, profile.list(field));
        }
        record
    }
}
