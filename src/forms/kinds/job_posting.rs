use serde::{Deserialize, Serialize};

use crate::api::transport::HttpMethod;
use crate::errors::Result;
use crate::forms::flow::{FormDescriptor, FormFlow, PlannedWrite, SubmitTarget};
use crate::forms::step::{StepDefinition, StepList};
use crate::forms::validation::{FieldDescriptor, FieldError, FieldKind, Validator};
use crate::record::{Record, Value};

use super::{unwrap_entity, FormKind};

pub const EMPLOYMENT_TYPES: [&str; 5] = ["full-time", "part-time", "contract", "internship", "remote"];
pub const CURRENCIES: [&str; 4] = ["GBP", "USD", "EUR", "NGN"];
pub const DEPARTMENTS: [&str; 10] = [
    "Engineering",
    "Design",
    "Marketing",
    "Sales",
    "Data Science",
    "IT Operations",
    "Product",
    "HR",
    "Finance",
    "Other",
];

const JOB_POSTS: &str = "/api/ats/job-posts";

/// Salary band as sent to the ATS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub currency: String,
}

/// `salaryRange` on the wire: a structured band, or the free-text band that
/// older posts carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SalaryWire {
    Band(SalaryRange),
    Text(String),
}

/// Wire body of `POST /api/ats/job-posts` and `PUT /api/ats/job-posts/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPostPayload {
    pub title: String,
    pub company: String,
    pub department: String,
    pub location: String,
    pub employment_type: String,
    pub salary_range: SalaryWire,
    pub experience_level: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub responsibilities: Vec<String>,
    pub required_skills: Vec<String>,
    pub benefits: Vec<String>,
    pub tags: Vec<String>,
    pub contact_email: String,
    pub contact_phone: String,
    pub website: String,
    pub recruiter: String,
    pub is_featured: bool,
    pub is_urgent: bool,
    pub expiry_date: Option<String>,
}

impl JobPostPayload {
    pub fn from_record(record: &Record) -> Self {
        let salary = record.nested("salary").cloned().unwrap_or_default();
        let currency = match salary.text("currency") {
            currency if currency.is_empty() => CURRENCIES[0].to_string(),
            currency => currency.to_uppercase(),
        };
        let expiry = record.text("expiryDate");
        let band_text = record.text("salaryText");
        let (min, max) = (salary.number("min"), salary.number("max"));
        // A structured band wins; the free text is sent only on its own.
        let salary_range = if min.is_none() && max.is_none() && !band_text.is_empty() {
            SalaryWire::Text(band_text)
        } else {
            SalaryWire::Band(SalaryRange { min, max, currency })
        };
        Self {
            title: record.text("title"),
            company: record.text("company"),
            department: record.text("department"),
            location: record.text("location"),
            employment_type: record.text("type"),
            salary_range,
            experience_level: record.text("experience"),
            description: record.text("description"),
            requirements: record.list("requirements"),
            responsibilities: record.list("responsibilities"),
            required_skills: record.list("skills"),
            benefits: record.list("benefits"),
            tags: record.list("tags"),
            contact_email: record.text("contactEmail"),
            contact_phone: record.text("contactPhone"),
            website: record.text("website"),
            recruiter: record.text("recruiter"),
            is_featured: record.flag("isFeatured"),
            is_urgent: record.flag("isUrgent"),
            expiry_date: (!expiry.is_empty()).then_some(expiry),
        }
    }
}

#[derive(Debug, Clone)]
pub struct JobPostingFlow {
    descriptor: FormDescriptor,
}

impl JobPostingFlow {
    pub fn new() -> Result<Self> {
        let basics = StepDefinition::new("Basic Information")
            .field(FieldDescriptor::new("title", "Job title", FieldKind::Text, Validator::NonEmpty))
            .field(FieldDescriptor::new("company", "Company", FieldKind::Text, Validator::NonEmpty))
            .field(
                FieldDescriptor::new(
                    "department",
                    "Department",
                    FieldKind::choices(&DEPARTMENTS),
                    Validator::one_of(&DEPARTMENTS),
                )
                .with_optional(),
            )
            .field(FieldDescriptor::new("location", "Location", FieldKind::Text, Validator::NonEmpty))
            .field(FieldDescriptor::new(
                "type",
                "Employment type",
                FieldKind::choices(&EMPLOYMENT_TYPES),
                Validator::one_of(&EMPLOYMENT_TYPES),
            ))
            .field(
                FieldDescriptor::new("recruiter", "Recruiter", FieldKind::Text, Validator::None)
                    .with_optional(),
            );

        let salary = StepDefinition::new("Salary & Experience")
            .field(
                FieldDescriptor::nested(
                    "salary",
                    "min",
                    "Minimum salary",
                    FieldKind::Number,
                    Validator::PositiveNumber,
                )
                .with_optional(),
            )
            .field(
                FieldDescriptor::nested(
                    "salary",
                    "max",
                    "Maximum salary",
                    FieldKind::Number,
                    Validator::PositiveNumber,
                )
                .with_optional(),
            )
            .field(FieldDescriptor::nested(
                "salary",
                "currency",
                "Currency",
                FieldKind::choices(&CURRENCIES),
                Validator::one_of(&CURRENCIES),
            ))
            .field(
                FieldDescriptor::new("experience", "Experience", FieldKind::Text, Validator::None)
                    .with_optional()
                    .with_help("e.g. 3-5 years"),
            )
            .field(
                FieldDescriptor::new("salaryText", "Salary band (text)", FieldKind::Text, Validator::None)
                    .with_optional()
                    .with_help("Only used when no minimum or maximum is given, e.g. £40k-£50k"),
            )
            .check(&["salary.min", "salary.max", "salaryText"], salary_band_is_given)
            .check(&["salary.min", "salary.max"], salary_band_is_ordered);

        let description = StepDefinition::new("Description & Requirements")
            .field(FieldDescriptor::new(
                "description",
                "Job description",
                FieldKind::LongText,
                Validator::NonEmpty,
            ))
            .field(
                FieldDescriptor::new("requirements", "Requirements", FieldKind::List, Validator::None)
                    .with_optional(),
            )
            .field(
                FieldDescriptor::new(
                    "responsibilities",
                    "Responsibilities",
                    FieldKind::List,
                    Validator::None,
                )
                .with_optional(),
            )
            .field(
                FieldDescriptor::new("skills", "Required skills", FieldKind::List, Validator::NonEmptyList)
                    .with_help("Comma-separated, at least one"),
            )
            .field(
                FieldDescriptor::new("benefits", "Benefits", FieldKind::List, Validator::None)
                    .with_optional(),
            )
            .field(FieldDescriptor::new("tags", "Tags", FieldKind::List, Validator::None).with_optional());

        let contact = StepDefinition::new("Contact & Settings")
            .field(FieldDescriptor::new(
                "contactEmail",
                "Contact email",
                FieldKind::Text,
                Validator::Email,
            ))
            .field(
                FieldDescriptor::new("contactPhone", "Contact phone", FieldKind::Text, Validator::None)
                    .with_optional(),
            )
            .field(
                FieldDescriptor::new("website", "Company website", FieldKind::Text, Validator::Url)
                    .with_optional(),
            )
            .field(
                FieldDescriptor::new("isFeatured", "Featured job", FieldKind::Boolean, Validator::None)
                    .with_optional(),
            )
            .field(
                FieldDescriptor::new("isUrgent", "Urgent hiring", FieldKind::Boolean, Validator::None)
                    .with_optional(),
            )
            .field(
                FieldDescriptor::new("expiryDate", "Expiry date", FieldKind::Date, Validator::Date)
                    .with_optional(),
            );

        let steps = StepList::new(vec![basics, salary, description, contact])?;
        Ok(Self {
            descriptor: FormDescriptor::new(FormKind::JobPosting, FormKind::JobPosting.label(), steps),
        })
    }
}

/// Minimum and maximum are required unless a free-text band stands in.
fn salary_band_is_given(record: &Record) -> Vec<FieldError> {
    if !record.is_blank("salaryText") {
        return Vec::new();
    }
    let salary = record.nested("salary");
    [("min", "Minimum salary"), ("max", "Maximum salary")]
        .into_iter()
        .filter(|(key, _)| salary.map(|band| band.is_blank(key)).unwrap_or(true))
        .map(|(key, label)| FieldError::new(format!("salary.{}", key), format!("{} is required", label)))
        .collect()
}

fn salary_band_is_ordered(record: &Record) -> Vec<FieldError> {
    let Some(salary) = record.nested("salary") else {
        return Vec::new();
    };
    match (salary.number("min"), salary.number("max")) {
        (Some(min), Some(max)) if min > max => vec![FieldError::new(
            "salary.max",
            "Maximum salary must not be below the minimum",
        )],
        _ => Vec::new(),
    }
}

impl FormFlow for JobPostingFlow {
    fn descriptor(&self) -> &FormDescriptor {
        &self.descriptor
    }

    fn defaults(&self) -> Record {
        Record::new()
            .with("title", "")
            .with("company", "")
            .with("department", "")
            .with("location", "")
            .with("type", "full-time")
            .with(
                "salary",
                Record::new()
                    .with("min", "")
                    .with("max", "")
                    .with("currency", "GBP"),
            )
            .with("salaryText", "")
            .with("experience", "")
            .with("description", "")
            .with("requirements", Value::List(Vec::new()))
            .with("responsibilities", Value::List(Vec::new()))
            .with("skills", Value::List(Vec::new()))
            .with("benefits", Value::List(Vec::new()))
            .with("tags", Value::List(Vec::new()))
            .with("contactEmail", "")
            .with("contactPhone", "")
            .with("website", "")
            .with("recruiter", "")
            .with("isFeatured", false)
            .with("isUrgent", false)
            .with("expiryDate", "")
    }

    fn commit(&self, record: &Record, target: &SubmitTarget) -> Result<Vec<PlannedWrite>> {
        let payload = JobPostPayload::from_record(record);
        let write = match target {
            SubmitTarget::Create => PlannedWrite::new(HttpMethod::Post, JOB_POSTS, &payload)?,
            SubmitTarget::Update { id } => {
                PlannedWrite::new(HttpMethod::Put, format!("{}/{}", JOB_POSTS, id), &payload)?
            }
        };
        Ok(vec![write])
    }

    fn fetch_path(&self, id: &str) -> Option<String> {
        Some(format!("{}/{}", JOB_POSTS, id))
    }

    /// Maps an ATS job post back onto the wizard's field names.
    fn hydrate(&self, entity: Record) -> Record {
        let job = unwrap_entity(entity, "job");
        let mut record = Record::new();
        for (key, value) in job.iter() {
            let field = match key.as_str() {
                "employmentType" => "type",
                "requiredSkills" => "skills",
                "experienceLevel" => "experience",
                "salaryRange" if value.as_record().is_some() => "salary",
                "salaryRange" => "salaryText",
                other => other,
            };
            record.insert(field, value.clone());
        }
        record
    }
}
