use serde::{Deserialize, Serialize};

use crate::api::transport::HttpMethod;
use crate::errors::Result;
use crate::forms::flow::{FormDescriptor, FormFlow, PlannedWrite, SubmitTarget};
use crate::forms::step::{StepDefinition, StepList};
use crate::forms::validation::{FieldDescriptor, FieldError, FieldKind, Validator};
use crate::record::{Record, Value};

use super::FormKind;

pub const FOCUS_AREAS: [&str; 15] = [
    "Frontend",
    "Backend",
    "Full Stack",
    "DevOps",
    "Data Science",
    "Machine Learning",
    "AI Engineers",
    "Mobile Development",
    "UI/UX Design",
    "Cybersecurity",
    "Cloud Computing",
    "Blockchain",
    "QA/Testing",
    "Product Management",
    "Other",
];
pub const HIRING_MODELS: [&str; 5] = ["full-time", "part-time", "contract", "freelance", "internship"];

// Assumed route; no dashboard page names it.
const ONBOARDING: &str = "/api/onboarding/recruiter";

/// Fields of the post-job step that become required unless it is skipped.
const FIRST_JOB_FIELDS: [(&str, &str); 4] = [
    ("jobTitle", "Job title"),
    ("jobDescription", "Job description"),
    ("location", "Location"),
    ("employmentType", "Employment type"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirstJob {
    pub title: String,
    pub description: String,
    pub location: String,
    pub employment_type: String,
    pub salary_range: String,
}

/// Wire body of `PATCH /api/onboarding/recruiter`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecruiterOnboardingPayload {
    pub company_name: String,
    pub company_id: String,
    pub rc_number: String,
    pub website: String,
    pub industry: String,
    pub recruitment_focus_areas: Vec<String>,
    pub preferred_hiring_model: String,
    /// `null` when the recruiter skipped posting a first job.
    pub first_job: Option<FirstJob>,
}

impl RecruiterOnboardingPayload {
    pub fn from_record(record: &Record) -> Self {
        let first_job = (!record.flag("skipForNow")).then(|| FirstJob {
            title: record.text("jobTitle"),
            description: record.text("jobDescription"),
            location: record.text("location"),
            employment_type: record.text("employmentType"),
            salary_range: record.text("salaryRange"),
        });
        Self {
            company_name: record.text("companyName"),
            company_id: record.text("companyId"),
            rc_number: record.text("rcNumber"),
            website: record.text("website"),
            industry: record.text("industry"),
            recruitment_focus_areas: record.list("recruitmentFocusAreas"),
            preferred_hiring_model: record.text("preferredHiringModel"),
            first_job,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecruiterOnboardingFlow {
    descriptor: FormDescriptor,
}

impl RecruiterOnboardingFlow {
    pub fn new() -> Result<Self> {
        let company = StepDefinition::new("Company Link")
            .field(FieldDescriptor::new(
                "companyName",
                "Company name",
                FieldKind::Text,
                Validator::NonEmpty,
            ))
            .field(
                FieldDescriptor::new("companyId", "Company ID", FieldKind::Text, Validator::None)
                    .with_optional()
                    .with_help("Link to an existing company profile"),
            )
            .field(
                FieldDescriptor::new("rcNumber", "RC number", FieldKind::Text, Validator::None)
                    .with_optional(),
            )
            .field(
                FieldDescriptor::new("website", "Website", FieldKind::Text, Validator::Url)
                    .with_optional(),
            )
            .field(FieldDescriptor::new("industry", "Industry", FieldKind::Text, Validator::NonEmpty));

        let focus = StepDefinition::new("Hiring Focus")
            .field(FieldDescriptor::new(
                "recruitmentFocusAreas",
                "Recruitment focus areas",
                FieldKind::multi_choices(&FOCUS_AREAS),
                Validator::one_of(&FOCUS_AREAS),
            ))
            .field(FieldDescriptor::new(
                "preferredHiringModel",
                "Preferred hiring model",
                FieldKind::choices(&HIRING_MODELS),
                Validator::one_of(&HIRING_MODELS),
            ));

        let mut post_job = StepDefinition::new("Post Job").field(
            FieldDescriptor::new("skipForNow", "Skip for now", FieldKind::Boolean, Validator::None)
                .with_optional(),
        );
        for (key, label) in FIRST_JOB_FIELDS {
            let (kind, validator) = if key == "employmentType" {
                (
                    FieldKind::choices(&HIRING_MODELS),
                    Validator::one_of(&HIRING_MODELS),
                )
            } else if key == "jobDescription" {
                (FieldKind::LongText, Validator::None)
            } else {
                (FieldKind::Text, Validator::None)
            };
            post_job = post_job.field(FieldDescriptor::new(key, label, kind, validator).with_optional());
        }
        post_job = post_job
            .field(
                FieldDescriptor::new("salaryRange", "Salary range", FieldKind::Text, Validator::None)
                    .with_optional(),
            )
            .check(
                &["skipForNow", "jobTitle", "jobDescription", "location", "employmentType"],
                first_job_unless_skipped,
            );

        let steps = StepList::new(vec![company, focus, post_job])?;
        Ok(Self {
            descriptor: FormDescriptor::new(
                FormKind::RecruiterOnboarding,
                FormKind::RecruiterOnboarding.label(),
                steps,
            ),
        })
    }
}

fn first_job_unless_skipped(record: &Record) -> Vec<FieldError> {
    if record.flag("skipForNow") {
        return Vec::new();
    }
    FIRST_JOB_FIELDS
        .iter()
        .filter(|(key, _)| record.is_blank(key))
        .map(|(key, label)| FieldError::new(*key, format!("{} is required", label)))
        .collect()
}

impl FormFlow for RecruiterOnboardingFlow {
    fn descriptor(&self) -> &FormDescriptor {
        &self.descriptor
    }

    fn defaults(&self) -> Record {
        Record::new()
            .with("companyName", "")
            .with("companyId", "")
            .with("rcNumber", "")
            .with("website", "")
            .with("industry", "")
            .with("recruitmentFocusAreas", Value::List(Vec::new()))
            .with("preferredHiringModel", "")
            .with("skipForNow", false)
            .with("jobTitle", "")
            .with("jobDescription", "")
            .with("location", "")
            .with("employmentType", "")
            .with("salaryRange", "")
    }

    /// Onboarding is a single profile document, so create and update issue
    /// the same patch.
    fn commit(&self, record: &Record, _target: &SubmitTarget) -> Result<Vec<PlannedWrite>> {
        let payload = RecruiterOnboardingPayload::from_record(record);
        Ok(vec![PlannedWrite::new(HttpMethod::Patch, ONBOARDING, &payload)?])
    }
}
