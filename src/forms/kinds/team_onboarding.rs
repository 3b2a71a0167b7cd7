use serde::{Deserialize, Serialize};

use crate::api::transport::HttpMethod;
use crate::errors::Result;
use crate::forms::flow::{FormDescriptor, FormFlow, PlannedWrite, SubmitTarget};
use crate::forms::step::{StepDefinition, StepList};
use crate::forms::validation::{FieldDescriptor, FieldKind, Validator};
use crate::record::Record;

use super::FormKind;

pub const COUNTRIES: [&str; 10] = [
    "Nigeria",
    "United States",
    "United Kingdom",
    "Canada",
    "India",
    "Australia",
    "Germany",
    "France",
    "Netherlands",
    "Other",
];
pub const STATES: [&str; 11] = [
    "Lagos", "Abuja", "Kano", "Rivers", "Kaduna", "Katsina", "Oyo", "Imo", "Borno", "Anambra",
    "Other",
];
pub const CITIES: [&str; 9] = [
    "Victoria Island",
    "Ikeja",
    "Lekki",
    "Surulere",
    "Yaba",
    "Gbagada",
    "Oshodi",
    "Ikorodu",
    "Other",
];
pub const INDUSTRIES: [&str; 11] = [
    "Technology",
    "Fintech",
    "Healthtech",
    "E-commerce",
    "Edtech",
    "SaaS",
    "Gaming",
    "AI/ML",
    "IoT",
    "Blockchain",
    "Other",
];

// Assumed route; no dashboard page names it.
const ONBOARDING: &str = "/api/onboarding/team-tech-professional";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyLocation {
    pub country: String,
    pub state: String,
    pub city: String,
}

/// Wire body of `PATCH /api/onboarding/team-tech-professional`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamTechOnboardingPayload {
    pub company_name: String,
    pub rc_number: String,
    pub industry: String,
    pub website: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub location: CompanyLocation,
}

impl TeamTechOnboardingPayload {
    pub fn from_record(record: &Record) -> Self {
        let location = record.nested("location").cloned().unwrap_or_default();
        Self {
            company_name: record.text("companyName"),
            rc_number: record.text("rcNumber"),
            industry: record.text("industry"),
            website: record.text("website"),
            contact_email: record.text("contactEmail"),
            contact_phone: record.text("contactPhone"),
            location: CompanyLocation {
                country: location.text("country"),
                state: location.text("state"),
                city: location.text("city"),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct TeamTechOnboardingFlow {
    descriptor: FormDescriptor,
}

impl TeamTechOnboardingFlow {
    pub fn new() -> Result<Self> {
        let place = |key: &'static str, label: &'static str, options: &[&str]| {
            FieldDescriptor::nested(
                "location",
                key,
                label,
                FieldKind::choices(options),
                Validator::one_of(options),
            )
        };
        let company = StepDefinition::new("Company Details")
            .field(FieldDescriptor::new(
                "companyName",
                "Company name",
                FieldKind::Text,
                Validator::NonEmpty,
            ))
            .field(FieldDescriptor::new("rcNumber", "RC number", FieldKind::Text, Validator::NonEmpty))
            .field(FieldDescriptor::new(
                "industry",
                "Industry",
                FieldKind::choices(&INDUSTRIES),
                Validator::one_of(&INDUSTRIES),
            ))
            .field(
                FieldDescriptor::new("website", "Website", FieldKind::Text, Validator::Url)
                    .with_optional()
                    .with_help("https://yourcompany.com"),
            )
            .field(FieldDescriptor::new(
                "contactEmail",
                "Contact email",
                FieldKind::Text,
                Validator::Email,
            ))
            .field(
                FieldDescriptor::new("contactPhone", "Contact phone", FieldKind::Text, Validator::NonEmpty)
                    .with_help("+2348012345678"),
            )
            .field(place("country", "Country", &COUNTRIES))
            .field(place("state", "State", &STATES))
            .field(place("city", "City", &CITIES));

        let steps = StepList::new(vec![company])?;
        Ok(Self {
            descriptor: FormDescriptor::new(
                FormKind::TeamTechOnboarding,
                FormKind::TeamTechOnboarding.label(),
                steps,
            ),
        })
    }
}

impl FormFlow for TeamTechOnboardingFlow {
    fn descriptor(&self) -> &FormDescriptor {
        &self.descriptor
    }

    fn defaults(&self) -> Record {
        Record::new()
            .with("companyName", "")
            .with("rcNumber", "")
            .with("industry", "")
            .with("website", "")
            .with("contactEmail", "")
            .with("contactPhone", "")
            .with(
                "location",
                Record::new()
                    .with("country", "")
                    .with("state", "")
                    .with("city", ""),
            )
    }

    fn commit(&self, record: &Record, _target: &SubmitTarget) -> Result<Vec<PlannedWrite>> {
        let payload = TeamTechOnboardingPayload::from_record(record);
        Ok(vec![PlannedWrite::new(HttpMethod::Patch, ONBOARDING, &payload)?])
    }
}
