use serde::{Deserialize, Serialize};

use crate::api::transport::HttpMethod;
use crate::errors::Result;
use crate::forms::flow::{FormDescriptor, FormFlow, PlannedWrite, SubmitTarget};
use crate::forms::step::{StepDefinition, StepList};
use crate::forms::validation::{FieldDescriptor, FieldError, FieldKind, Validator};
use crate::record::{Record, Value};

use super::{number_or_zero, unwrap_entity, FormKind};

/// Category values with their display labels.
pub const CATEGORIES: [(&str, &str); 14] = [
    ("scholarship_coaching", "Scholarship Coaching"),
    ("academic_transition", "Academic Transition"),
    ("thesis_review", "Thesis Review"),
    ("research_publication", "Research Publication"),
    ("masters_project", "Masters Project"),
    ("phd_mentorship", "PhD Mentorship"),
    ("document_review", "Document Review"),
    ("sop_writing", "SOP Writing"),
    ("cover_letter", "Cover Letter"),
    ("research_proposal", "Research Proposal"),
    ("plagiarism_check", "Plagiarism Check"),
    ("mentorship", "Mentorship"),
    ("study_abroad", "Study Abroad"),
    ("career_roadmapping", "Career Roadmapping"),
];
pub const SERVICE_LEVELS: [&str; 4] = ["basic", "standard", "premium", "elite"];
pub const DELIVERY_MODES: [&str; 3] = ["online", "offline", "hybrid"];
pub const SESSION_TYPES: [&str; 3] = ["1-on-1", "group", "workshop"];

const ACADEMIC_SERVICES: &str = "/api/academic-services";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicServicePayload {
    pub title: String,
    pub description: String,
    pub category: String,
    pub service_level: String,
    pub delivery_mode: String,
    pub session_type: String,
    pub duration_minutes: f64,
    pub price: f64,
    pub tags: Vec<String>,
    pub learning_objectives: Vec<String>,
    pub prerequisites: String,
    pub max_participants: f64,
    pub thumbnail_url: String,
    pub is_active: bool,
}

impl AcademicServicePayload {
    pub fn from_record(record: &Record) -> Self {
        Self {
            title: record.text("title"),
            description: record.text("description"),
            category: record.text("category"),
            service_level: record.text("serviceLevel"),
            delivery_mode: record.text("deliveryMode"),
            session_type: record.text("sessionType"),
            duration_minutes: number_or_zero(record, "durationMinutes"),
            price: number_or_zero(record, "price"),
            tags: record.list("tags"),
            learning_objectives: record.list("learningObjectives"),
            prerequisites: record.text("prerequisites"),
            max_participants: number_or_zero(record, "maxParticipants"),
            thumbnail_url: record.text("thumbnailUrl"),
            is_active: record.flag("isActive"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AcademicServiceFlow {
    descriptor: FormDescriptor,
}

impl AcademicServiceFlow {
    pub fn new() -> Result<Self> {
        let categories: Vec<&str> = CATEGORIES.iter().map(|(value, _)| *value).collect();

        let basics = StepDefinition::new("Basic Information")
            .field(FieldDescriptor::new("title", "Title", FieldKind::Text, Validator::NonEmpty))
            .field(FieldDescriptor::new(
                "description",
                "Description",
                FieldKind::LongText,
                Validator::NonEmpty,
            ))
            .field(FieldDescriptor::new(
                "category",
                "Category",
                FieldKind::choices(&categories),
                Validator::one_of(&categories),
            ));

        let details = StepDefinition::new("Details & Media")
            .field(FieldDescriptor::new(
                "serviceLevel",
                "Service level",
                FieldKind::choices(&SERVICE_LEVELS),
                Validator::one_of(&SERVICE_LEVELS),
            ))
            .field(FieldDescriptor::new(
                "deliveryMode",
                "Delivery mode",
                FieldKind::choices(&DELIVERY_MODES),
                Validator::one_of(&DELIVERY_MODES),
            ))
            .field(FieldDescriptor::new(
                "sessionType",
                "Session type",
                FieldKind::choices(&SESSION_TYPES),
                Validator::one_of(&SESSION_TYPES),
            ))
            .field(FieldDescriptor::new(
                "durationMinutes",
                "Duration (minutes)",
                FieldKind::Number,
                Validator::IntegerAtLeast(1),
            ))
            .field(FieldDescriptor::new(
                "price",
                "Price",
                FieldKind::Number,
                Validator::NonNegativeNumber,
            ))
            .field(FieldDescriptor::new(
                "maxParticipants",
                "Max participants",
                FieldKind::Number,
                Validator::IntegerAtLeast(1),
            ))
            .field(
                FieldDescriptor::new("thumbnailUrl", "Thumbnail URL", FieldKind::Text, Validator::Url)
                    .with_optional(),
            )
            .check(&["sessionType", "maxParticipants"], one_on_one_has_single_seat);

        let learning = StepDefinition::new("Learning & Requirements")
            .field(FieldDescriptor::new("tags", "Tags", FieldKind::List, Validator::None).with_optional())
            .field(
                FieldDescriptor::new(
                    "learningObjectives",
                    "Learning objectives",
                    FieldKind::List,
                    Validator::None,
                )
                .with_optional(),
            )
            .field(
                FieldDescriptor::new(
                    "prerequisites",
                    "Prerequisites",
                    FieldKind::LongText,
                    Validator::None,
                )
                .with_optional(),
            );

        let review = StepDefinition::new("Review & Confirm").field(
            FieldDescriptor::new("isActive", "Active", FieldKind::Boolean, Validator::None)
                .with_optional(),
        );

        let steps = StepList::new(vec![basics, details, learning, review])?;
        Ok(Self {
            descriptor: FormDescriptor::new(
                FormKind::AcademicService,
                FormKind::AcademicService.label(),
                steps,
            ),
        })
    }
}

fn one_on_one_has_single_seat(record: &Record) -> Vec<FieldError> {
    let seats = record.number("maxParticipants").unwrap_or(1.0);
    if record.text("sessionType") == "1-on-1" && seats > 1.0 {
        vec![FieldError::new(
            "maxParticipants",
            "A 1-on-1 session has exactly one participant",
        )]
    } else {
        Vec::new()
    }
}

impl FormFlow for AcademicServiceFlow {
    fn descriptor(&self) -> &FormDescriptor {
        &self.descriptor
    }

    fn defaults(&self) -> Record {
        Record::new()
            .with("title", "")
            .with("description", "")
            .with("category", "")
            .with("serviceLevel", "basic")
            .with("deliveryMode", "online")
            .with("sessionType", "1-on-1")
            .with("durationMinutes", 60)
            .with("price", 0)
            .with("tags", Value::List(Vec::new()))
            .with("learningObjectives", Value::List(Vec::new()))
            .with("prerequisites", "")
            .with("maxParticipants", 1)
            .with("thumbnailUrl", "")
            .with("isActive", true)
    }

    fn commit(&self, record: &Record, target: &SubmitTarget) -> Result<Vec<PlannedWrite>> {
        let payload = AcademicServicePayload::from_record(record);
        let write = match target {
            SubmitTarget::Create => PlannedWrite::new(HttpMethod::Post, ACADEMIC_SERVICES, &payload)?,
            SubmitTarget::Update { id } => PlannedWrite::new(
                HttpMethod::Patch,
                format!("{}/{}", ACADEMIC_SERVICES, id),
                &payload,
            )?,
        };
        Ok(vec![write])
    }

    fn fetch_path(&self, id: &str) -> Option<String> {
        Some(format!("{}/{}", ACADEMIC_SERVICES, id))
    }

    fn hydrate(&self, entity: Record) -> Record {
        unwrap_entity(entity, "service")
    }
}
