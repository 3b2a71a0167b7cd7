use serde::{Deserialize, Serialize};

use crate::api::transport::HttpMethod;
use crate::errors::Result;
use crate::forms::flow::{FormDescriptor, FormFlow, PlannedWrite, SubmitTarget};
use crate::forms::step::{StepDefinition, StepList};
use crate::forms::validation::{FieldDescriptor, FieldKind, Validator};
use crate::record::{Record, Value};

use super::{number_or_zero, unwrap_entity, FormKind};

pub const PRODUCT_TYPES: [&str; 3] = [
    "Academic Services",
    "Corporate Consultancy",
    "Career Development",
];
pub const DIFFICULTY_LEVELS: [&str; 3] = ["Beginner", "Intermediate", "Advanced"];
pub const DELIVERY_MODES: [&str; 2] = ["online", "offline"];
pub const SESSION_TYPES: [&str; 2] = ["one-one", "group"];

/// Boolean switches on the delivery step, in display order.
pub const PRODUCT_FLAGS: [(&str, &str); 8] = [
    ("isRecurring", "Recurring"),
    ("requiresBooking", "Requires booking"),
    ("requiresEnrollment", "Requires enrollment"),
    ("requiresAttendance", "Requires attendance"),
    ("hasCertificate", "Has certificate"),
    ("hasClassroom", "Has classroom"),
    ("isBookableService", "Bookable service"),
    ("hasAssessment", "Has assessment"),
];

/// Suggested services per product type. Free-form services are accepted.
pub fn services_for(product_type: &str) -> &'static [&'static str] {
    match product_type {
        "Academic Services" => &[
            "PhD Mentoring",
            "PhD Admission and Scholarship",
            "General Mentoring and Pastoral Care",
            "Academic Transition Training",
            "Master's Project Supervision",
            "Thesis Review & Editing",
            "Academic Research Publication Support",
        ],
        "Career Development" => &["CV Revamp", "Interview Preparation", "Career Coaching"],
        "Corporate Consultancy" => &[
            "Business Analysis Training",
            "Professional Consultancy",
            "Leadership and management consultancy",
            "Academic Data Analysis",
            "AI Ethics Consultation",
            "AI Governance Framework",
            "Enterprise AI Governance",
        ],
        _ => &[],
    }
}

const PRODUCTS: &str = "/api/products";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductMetadata {
    pub slug: String,
    pub seo_title: String,
    pub seo_description: String,
    pub page_keywords: Vec<String>,
}

/// Wire body of the product endpoints. Numeric fields are always numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub product_type: String,
    pub service: String,
    pub category: String,
    pub subcategories: Vec<String>,
    pub difficulty_level: String,
    pub target_audience: String,
    pub delivery_mode: String,
    pub session_type: String,
    pub is_recurring: bool,
    pub requires_booking: bool,
    pub requires_enrollment: bool,
    pub requires_attendance: bool,
    pub has_certificate: bool,
    pub has_classroom: bool,
    pub is_bookable_service: bool,
    pub has_assessment: bool,
    pub price: f64,
    pub discount_percentage: f64,
    pub duration_minutes: f64,
    pub program_length: f64,
    pub mode: String,
    pub description: String,
    pub tags: Vec<String>,
    pub thumbnail: String,
    pub enabled: bool,
}

#[derive(Debug, Serialize)]
struct ProductCreateBody<'a> {
    #[serde(flatten)]
    product: &'a ProductPayload,
    metadata: &'a ProductMetadata,
}

impl ProductPayload {
    pub fn from_record(record: &Record) -> Self {
        Self {
            product_type: record.text("productType"),
            service: record.text("service"),
            category: record.text("category"),
            subcategories: record.list("subcategories"),
            difficulty_level: record.text("difficultyLevel"),
            target_audience: record.text("targetAudience"),
            delivery_mode: record.text("deliveryMode"),
            session_type: record.text("sessionType"),
            is_recurring: record.flag("isRecurring"),
            requires_booking: record.flag("requiresBooking"),
            requires_enrollment: record.flag("requiresEnrollment"),
            requires_attendance: record.flag("requiresAttendance"),
            has_certificate: record.flag("hasCertificate"),
            has_classroom: record.flag("hasClassroom"),
            is_bookable_service: record.flag("isBookableService"),
            has_assessment: record.flag("hasAssessment"),
            price: number_or_zero(record, "price"),
            discount_percentage: number_or_zero(record, "discountPercentage"),
            duration_minutes: number_or_zero(record, "durationMinutes"),
            program_length: number_or_zero(record, "programLength"),
            mode: record.text("mode"),
            description: record.text("description"),
            tags: record.list("tags"),
            thumbnail: record.text("thumbnail"),
            enabled: record.flag("enabled"),
        }
    }
}

impl ProductMetadata {
    pub fn from_record(record: &Record) -> Self {
        Self {
            slug: record.text("slug"),
            seo_title: record.text("seoTitle"),
            seo_description: record.text("seoDescription"),
            page_keywords: record.list("pageKeywords"),
        }
    }
}

fn percentage() -> Validator {
    Validator::custom(|value| match value.as_number() {
        Some(number) if (0.0..=100.0).contains(&number) => Ok(()),
        Some(_) => Err("Discount must be between 0 and 100".into()),
        None => Err("Enter a numeric value".into()),
    })
}

fn slug() -> Validator {
    Validator::custom(|value| {
        let text = value.to_string();
        let valid = text
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-');
        if valid && !text.starts_with('-') && !text.ends_with('-') && !text.contains("--") {
            Ok(())
        } else {
            Err("Use lowercase letters, digits and single dashes".into())
        }
    })
}

#[derive(Debug, Clone)]
pub struct ProductFlow {
    descriptor: FormDescriptor,
}

impl ProductFlow {
    pub fn new() -> Result<Self> {
        let basics = StepDefinition::new("Basic Info")
            .field(FieldDescriptor::new(
                "productType",
                "Product type",
                FieldKind::choices(&PRODUCT_TYPES),
                Validator::one_of(&PRODUCT_TYPES),
            ))
            .field(
                FieldDescriptor::new("service", "Service", FieldKind::Text, Validator::NonEmpty)
                    .with_help("Pick a suggested service for the product type or enter your own"),
            )
            .field(FieldDescriptor::new("category", "Category", FieldKind::Text, Validator::NonEmpty))
            .field(
                FieldDescriptor::new("subcategories", "Subcategories", FieldKind::List, Validator::None)
                    .with_optional(),
            )
            .field(
                FieldDescriptor::new(
                    "difficultyLevel",
                    "Difficulty level",
                    FieldKind::choices(&DIFFICULTY_LEVELS),
                    Validator::one_of(&DIFFICULTY_LEVELS),
                )
                .with_optional(),
            )
            .field(
                FieldDescriptor::new("targetAudience", "Target audience", FieldKind::Text, Validator::None)
                    .with_optional(),
            );

        let mut delivery = StepDefinition::new("Delivery & Session")
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
            ));
        for (key, label) in PRODUCT_FLAGS {
            delivery = delivery.field(
                FieldDescriptor::new(key, label, FieldKind::Boolean, Validator::None).with_optional(),
            );
        }

        let pricing = StepDefinition::new("Pricing & Duration")
            .field(FieldDescriptor::new("price", "Price", FieldKind::Number, Validator::PositiveNumber))
            .field(
                FieldDescriptor::new("discountPercentage", "Discount (%)", FieldKind::Number, percentage())
                    .with_optional(),
            )
            .field(
                FieldDescriptor::new(
                    "durationMinutes",
                    "Duration (minutes)",
                    FieldKind::Number,
                    Validator::NonNegativeNumber,
                )
                .with_optional(),
            )
            .field(
                FieldDescriptor::new(
                    "programLength",
                    "Program length",
                    FieldKind::Number,
                    Validator::NonNegativeNumber,
                )
                .with_optional(),
            )
            .field(FieldDescriptor::new("mode", "Mode", FieldKind::Text, Validator::None).with_optional());

        let media = StepDefinition::new("Media & SEO")
            .field(FieldDescriptor::new(
                "description",
                "Description",
                FieldKind::LongText,
                Validator::NonEmpty,
            ))
            .field(FieldDescriptor::new("tags", "Tags", FieldKind::List, Validator::None).with_optional())
            .field(
                FieldDescriptor::new("thumbnail", "Thumbnail URL", FieldKind::Text, Validator::Url)
                    .with_optional(),
            )
            .field(
                FieldDescriptor::new("enabled", "Enabled", FieldKind::Boolean, Validator::None)
                    .with_optional(),
            )
            .field(FieldDescriptor::new("slug", "Slug", FieldKind::Text, slug()).with_optional())
            .field(
                FieldDescriptor::new("seoTitle", "SEO title", FieldKind::Text, Validator::MaxLength(60))
                    .with_optional(),
            )
            .field(
                FieldDescriptor::new(
                    "seoDescription",
                    "SEO description",
                    FieldKind::LongText,
                    Validator::MaxLength(160),
                )
                .with_optional(),
            )
            .field(
                FieldDescriptor::new("pageKeywords", "Page keywords", FieldKind::List, Validator::None)
                    .with_optional(),
            );

        let review = StepDefinition::new("Review & Submit");

        let steps = StepList::new(vec![basics, delivery, pricing, media, review])?;
        Ok(Self {
            descriptor: FormDescriptor::new(FormKind::Product, FormKind::Product.label(), steps),
        })
    }
}

impl FormFlow for ProductFlow {
    fn descriptor(&self) -> &FormDescriptor {
        &self.descriptor
    }

    fn defaults(&self) -> Record {
        let mut record = Record::new()
            .with("productType", "")
            .with("service", "")
            .with("category", "")
            .with("subcategories", Value::List(Vec::new()))
            .with("difficultyLevel", "Beginner")
            .with("targetAudience", "")
            .with("deliveryMode", "online")
            .with("sessionType", "one-one")
            .with("price", "")
            .with("discountPercentage", 0)
            .with("durationMinutes", 60)
            .with("programLength", 0)
            .with("mode", "")
            .with("description", "")
            .with("tags", Value::List(Vec::new()))
            .with("thumbnail", "")
            .with("enabled", true)
            .with("slug", "")
            .with("seoTitle", "")
            .with("seoDescription", "")
            .with("pageKeywords", Value::List(Vec::new()));
        for (key, _) in PRODUCT_FLAGS {
            record.insert(key, false);
        }
        record
    }

    /// Create embeds the SEO metadata; update patches the product and then
    /// its metadata sub-resource.
    fn commit(&self, record: &Record, target: &SubmitTarget) -> Result<Vec<PlannedWrite>> {
        let product = ProductPayload::from_record(record);
        let metadata = ProductMetadata::from_record(record);
        match target {
            SubmitTarget::Create => {
                let body = ProductCreateBody {
                    product: &product,
                    metadata: &metadata,
                };
                Ok(vec![PlannedWrite::new(HttpMethod::Post, PRODUCTS, &body)?])
            }
            SubmitTarget::Update { id } => Ok(vec![
                PlannedWrite::new(HttpMethod::Patch, format!("{}/{}", PRODUCTS, id), &product)?,
                PlannedWrite::new(
                    HttpMethod::Patch,
                    format!("{}/{}/metadata", PRODUCTS, id),
                    &metadata,
                )?,
            ]),
        }
    }

    fn fetch_path(&self, id: &str) -> Option<String> {
        Some(format!("{}/{}", PRODUCTS, id))
    }

    /// Lifts the product out of its wrapper and flattens stored metadata.
    fn hydrate(&self, entity: Record) -> Record {
        let mut record = unwrap_entity(entity, "product");
        if let Some(Value::Nested(metadata)) = record.remove("metadata") {
            for key in ["slug", "seoTitle", "seoDescription", "pageKeywords"] {
                if let Some(value) = metadata.get(key) {
                    record.insert(key, value.clone());
                }
            }
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filled() -> Record {
        ProductFlow::new()
            .unwrap()
            .defaults()
            .with("productType", "Career Development")
            .with("service", "Career Coaching")
            .with("category", "Coaching")
            .with("price", "149.99")
            .with("description", "One-to-one coaching")
            .with("slug", "career-coaching")
            .with("pageKeywords", vec!["career", "coaching"])
    }

    #[test]
    fn five_steps_in_wizard_order() {
        let flow = ProductFlow::new().unwrap();
        assert_eq!(
            flow.descriptor().steps.names(),
            vec![
                "Basic Info",
                "Delivery & Session",
                "Pricing & Duration",
                "Media & SEO",
                "Review & Submit"
            ]
        );
    }

    #[test]
    fn price_is_required_and_discount_bounded() {
        let flow = ProductFlow::new().unwrap();
        let pricing = &flow.descriptor().steps[2];
        let errors = pricing.validate(&flow.defaults());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "price");

        let record = filled().with("discountPercentage", 120);
        let errors = pricing.validate(&record);
        assert_eq!(errors[0].field, "discountPercentage");
    }

    #[test]
    fn overflowing_price_is_rejected_and_kept_as_typed() {
        let flow = ProductFlow::new().unwrap();
        for raw in ["1e400", "inf", "NaN"] {
            let record = filled().with("price", FieldKind::Number.parse(raw));
            let errors = flow.descriptor().steps[2].validate(&record);
            assert_eq!(errors.len(), 1, "{}", raw);
            assert_eq!(errors[0].field, "price");

            let stored = Record::from_json(record.to_json()).unwrap();
            assert_eq!(stored, record);
        }
    }

    #[test]
    fn bad_slug_is_reported() {
        let flow = ProductFlow::new().unwrap();
        let record = filled().with("slug", "Career Coaching");
        let errors = flow.descriptor().steps[3].validate(&record);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "slug");
    }

    #[test]
    fn create_sanitizes_numbers_and_embeds_metadata() {
        let flow = ProductFlow::new().unwrap();
        let record = filled().with("programLength", "");
        let writes = flow.commit(&record, &SubmitTarget::Create).unwrap();
        assert_eq!(writes.len(), 1);
        let body = &writes[0].body;
        assert_eq!(body["price"], json!(149.99));
        assert_eq!(body["programLength"], json!(0.0));
        assert_eq!(body["metadata"]["slug"], json!("career-coaching"));
        assert_eq!(body["metadata"]["pageKeywords"], json!(["career", "coaching"]));
    }

    #[test]
    fn update_patches_product_then_metadata() {
        let flow = ProductFlow::new().unwrap();
        let target = SubmitTarget::Update { id: "p1".into() };
        let writes = flow.commit(&filled(), &target).unwrap();
        let paths: Vec<_> = writes.iter().map(|write| write.path.as_str()).collect();
        assert_eq!(paths, vec!["/api/products/p1", "/api/products/p1/metadata"]);
        assert!(writes.iter().all(|write| write.method == HttpMethod::Patch));
        assert_eq!(writes[1].body["seoTitle"], json!(""));
        assert!(writes[0].body.get("metadata").is_none());
    }

    #[test]
    fn hydrate_unwraps_product_and_flattens_metadata() {
        let flow = ProductFlow::new().unwrap();
        let entity = Record::from_json(json!({
            "product": {
                "service": "CV Revamp",
                "metadata": { "slug": "cv-revamp", "seoTitle": "CV" }
            }
        }))
        .unwrap();
        let record = flow.hydrate(entity);
        assert_eq!(record.text("service"), "CV Revamp");
        assert_eq!(record.text("slug"), "cv-revamp");
        assert!(!record.contains("metadata"));
    }

    #[test]
    fn services_follow_product_type() {
        assert!(services_for("Career Development").contains(&"Interview Preparation"));
        assert!(services_for("Unknown").is_empty());
    }
}
