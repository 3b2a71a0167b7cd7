use serde::{Deserialize, Serialize};

use crate::api::transport::HttpMethod;
use crate::errors::Result;
use crate::forms::flow::{FormDescriptor, FormFlow, PlannedWrite, SubmitTarget};
use crate::forms::step::{StepDefinition, StepList};
use crate::forms::validation::{FieldDescriptor, FieldKind, Validator};
use crate::record::{Record, Value};

use super::FormKind;

pub const SPECIALIZATIONS: [&str; 11] = [
    "Frontend Development",
    "Backend Development",
    "Full Stack Development",
    "DevOps",
    "Data Science",
    "Machine Learning",
    "Mobile Development",
    "UI/UX Design",
    "Cybersecurity",
    "Cloud Computing",
    "Other",
];
pub const PROGRAMMING_LANGUAGES: [&str; 13] = [
    "JavaScript",
    "Python",
    "Java",
    "C++",
    "C#",
    "TypeScript",
    "Go",
    "Rust",
    "PHP",
    "Ruby",
    "Swift",
    "Kotlin",
    "Other",
];
/// Frameworks followed by tools and platforms, offered as one list.
pub const FRAMEWORKS_AND_TOOLS: [&str; 26] = [
    "React",
    "Vue.js",
    "Angular",
    "Node.js",
    "Express",
    "Django",
    "Flask",
    "Spring Boot",
    "Laravel",
    "Ruby on Rails",
    "Next.js",
    "Nuxt.js",
    "Other Framework",
    "Docker",
    "Kubernetes",
    "AWS",
    "Azure",
    "Google Cloud",
    "Git",
    "Jenkins",
    "Jira",
    "Figma",
    "PostgreSQL",
    "MongoDB",
    "Redis",
    "Other Tool",
];
pub const SOFT_SKILLS: [&str; 10] = [
    "Communication",
    "Leadership",
    "Problem Solving",
    "Teamwork",
    "Time Management",
    "Adaptability",
    "Critical Thinking",
    "Creativity",
    "Emotional Intelligence",
    "Other",
];

// Assumed route; no dashboard page names it.
const ONBOARDING: &str = "/api/onboarding/tech-professional";

/// Wire body of `PATCH /api/onboarding/tech-professional`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechProfessionalOnboardingPayload {
    pub primary_specialization: String,
    pub programming_languages: Vec<String>,
    pub frameworks_and_tools: Vec<String>,
    pub soft_skills: Vec<String>,
    pub preferred_tech_stack: String,
}

impl TechProfessionalOnboardingPayload {
    pub fn from_record(record: &Record) -> Self {
        Self {
            primary_specialization: record.text("primarySpecialization"),
            programming_languages: record.list("programmingLanguages"),
            frameworks_and_tools: record.list("frameworksAndTools"),
            soft_skills: record.list("softSkills"),
            preferred_tech_stack: record.text("preferredTechStack"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TechProfessionalOnboardingFlow {
    descriptor: FormDescriptor,
}

impl TechProfessionalOnboardingFlow {
    pub fn new() -> Result<Self> {
        let multi = |key: &'static str, label: &'static str, options: &[&str]| {
            FieldDescriptor::new(
                key,
                label,
                FieldKind::multi_choices(options),
                Validator::one_of(options),
            )
            .with_optional()
        };
        let skills = StepDefinition::new("Skills & Specialization")
            .field(FieldDescriptor::new(
                "primarySpecialization",
                "Primary specialization",
                FieldKind::choices(&SPECIALIZATIONS),
                Validator::one_of(&SPECIALIZATIONS),
            ))
            .field(multi(
                "programmingLanguages",
                "Programming languages",
                &PROGRAMMING_LANGUAGES,
            ))
            .field(multi(
                "frameworksAndTools",
                "Frameworks & tools",
                &FRAMEWORKS_AND_TOOLS,
            ))
            .field(multi("softSkills", "Soft skills", &SOFT_SKILLS))
            .field(
                FieldDescriptor::new(
                    "preferredTechStack",
                    "Preferred tech stack",
                    FieldKind::LongText,
                    Validator::MaxLength(1000),
                )
                .with_optional(),
            );

        let steps = StepList::new(vec![skills])?;
        Ok(Self {
            descriptor: FormDescriptor::new(
                FormKind::TechProfessionalOnboarding,
                FormKind::TechProfessionalOnboarding.label(),
                steps,
            ),
        })
    }
}

impl FormFlow for TechProfessionalOnboardingFlow {
    fn descriptor(&self) -> &FormDescriptor {
        &self.descriptor
    }

    fn defaults(&self) -> Record {
        Record::new()
            .with("primarySpecialization", "")
            .with("programmingLanguages", Value::List(Vec::new()))
            .with("frameworksAndTools", Value::List(Vec::new()))
            .with("softSkills", Value::List(Vec::new()))
            .with("preferredTechStack", "")
    }

    fn commit(&self, record: &Record, _target: &SubmitTarget) -> Result<Vec<PlannedWrite>> {
        let payload = TechProfessionalOnboardingPayload::from_record(record);
        Ok(vec![PlannedWrite::new(HttpMethod::Patch, ONBOARDING, &payload)?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_the_specialization_is_required() {
        let flow = TechProfessionalOnboardingFlow::new().unwrap();
        let step = &flow.descriptor().steps[0];
        let errors = step.validate(&flow.defaults());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "primarySpecialization");

        let record = flow.defaults().with("primarySpecialization", "backend development");
        assert!(step.validate(&record).is_empty());
    }

    #[test]
    fn picks_must_come_from_the_offered_lists() {
        let flow = TechProfessionalOnboardingFlow::new().unwrap();
        let record = flow
            .defaults()
            .with("primarySpecialization", "DevOps")
            .with("programmingLanguages", vec!["Rust", "Go"])
            .with("frameworksAndTools", vec!["Docker", "Cobol Studio"]);
        let errors = flow.descriptor().steps[0].validate(&record);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "frameworksAndTools");
    }

    #[test]
    fn payload_keeps_every_list() {
        let flow = TechProfessionalOnboardingFlow::new().unwrap();
        let record = flow
            .defaults()
            .with("primarySpecialization", "Data Science")
            .with("programmingLanguages", vec!["Python"])
            .with("softSkills", vec!["Teamwork", "Creativity"]);
        let writes = flow.commit(&record, &SubmitTarget::Create).unwrap();
        assert_eq!(writes[0].method, HttpMethod::Patch);
        assert_eq!(writes[0].path, "/api/onboarding/tech-professional");
        assert_eq!(
            writes[0].body,
            json!({
                "primarySpecialization": "Data Science",
                "programmingLanguages": ["Python"],
                "frameworksAndTools": [],
                "softSkills": ["Teamwork", "Creativity"],
                "preferredTechStack": ""
            })
        );
    }
}
