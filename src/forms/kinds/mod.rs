//! Concrete dashboard forms. Each kind owns its step list, its initial
//! record and an explicit mapping from record to wire payload.

pub mod academic_service;
pub mod job_posting;
pub mod product;
pub mod profile;
pub mod recruiter_onboarding;
pub mod team_onboarding;
pub mod tech_onboarding;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{FormsError, Result};
use crate::record::Record;

use super::flow::FormFlow;

pub use academic_service::AcademicServiceFlow;
pub use job_posting::JobPostingFlow;
pub use product::ProductFlow;
pub use profile::ProfileEditFlow;
pub use recruiter_onboarding::RecruiterOnboardingFlow;
pub use team_onboarding::TeamTechOnboardingFlow;
pub use tech_onboarding::TechProfessionalOnboardingFlow;

/// Closed set of form kinds known to the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormKind {
    JobPosting,
    Product,
    AcademicService,
    RecruiterOnboarding,
    TechProfessionalOnboarding,
    TeamTechOnboarding,
    ProfileEdit,
}

const ALL_KINDS: [FormKind; 7] = [
    FormKind::JobPosting,
    FormKind::Product,
    FormKind::AcademicService,
    FormKind::RecruiterOnboarding,
    FormKind::TechProfessionalOnboarding,
    FormKind::TeamTechOnboarding,
    FormKind::ProfileEdit,
];

impl FormKind {
    pub fn all() -> &'static [FormKind] {
        &ALL_KINDS
    }

    /// Stable identifier, also used as the remote draft `type` tag.
    pub fn slug(&self) -> &'static str {
        match self {
            FormKind::JobPosting => "job-posting",
            FormKind::Product => "product",
            FormKind::AcademicService => "academic-service",
            FormKind::RecruiterOnboarding => "recruiter-onboarding",
            FormKind::TechProfessionalOnboarding => "tech-professional-onboarding",
            FormKind::TeamTechOnboarding => "team-tech-onboarding",
            FormKind::ProfileEdit => "profile-edit",
        }
    }

    pub fn remote_type(&self) -> &'static str {
        self.slug()
    }

    /// Local storage slot, one per kind.
    pub fn draft_slot(&self) -> &'static str {
        match self {
            FormKind::JobPosting => "jobDraft",
            FormKind::Product => "productDraft",
            FormKind::AcademicService => "academicServiceDraft",
            FormKind::RecruiterOnboarding => "recruiterOnboardingDraft",
            FormKind::TechProfessionalOnboarding => "techProfessionalOnboardingDraft",
            FormKind::TeamTechOnboarding => "teamTechOnboardingDraft",
            FormKind::ProfileEdit => "profileDraft",
        }
    }

    /// Human label used in messages ("Failed to submit job posting").
    pub fn label(&self) -> &'static str {
        match self {
            FormKind::JobPosting => "job posting",
            FormKind::Product => "product",
            FormKind::AcademicService => "academic service",
            FormKind::RecruiterOnboarding => "recruiter onboarding",
            FormKind::TechProfessionalOnboarding => "tech professional onboarding",
            FormKind::TeamTechOnboarding => "team tech onboarding",
            FormKind::ProfileEdit => "profile",
        }
    }

    /// Builds the flow for this kind. Fails only when a step list is
    /// inconsistent.
    pub fn flow(&self) -> Result<Arc<dyn FormFlow>> {
        let flow: Arc<dyn FormFlow> = match self {
            FormKind::JobPosting => Arc::new(JobPostingFlow::new()?),
            FormKind::Product => Arc::new(ProductFlow::new()?),
            FormKind::AcademicService => Arc::new(AcademicServiceFlow::new()?),
            FormKind::RecruiterOnboarding => Arc::new(RecruiterOnboardingFlow::new()?),
            FormKind::TechProfessionalOnboarding => Arc::new(TechProfessionalOnboardingFlow::new()?),
            FormKind::TeamTechOnboarding => Arc::new(TeamTechOnboardingFlow::new()?),
            FormKind::ProfileEdit => Arc::new(ProfileEditFlow::new()?),
        };
        Ok(flow)
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for FormKind {
    type Err = FormsError;

    /// Accepts the slug or the draft slot, case-insensitively.
    fn from_str(input: &str) -> Result<Self> {
        let needle = input.trim().to_lowercase();
        ALL_KINDS
            .iter()
            .copied()
            .find(|kind| kind.slug() == needle || kind.draft_slot().to_lowercase() == needle)
            .ok_or_else(|| FormsError::UnknownFormKind(input.trim().to_string()))
    }
}

/// Numeric field with blanks and garbage read as zero.
pub(crate) fn number_or_zero(record: &Record, field: &str) -> f64 {
    record
        .number(field)
        .filter(|number| number.is_finite())
        .unwrap_or(0.0)
}

/// Fetched entities are sometimes wrapped once more under a resource key
/// (`{ product: {...} }`); returns the inner record when present.
pub(crate) fn unwrap_entity(entity: Record, key: &str) -> Record {
    match entity.nested(key) {
        Some(inner) if !inner.is_empty() => inner.clone(),
        _ => entity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_parse_from_slug_or_slot() {
        assert_eq!("job-posting".parse::<FormKind>().unwrap(), FormKind::JobPosting);
        assert_eq!("jobDraft".parse::<FormKind>().unwrap(), FormKind::JobPosting);
        assert_eq!(" PRODUCT ".parse::<FormKind>().unwrap(), FormKind::Product);
        assert!(matches!(
            "payroll".parse::<FormKind>(),
            Err(FormsError::UnknownFormKind(raw)) if raw == "payroll"
        ));
    }

    #[test]
    fn every_kind_builds_a_flow_of_its_own_kind() {
        for kind in FormKind::all() {
            let flow = kind.flow().unwrap();
            assert_eq!(flow.kind(), *kind);
            assert!(!flow.descriptor().steps.is_empty());
        }
    }

    #[test]
    fn untouched_profile_is_missing_full_name() {
        let flow = FormKind::ProfileEdit.flow().unwrap();
        let errors = flow.descriptor().steps[0].validate(&flow.defaults());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "fullName");
    }

    #[test]
    fn onboarding_kinds_parse_from_slug_or_slot() {
        assert_eq!(
            "tech-professional-onboarding".parse::<FormKind>().unwrap(),
            FormKind::TechProfessionalOnboarding
        );
        assert_eq!(
            "teamTechOnboardingDraft".parse::<FormKind>().unwrap(),
            FormKind::TeamTechOnboarding
        );
    }

    #[test]
    fn serde_uses_slugs() {
        assert_eq!(
            serde_json::to_string(&FormKind::AcademicService).unwrap(),
            "\"academic-service\""
        );
    }

    #[test]
    fn number_or_zero_sanitizes_blank_input() {
        let record = Record::new().with("price", "").with("discount", "12.5");
        assert_eq!(number_or_zero(&record, "price"), 0.0);
        assert_eq!(number_or_zero(&record, "discount"), 12.5);
        assert_eq!(number_or_zero(&record, "missing"), 0.0);
    }
}
