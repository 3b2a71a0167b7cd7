//! Role resolution for the profile page and the dashboard sidebar.
//!
//! Every component that needs a role-dependent label, colour, link or edit form
//! asks [`resolve`] instead of matching on role strings itself. Resolution is
//! pure: the same input always yields the same [`RoleResolution`].

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::Serialize;
use strsim::levenshtein;

use crate::forms::kinds::FormKind;
use crate::record::Record;

const SUGGESTION_DISTANCE: usize = 3;

/// Closed set of roles the profile surface renders. Any other role string,
/// `student` and `recruiter` included, resolves as unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Admin,
    Moderator,
    Instructor,
    CustomerRepresentative,
}

impl Role {
    pub fn all() -> [Role; 4] {
        [
            Role::Admin,
            Role::Moderator,
            Role::Instructor,
            Role::CustomerRepresentative,
        ]
    }

    /// Wire spelling used by the API.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Moderator => "moderator",
            Role::Instructor => "instructor",
            Role::CustomerRepresentative => "customerRepresentative",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sidebar link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub label: &'static str,
    pub icon: &'static str,
    pub href: &'static str,
}

/// Titled group of sidebar links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavSection {
    pub title: &'static str,
    pub items: Vec<NavItem>,
}

/// Role-keyed dashboard sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    pub display_name: &'static str,
    pub sections: Vec<NavSection>,
}

impl Navigation {
    /// Every link, in sidebar order.
    pub fn items(&self) -> impl Iterator<Item = &NavItem> {
        self.sections.iter().flat_map(|section| section.items.iter())
    }
}

/// What the dashboard renders for a role: the profile page and the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub role: Role,
    pub display_name: &'static str,
    pub description: &'static str,
    pub profile_title: &'static str,
    pub badge_color: &'static str,
    pub icon: &'static str,
    pub profile_cards: Vec<&'static str>,
    pub edit_form: FormKind,
    pub navigation: Navigation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsupportedRole {
    pub raw: String,
    pub normalized: String,
    pub suggestion: Option<Role>,
}

impl fmt::Display for UnsupportedRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unsupported role \"{}\" (normalized: \"{}\")",
            self.raw, self.normalized
        )?;
        if let Some(role) = self.suggestion {
            write!(f, "; did you mean `{}`?", role)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum RoleResolution {
    Supported(Capabilities),
    Unsupported(UnsupportedRole),
}

impl RoleResolution {
    pub fn capabilities(&self) -> Option<&Capabilities> {
        match self {
            RoleResolution::Supported(capabilities) => Some(capabilities),
            RoleResolution::Unsupported(_) => None,
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, RoleResolution::Supported(_))
    }
}

const PROFILE_CARDS: [&str; 5] = [
    "Account Information",
    "Personal Information",
    "System Permissions",
    "Departments",
    "Assigned Regions",
];

fn section(title: &'static str, items: &[(&'static str, &'static str, &'static str)]) -> NavSection {
    NavSection {
        title,
        items: items
            .iter()
            .map(|&(label, icon, href)| NavItem { label, icon, href })
            .collect(),
    }
}

fn navigation(role: Role) -> Navigation {
    let notifications = |icon: &'static str| {
        section("System", &[("Notifications", icon, "/dashboard/notifications")])
    };
    match role {
        Role::Admin => Navigation {
            display_name: "Admin Dashboard",
            sections: vec![
                section(
                    "Management",
                    &[
                        ("Dashboard", "layout-dashboard", "/dashboard/admin"),
                        ("User Management", "users", "/dashboard/users"),
                        ("Products Management", "package", "/dashboard/products"),
                        ("Course Management", "book-open", "/dashboard/courses-management"),
                        ("Job Management", "briefcase", "/dashboard/jobs-management"),
                        ("Staffs Management", "users", "/dashboard/staffs"),
                        ("Companies", "building-2", "/dashboard/companies"),
                        ("Services Management", "layers", "/dashboard/services"),
                        ("Career Connect", "users", "/dashboard/career-connect"),
                        ("Academic Services", "award", "/dashboard/academic-services"),
                        ("Bookings", "calendar", "/dashboard/booked-services"),
                        ("Onboarding", "clipboard-list", "/dashboard/onboarding"),
                    ],
                ),
                section(
                    "Profiles & CVs",
                    &[
                        ("CVs / Profiles", "file-text", "/dashboard/cvs"),
                        ("CV Builder", "file-text", "/dashboard/cv-builder"),
                    ],
                ),
                section(
                    "Commerce",
                    &[
                        ("Orders", "shopping-cart", "/dashboard/orders"),
                        ("Payments", "shopping-cart", "/dashboard/payments"),
                        ("Promo Codes", "tag", "/dashboard/promo-codes"),
                    ],
                ),
                section(
                    "Resources & Support",
                    &[
                        ("Resources", "layers", "/dashboard/resources"),
                        ("Feedback / Support", "message-circle", "/dashboard/feedback"),
                    ],
                ),
                section(
                    "System",
                    &[
                        ("Notifications", "settings", "/dashboard/notifications"),
                        ("Site Settings", "settings", "/dashboard/settings"),
                        ("FAQ Management", "help-circle", "/dashboard/faqs"),
                    ],
                ),
            ],
        },
        Role::Instructor => Navigation {
            display_name: "Instructor Dashboard",
            sections: vec![
                section(
                    "Course Management",
                    &[
                        ("Dashboard", "layout-dashboard", "/dashboard/instructor"),
                        ("My Courses", "book-open", "/dashboard/courses"),
                        ("Create Course", "clipboard-list", "/dashboard/create-course"),
                        ("Lesson Videos", "video", "/dashboard/videos"),
                    ],
                ),
                section(
                    "Student Engagement",
                    &[
                        ("Enrolled Students", "users", "/dashboard/students"),
                        ("Assignments / Grading", "file-text", "/dashboard/assignments"),
                        ("Live Sessions", "calendar", "/dashboard/live-sessions"),
                    ],
                ),
                section(
                    "Reports & Insights",
                    &[
                        ("Course Performance", "bar-chart-3", "/dashboard/performance"),
                        ("Feedback", "message-circle", "/dashboard/feedback"),
                    ],
                ),
                notifications("user"),
            ],
        },
        Role::CustomerRepresentative => Navigation {
            display_name: "Customer Representative Dashboard",
            sections: vec![
                section(
                    "Support Center",
                    &[
                        ("Dashboard", "layout-dashboard", "/dashboard/customerRepresentative"),
                        ("User Queries", "message-circle", "/dashboard/queries"),
                        ("Products Management", "package", "/dashboard/products"),
                        ("Live Chat", "message-circle", "/dashboard/live-chat"),
                        ("Support Tickets", "clipboard-list", "/dashboard/tickets"),
                    ],
                ),
                section(
                    "User Management",
                    &[
                        ("View Users", "users", "/dashboard/users"),
                        ("User Feedback", "message-circle", "/dashboard/feedback"),
                    ],
                ),
                notifications("user"),
            ],
        },
        Role::Moderator => Navigation {
            display_name: "Moderator Dashboard",
            sections: vec![
                section(
                    "Content Moderation",
                    &[
                        ("Dashboard", "layout-dashboard", "/dashboard/moderator"),
                        ("Review Submissions", "clipboard-list", "/dashboard/reviews"),
                        ("Reported Content", "shield-check", "/dashboard/reports"),
                    ],
                ),
                section(
                    "Community",
                    &[
                        ("Discussions", "message-circle", "/dashboard/discussions"),
                        ("User Behavior", "users", "/dashboard/user-behavior"),
                    ],
                ),
                notifications("user"),
            ],
        },
    }
}

fn capabilities(role: Role) -> Capabilities {
    let (display_name, description, profile_title, badge_color, icon) = match role {
        Role::Admin => (
            "Administrator",
            "Full system access and user management",
            "System Administrator Profile",
            "red",
            "shield",
        ),
        Role::Moderator => (
            "Moderator",
            "Content moderation and user management",
            "Moderator Profile",
            "yellow",
            "shield",
        ),
        Role::Instructor => (
            "Instructor",
            "Course management and student support",
            "Instructor Profile",
            "blue",
            "graduation-cap",
        ),
        Role::CustomerRepresentative => (
            "Customer Representative",
            "Customer support and inquiry handling",
            "Customer Representative Profile",
            "green",
            "users",
        ),
    };
    Capabilities {
        role,
        display_name,
        description,
        profile_title,
        badge_color,
        icon,
        profile_cards: PROFILE_CARDS.to_vec(),
        edit_form: FormKind::ProfileEdit,
        navigation: navigation(role),
    }
}

static ROLE_TABLE: Lazy<BTreeMap<String, Capabilities>> = Lazy::new(|| {
    Role::all()
        .into_iter()
        .map(|role| (normalize_role(role.as_str()), capabilities(role)))
        .collect()
});

/// Case-folds and strips separators: `Customer_Representative`,
/// `customer-representative` and `customerRepresentative` all normalize to
/// `customerrepresentative`.
pub fn normalize_role(raw: &str) -> String {
    raw.chars()
        .filter(|ch| !matches!(ch, '_' | '-' | ' ' | '.'))
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn resolve(raw: &str) -> RoleResolution {
    let normalized = normalize_role(raw.trim());
    if let Some(capabilities) = ROLE_TABLE.get(&normalized) {
        return RoleResolution::Supported(capabilities.clone());
    }
    let suggestion = ROLE_TABLE
        .iter()
        .map(|(key, capabilities)| (levenshtein(key, &normalized), capabilities.role))
        .min_by_key(|(distance, _)| *distance)
        .filter(|(distance, _)| !normalized.is_empty() && *distance <= SUGGESTION_DISTANCE)
        .map(|(_, role)| role);
    RoleResolution::Unsupported(UnsupportedRole {
        raw: raw.to_string(),
        normalized,
        suggestion,
    })
}

/// Role string of a fetched user entity: `role`, then `profile.role`, then
/// `data.role`. Blank values fall through.
pub fn role_of(entity: &Record) -> Option<String> {
    let direct = Some(entity.text("role"));
    let profile = entity.nested("profile").map(|profile| profile.text("role"));
    let data = entity.nested("data").map(|data| data.text("role"));
    [direct, profile, data]
        .into_iter()
        .flatten()
        .find(|role| !role.is_empty())
}

/// Resolves the role of a fetched user entity. A missing role resolves as
/// an unsupported empty role.
pub fn resolve_entity(entity: &Record) -> RoleResolution {
    resolve(&role_of(entity).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_and_separators_do_not_matter() {
        let expected = resolve("admin");
        assert_eq!(resolve("Admin"), expected);
        assert_eq!(resolve("ADMIN"), expected);
        assert_eq!(
            resolve("customer_representative"),
            resolve("customerRepresentative")
        );
    }

    #[test]
    fn every_role_resolves_to_itself() {
        for role in Role::all() {
            let resolution = resolve(role.as_str());
            assert_eq!(resolution.capabilities().map(|caps| caps.role), Some(role));
        }
    }

    #[test]
    fn every_role_edits_the_profile_with_its_own_badge() {
        let caps = resolve("moderator").capabilities().cloned().unwrap();
        assert_eq!(caps.edit_form, FormKind::ProfileEdit);
        assert_eq!(caps.badge_color, "yellow");
        assert_eq!(caps.profile_cards[0], "Account Information");
    }

    #[test]
    fn roles_outside_the_profile_surface_are_unsupported() {
        for raw in ["student", "recruiter", "individualTechProfessional", "teamTechProfessional"] {
            let resolution = resolve(raw);
            assert!(!resolution.is_supported(), "{} resolved", raw);
        }
        let RoleResolution::Unsupported(student) = resolve("student") else {
            panic!("expected an unsupported role");
        };
        assert_eq!(student.suggestion, None);
    }

    #[test]
    fn sidebar_follows_the_role() {
        let admin = resolve("admin").capabilities().cloned().unwrap().navigation;
        assert_eq!(admin.display_name, "Admin Dashboard");
        let titles: Vec<&str> = admin.sections.iter().map(|section| section.title).collect();
        assert_eq!(
            titles,
            vec!["Management", "Profiles & CVs", "Commerce", "Resources & Support", "System"]
        );
        assert!(admin
            .items()
            .any(|item| item.href == "/dashboard/jobs-management" && item.label == "Job Management"));

        let rep = resolve("customer_representative").capabilities().cloned().unwrap();
        assert_eq!(rep.navigation.display_name, "Customer Representative Dashboard");
        assert_eq!(
            rep.navigation.items().next().map(|item| item.href),
            Some("/dashboard/customerRepresentative")
        );
    }

    #[test]
    fn every_sidebar_starts_with_its_dashboard_and_ends_with_notifications() {
        for role in Role::all() {
            let navigation = navigation(role);
            let first = navigation.items().next().unwrap();
            assert_eq!(first.label, "Dashboard");
            assert_eq!(first.icon, "layout-dashboard");
            let system = navigation.sections.last().unwrap();
            assert_eq!(system.title, "System");
            assert_eq!(system.items[0].href, "/dashboard/notifications");
        }
    }

    #[test]
    fn unknown_role_is_reported_with_suggestion() {
        let RoleResolution::Unsupported(unsupported) = resolve("Moderater") else {
            panic!("expected an unsupported role");
        };
        assert_eq!(unsupported.raw, "Moderater");
        assert_eq!(unsupported.normalized, "moderater");
        assert_eq!(unsupported.suggestion, Some(Role::Moderator));
        assert!(unsupported.to_string().contains("did you mean `moderator`"));

        let RoleResolution::Unsupported(far) = resolve("superuser") else {
            panic!("expected an unsupported role");
        };
        assert_eq!(far.suggestion, None);
    }

    #[test]
    fn entity_role_follows_fallback_chain() {
        let nested = Record::new().with("profile", Record::new().with("role", "instructor"));
        assert_eq!(role_of(&nested).as_deref(), Some("instructor"));

        let data = Record::new()
            .with("role", "")
            .with("data", Record::new().with("role", "moderator"));
        assert_eq!(role_of(&data).as_deref(), Some("moderator"));

        let top = Record::new()
            .with("role", "admin")
            .with("profile", Record::new().with("role", "instructor"));
        assert_eq!(role_of(&top).as_deref(), Some("admin"));

        assert!(!resolve_entity(&Record::new()).is_supported());
    }
}
