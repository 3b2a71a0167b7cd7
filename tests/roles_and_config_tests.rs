mod common;

use common::temp_base;
use dashboard_forms::api::ListQuery;
use dashboard_forms::config::{Config, ConfigManager};
use dashboard_forms::forms::FormKind;
use dashboard_forms::roles::{self, Role, RoleResolution};
use dashboard_forms::Record;

#[test]
fn resolution_is_pure_and_spelling_insensitive() {
    let first = roles::resolve("Customer-Representative");
    let second = roles::resolve("customerRepresentative");
    assert_eq!(first, second);
    assert_eq!(roles::resolve("Admin"), roles::resolve("ADMIN"));

    let caps = first.capabilities().unwrap();
    assert_eq!(caps.role, Role::CustomerRepresentative);
    assert_eq!(caps.edit_form, FormKind::ProfileEdit);
}

#[test]
fn fetched_user_without_known_role_yields_diagnostic() {
    let entity = Record::new().with("profile", Record::new().with("role", "Instrucor"));
    match roles::resolve_entity(&entity) {
        RoleResolution::Unsupported(diagnostic) => {
            assert_eq!(diagnostic.raw, "Instrucor");
            assert_eq!(diagnostic.suggestion, Some(Role::Instructor));
        }
        RoleResolution::Supported(caps) => panic!("unexpected role {}", caps.role),
    }
}

#[test]
fn configuration_drives_draft_scope_and_page_size() {
    let manager = ConfigManager::with_base_dir(temp_base()).unwrap();
    let mut config = manager.load().unwrap();
    assert_eq!(config, Config::default());

    config.owner = "user-9".into();
    config.scope_drafts_by_record = false;
    config.default_page_size = 25;
    manager.save(&config).unwrap();

    let reloaded = manager.load().unwrap();
    let key = reloaded.draft_key(FormKind::Product, Some("p-1"));
    assert_eq!(key.owner_key(), "user-9:productDraft");
    assert_eq!(ListQuery::from_config(&reloaded).limit(), 25);
}

#[test]
fn backups_restore_previous_settings() {
    let manager = ConfigManager::with_base_dir(temp_base()).unwrap();
    let original = Config {
        owner: "ops-team".into(),
        ..Config::default()
    };
    manager.save(&original).unwrap();
    let name = manager.backup(&original, Some("before switch")).unwrap();

    manager
        .save(&Config {
            scope_drafts_by_record: false,
            ..original.clone()
        })
        .unwrap();

    let restored = manager.restore(&name).unwrap();
    assert_eq!(restored, original);
    assert_eq!(manager.load().unwrap(), original);
    assert_eq!(manager.list_backups().unwrap(), vec![name]);
}
