mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::{temp_base, MockRemoteDrafts, MockTransport};
use dashboard_forms::api::{ApiEnvelope, HttpMethod, StaticCredential};
use dashboard_forms::drafts::{
    ApiRemoteDrafts, Draft, DraftKey, DraftPersistence, JsonDraftStore, MemoryDraftStore,
    RemoteDrafts,
};
use dashboard_forms::forms::FormKind;
use dashboard_forms::Record;
use serde_json::json;

fn key() -> DraftKey {
    DraftKey::new("user-1", FormKind::JobPosting)
}

fn persistence(remote: Arc<MockRemoteDrafts>) -> DraftPersistence {
    DraftPersistence::new(Arc::new(MemoryDraftStore::default())).with_remote(remote)
}

#[tokio::test]
async fn remote_copy_wins_over_local() {
    let remote = MockRemoteDrafts::new();
    let drafts = DraftPersistence::new(Arc::new(MemoryDraftStore::default()));
    drafts.save(&key(), &Record::new().with("title", "Local")).unwrap();
    let drafts = drafts.with_remote(remote.clone());
    remote.seed(&key(), Record::new().with("title", "Remote"));

    let loaded = drafts.load(&key()).await.unwrap().unwrap();
    assert_eq!(loaded.text("title"), "Remote");
}

#[tokio::test]
async fn failing_remote_falls_back_to_local() {
    let remote = MockRemoteDrafts::failing();
    let drafts = persistence(remote.clone());

    let handle = drafts.save(&key(), &Record::new().with("title", "Kept")).unwrap();
    handle.unwrap().await.unwrap();
    assert_eq!(remote.saves.load(Ordering::SeqCst), 1);

    let loaded = drafts.load(&key()).await.unwrap().unwrap();
    assert_eq!(loaded.text("title"), "Kept");
}

#[tokio::test]
async fn save_mirrors_and_clear_removes_both_copies() {
    let remote = MockRemoteDrafts::new();
    let drafts = persistence(remote.clone());
    let record = Record::new().with("title", "Engineer");

    drafts.save(&key(), &record).unwrap().unwrap().await.unwrap();
    assert_eq!(remote.stored(&key()), Some(record));

    drafts.clear(&key()).unwrap().unwrap().await.unwrap();
    assert_eq!(remote.stored(&key()), None);
    assert_eq!(remote.clears.load(Ordering::SeqCst), 1);
    assert!(drafts.load(&key()).await.unwrap().is_none());
}

#[test]
fn without_runtime_only_local_write_happens() {
    let remote = MockRemoteDrafts::new();
    let drafts = persistence(remote.clone());

    let handle = drafts.save(&key(), &Record::new().with("title", "Offline")).unwrap();

    assert!(handle.is_none());
    assert_eq!(remote.saves.load(Ordering::SeqCst), 0);
    assert_eq!(
        drafts.load_local(&key()).unwrap().unwrap().payload.text("title"),
        "Offline"
    );
}

#[test]
fn json_drafts_survive_a_new_store_instance() {
    let dir = temp_base().join("drafts");
    let first = DraftPersistence::new(Arc::new(JsonDraftStore::new(&dir).unwrap()));
    let scoped = DraftKey::for_record("user-1", FormKind::Product, "p-9");
    first.save(&key(), &Record::new().with("title", "A")).unwrap();
    first.save(&scoped, &Record::new().with("title", "B")).unwrap();

    let second = DraftPersistence::new(Arc::new(JsonDraftStore::new(&dir).unwrap()));
    let keys: Vec<String> = second
        .list()
        .unwrap()
        .into_iter()
        .map(|draft| draft.owner_key)
        .collect();
    assert_eq!(keys.len(), 2);
    assert!(keys.contains(&"user-1:productDraft:p-9".to_string()));
    assert_eq!(
        second.load_local(&scoped).unwrap().unwrap().payload.text("title"),
        "B"
    );
}

fn api_drafts(transport: &Arc<MockTransport>) -> ApiRemoteDrafts {
    ApiRemoteDrafts::new(transport.clone(), Arc::new(StaticCredential::new("token-123")))
}

#[tokio::test]
async fn api_drafts_post_tagged_body() {
    let transport = MockTransport::new();
    let remote = api_drafts(&transport);
    let draft = Draft::new(key(), Record::new().with("title", "Engineer"));

    remote.save(&draft).await.unwrap();

    let request = &transport.requests()[0];
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(request.path, "/api/drafts");
    assert_eq!(request.bearer.as_deref(), Some("token-123"));
    assert_eq!(
        request.body,
        Some(json!({
            "draftData": { "title": "Engineer" },
            "type": "job-posting",
            "ownerKey": "user-1:jobDraft"
        }))
    );
}

#[tokio::test]
async fn api_drafts_load_unwraps_draft_data_and_treats_404_as_absent() {
    let transport = MockTransport::new();
    transport
        .respond(Ok(ApiEnvelope::new(200).with_data(json!({
            "data": { "draftData": { "title": "Engineer" }, "type": "job-posting" }
        }))))
        .respond(Ok(ApiEnvelope::new(404).with_message("Draft not found")));
    let remote = api_drafts(&transport);

    let loaded = remote.load(&key()).await.unwrap().unwrap();
    assert_eq!(loaded.text("title"), "Engineer");
    assert!(remote.load(&key()).await.unwrap().is_none());

    let request = &transport.requests()[0];
    assert_eq!(request.method, HttpMethod::Get);
    assert!(request
        .query
        .contains(&("ownerKey".to_string(), "user-1:jobDraft".to_string())));
}

#[tokio::test]
async fn api_drafts_clear_reports_server_errors() {
    let transport = MockTransport::new();
    transport.respond(Ok(ApiEnvelope::new(500).with_message("Server error")));
    let remote = api_drafts(&transport);

    let error = remote.clear(&key()).await.unwrap_err();
    assert_eq!(error.message, "Server error");
    assert_eq!(transport.requests()[0].method, HttpMethod::Delete);
}
