mod common;

use common::{gateway_with_token, gateway_without_token, valid_profile, MockTransport};
use dashboard_forms::api::gateway::AUTH_REQUIRED;
use dashboard_forms::api::{ApiEnvelope, ErrorKind, HttpMethod, ListQuery, TransportError};
use dashboard_forms::forms::{FormKind, SubmitTarget};
use serde_json::json;

#[tokio::test]
async fn missing_credential_fails_without_any_request() {
    let transport = MockTransport::new();
    let gateway = gateway_without_token(&transport);
    let flow = FormKind::ProfileEdit.flow().unwrap();

    let result = gateway
        .submit(flow.as_ref(), &valid_profile(), &SubmitTarget::Create)
        .await;

    assert!(!result.ok);
    assert_eq!(result.error_kind(), Some(ErrorKind::Unauthenticated));
    assert_eq!(result.error.unwrap().message, AUTH_REQUIRED);
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn server_error_message_is_surfaced() {
    let transport = MockTransport::new();
    transport.respond(Ok(ApiEnvelope::new(500).with_message("Server error")));
    let gateway = gateway_with_token(&transport);
    let flow = FormKind::JobPosting.flow().unwrap();

    let result = gateway
        .submit(flow.as_ref(), &flow.defaults(), &SubmitTarget::Create)
        .await;

    assert!(!result.ok);
    let error = result.error.unwrap();
    assert_eq!(error.kind, ErrorKind::Api);
    assert_eq!(error.message, "Server error");
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn rejection_without_message_uses_fallback() {
    let transport = MockTransport::new();
    transport.respond(Ok(ApiEnvelope::new(422).with_message("   ")));
    let gateway = gateway_with_token(&transport);
    let flow = FormKind::ProfileEdit.flow().unwrap();

    let result = gateway
        .submit(flow.as_ref(), &valid_profile(), &SubmitTarget::Create)
        .await;

    let error = result.error.unwrap();
    assert_eq!(error.kind, ErrorKind::Api);
    assert!(error.message.starts_with("Failed to submit"));
}

#[tokio::test]
async fn record_id_is_read_through_double_wrapped_payload() {
    let transport = MockTransport::new();
    transport.respond(Ok(ApiEnvelope::new(201).with_data(json!({
        "data": { "_id": "job-7", "title": "Engineer" }
    }))));
    let gateway = gateway_with_token(&transport);
    let flow = FormKind::JobPosting.flow().unwrap();

    let result = gateway
        .submit(flow.as_ref(), &flow.defaults(), &SubmitTarget::Create)
        .await;

    assert!(result.ok);
    assert_eq!(result.record_id.as_deref(), Some("job-7"));
    let request = &transport.requests()[0];
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(request.path, "/api/ats/job-posts");
    assert_eq!(request.bearer.as_deref(), Some("token-123"));
}

#[tokio::test]
async fn network_failure_is_reported_not_raised() {
    let transport = MockTransport::new();
    transport.respond(Err(TransportError::Timeout));
    let gateway = gateway_with_token(&transport);
    let flow = FormKind::ProfileEdit.flow().unwrap();

    let result = gateway
        .submit(flow.as_ref(), &valid_profile(), &SubmitTarget::Create)
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::Network));
}

#[tokio::test]
async fn multi_write_update_stops_at_first_failure() {
    let transport = MockTransport::new();
    transport.respond(Ok(ApiEnvelope::new(400).with_message("Invalid price")));
    let gateway = gateway_with_token(&transport);
    let flow = FormKind::Product.flow().unwrap();
    let target = SubmitTarget::Update { id: "p-1".into() };

    let result = gateway.submit(flow.as_ref(), &flow.defaults(), &target).await;

    assert_eq!(result.error.unwrap().message, "Invalid price");
    assert_eq!(transport.calls(), 1);
    assert_eq!(transport.requests()[0].path, "/api/products/p-1");
}

#[tokio::test]
async fn successful_update_sends_both_writes_and_keeps_target_id() {
    let transport = MockTransport::new();
    let gateway = gateway_with_token(&transport);
    let flow = FormKind::Product.flow().unwrap();
    let target = SubmitTarget::Update { id: "p-1".into() };

    let result = gateway.submit(flow.as_ref(), &flow.defaults(), &target).await;

    assert!(result.ok);
    assert_eq!(result.record_id.as_deref(), Some("p-1"));
    let paths: Vec<String> = transport.requests().into_iter().map(|request| request.path).collect();
    assert_eq!(paths, vec!["/api/products/p-1", "/api/products/p-1/metadata"]);
}

#[tokio::test]
async fn profile_update_wraps_fields_in_profile_object() {
    let transport = MockTransport::new();
    let gateway = gateway_with_token(&transport);
    let flow = FormKind::ProfileEdit.flow().unwrap();

    gateway
        .submit(flow.as_ref(), &valid_profile(), &SubmitTarget::Create)
        .await;

    let body = transport.requests()[0].body.clone().unwrap();
    assert_eq!(body["profile"]["fullName"], json!("Ada Admin"));
    assert_eq!(body["profile"]["departments"], json!(["Ops"]));
}

#[tokio::test]
async fn fetch_unwraps_entity_payload() {
    let transport = MockTransport::new();
    transport.respond(Ok(ApiEnvelope::new(200).with_data(json!({
        "data": { "fullName": "Grace", "role": "moderator" }
    }))));
    let gateway = gateway_with_token(&transport);

    let record = gateway.fetch("/api/users/me").await.unwrap();
    assert_eq!(record.text("fullName"), "Grace");

    transport.respond(Ok(ApiEnvelope::new(404).with_message("Not found")));
    let error = gateway.fetch("/api/users/me").await.unwrap_err();
    assert_eq!(error.kind, ErrorKind::Api);
    assert_eq!(error.message, "Not found");
}

#[tokio::test]
async fn list_sends_query_pairs_and_reads_items() {
    let transport = MockTransport::new();
    transport.respond(Ok(ApiEnvelope::new(200).with_data(json!({
        "data": { "services": [{ "title": "Tutoring" }, { "title": "Mentoring" }], "total": 12 }
    }))));
    let gateway = gateway_with_token(&transport);
    let query = ListQuery::new(2, 5).with_status("active");

    let page = gateway.list("/api/academic-services", &query).await.unwrap();

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[1].text("title"), "Mentoring");
    assert_eq!(page.page, 2);
    let sent = &transport.requests()[0].query;
    assert!(sent.contains(&("page".to_string(), "2".to_string())));
    assert!(sent.contains(&("status".to_string(), "active".to_string())));
}
