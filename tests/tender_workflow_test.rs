use chrono::{TimeZone, Utc};
use httpmock::prelude::*;
use httpmock::Method::PATCH;
use serde_json::json;
use std::time::Duration;
use tender_desk::core::access::{require_access, PinVerifier};
use tender_desk::core::dashboard::{self, ViewState};
use tender_desk::core::documents::Document;
use tender_desk::core::tenders::{TenderForm, TenderService};
use tender_desk::domain::ports::AccessVerifier;
use tender_desk::{FixedClock, PortalError, RestStore};

fn store_for(server: &MockServer) -> RestStore {
    RestStore::new(&server.base_url(), "anon", Duration::from_secs(5)).unwrap()
}

fn fixed_clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap())
}

fn pending_tender_row() -> serde_json::Value {
    json!({
        "id": 7,
        "created_at": "2025-02-20T08:00:00.000Z",
        "date_submitted": "2025-02-20T08:00:00.000Z",
        "name": "Harbour dredging",
        "deadline": "2025-03-02T18:30:00.000Z",
        "quoted_amount": 50000,
        "our_submission_date": null,
        "status": "pending",
        "description": "Dredge berth 4",
        "requirements": "Method statement"
    })
}

#[tokio::test]
async fn test_pin_verification_against_settings_row() {
    let server = MockServer::start_async().await;
    let settings_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rest/v1/app_settings")
                .query_param("key", "eq.access_pin");
            then.status(200)
                .json_body(json!([{"key": "access_pin", "value": "4821"}]));
        })
        .await;

    let verifier = PinVerifier::new(store_for(&server));
    assert!(verifier.verify_access_code("4821").await.unwrap());
    assert!(!verifier.verify_access_code("1111").await.unwrap());
    assert!(matches!(
        require_access(&verifier, "0000").await,
        Err(PortalError::AccessDenied)
    ));

    settings_mock.assert_hits_async(3).await;
}

#[tokio::test]
async fn test_missing_pin_row_denies_access() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/rest/v1/app_settings");
            then.status(200).json_body(json!([]));
        })
        .await;

    let verifier = PinVerifier::new(store_for(&server));
    assert!(!verifier.verify_access_code("4821").await.unwrap());
}

#[tokio::test]
async fn test_unreachable_settings_is_an_error_not_a_fallback() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/rest/v1/app_settings");
            then.status(500).body("database unavailable");
        })
        .await;

    let verifier = PinVerifier::new(store_for(&server));
    let result = verifier.verify_access_code("4821").await;
    assert!(matches!(result, Err(PortalError::StoreError { status: 500, .. })));
}

#[tokio::test]
async fn test_list_and_render_active_tenders() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rest/v1/tenders")
                .query_param("order", "created_at.desc");
            then.status(200).json_body(json!([pending_tender_row()]));
        })
        .await;

    let store = store_for(&server);
    let service = TenderService::new(store.clone(), store, fixed_clock(), "documents");
    let tenders = service.list_tenders().await.unwrap();
    assert_eq!(tenders.len(), 1);

    let state = ViewState {
        tenders,
        ..ViewState::default()
    };
    let now = fixed_clock().0;
    let offset = chrono::FixedOffset::east_opt(0).unwrap();
    let frame = dashboard::render(&state, now, &offset);

    assert!(frame.contains("Harbour dredging"));
    assert!(frame.contains("1d 6h"));
    assert!(frame.contains("$50,000"));
}

#[tokio::test]
async fn test_create_tender_posts_normalised_row() {
    let server = MockServer::start_async().await;
    let insert_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/rest/v1/tenders").json_body(json!({
                "name": "Harbour dredging",
                "description": "Dredge berth 4",
                "requirements": "",
                "deadline": "2025-03-02T18:30:00.000Z",
                "quoted_amount": 50000.0,
                "status": "pending",
                "date_submitted": "2025-03-01T12:00:00.000Z"
            }));
            then.status(201).json_body(json!([pending_tender_row()]));
        })
        .await;

    let store = store_for(&server);
    let service = TenderService::new(store.clone(), store, fixed_clock(), "documents");
    let tender = service
        .create_tender(TenderForm {
            name: "Harbour dredging".to_string(),
            description: "Dredge berth 4".to_string(),
            requirements: String::new(),
            deadline: "2025-03-02 20:30:00+02:00".to_string(),
            quoted_amount: "50000".to_string(),
        })
        .await
        .unwrap();

    insert_mock.assert_async().await;
    assert_eq!(tender.id, 7);
}

#[tokio::test]
async fn test_create_tender_with_invalid_deadline_never_reaches_store() {
    let server = MockServer::start_async().await;
    let insert_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/rest/v1/tenders");
            then.status(201).json_body(json!([pending_tender_row()]));
        })
        .await;

    let store = store_for(&server);
    let service = TenderService::new(store.clone(), store, fixed_clock(), "documents");
    let result = service
        .create_tender(TenderForm {
            name: "Harbour dredging".to_string(),
            description: "Dredge berth 4".to_string(),
            requirements: String::new(),
            deadline: "not-a-date".to_string(),
            quoted_amount: "50000".to_string(),
        })
        .await;

    assert!(matches!(result, Err(PortalError::Deadline(_))));
    insert_mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_complete_tender_uploads_records_and_marks_submitted() {
    let server = MockServer::start_async().await;
    let object_path = "/storage/v1/object/documents/submissions/completed-7-1740830400000.pdf";
    let public_url =
        server.url("/storage/v1/object/public/documents/submissions/completed-7-1740830400000.pdf");

    let upload_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(object_path)
                .header("content-type", "application/pdf")
                .body("%PDF-1.7 bid");
            then.status(200).json_body(json!({"Key": "documents/submissions"}));
        })
        .await;

    let record_body = json!({
        "name": "Harbour dredging",
        "date_submitted": "2025-02-20T08:00:00.000Z",
        "document_url": public_url,
        "document_name": "Bid.PDF",
        "deadline": "2025-03-02T18:30:00.000Z"
    });
    let record_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/rest/v1/submitted_tenders")
                .json_body(record_body.clone());
            let mut stored = record_body.clone();
            stored["id"] = json!(31);
            then.status(201).json_body(json!([stored]));
        })
        .await;

    let mark_mock = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/rest/v1/tenders")
                .query_param("id", "eq.7")
                .json_body(json!({
                    "status": "submitted",
                    "our_submission_date": "2025-03-01T12:00:00.000Z"
                }));
            let mut updated = pending_tender_row();
            updated["status"] = json!("submitted");
            then.status(200).json_body(json!([updated]));
        })
        .await;

    let store = store_for(&server);
    let service = TenderService::new(store.clone(), store, fixed_clock(), "documents");
    let tender = serde_json::from_value(pending_tender_row()).unwrap();
    let submitted = service
        .complete_tender(&tender, Document::new("Bid.PDF", b"%PDF-1.7 bid".to_vec()))
        .await
        .unwrap();

    upload_mock.assert_async().await;
    record_mock.assert_async().await;
    mark_mock.assert_async().await;
    assert_eq!(submitted.id, 31);
    assert_eq!(submitted.document_name, "Bid.PDF");
}

#[tokio::test]
async fn test_failed_status_update_removes_submitted_row() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path_contains("/storage/v1/object/documents/");
            then.status(200).json_body(json!({}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/rest/v1/submitted_tenders");
            then.status(201).json_body(json!([{
                "id": 31,
                "date_submitted": "2025-02-20T08:00:00.000Z",
                "name": "Harbour dredging",
                "deadline": "2025-03-02T18:30:00.000Z",
                "document_url": "https://files/bid.pdf",
                "document_name": "bid.pdf"
            }]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(PATCH).path("/rest/v1/tenders");
            then.status(500).body("update failed");
        })
        .await;
    let rollback_mock = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/rest/v1/submitted_tenders")
                .query_param("id", "eq.31");
            then.status(204);
        })
        .await;

    let store = store_for(&server);
    let service = TenderService::new(store.clone(), store, fixed_clock(), "documents");
    let tender = serde_json::from_value(pending_tender_row()).unwrap();
    let result = service
        .complete_tender(&tender, Document::new("bid.pdf", b"%PDF".to_vec()))
        .await;

    assert!(matches!(result, Err(PortalError::StoreError { status: 500, .. })));
    rollback_mock.assert_async().await;
}

#[tokio::test]
async fn test_complete_tender_rejects_unsupported_document() {
    let server = MockServer::start_async().await;
    let upload_mock = server
        .mock_async(|when, then| {
            when.method(POST).path_contains("/storage/v1/object/");
            then.status(200);
        })
        .await;

    let store = store_for(&server);
    let service = TenderService::new(store.clone(), store, fixed_clock(), "documents");
    let tender = serde_json::from_value(pending_tender_row()).unwrap();
    let result = service
        .complete_tender(&tender, Document::new("pricing.xlsx", vec![1, 2, 3]))
        .await;

    assert!(matches!(result, Err(PortalError::ValidationError { .. })));
    upload_mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_find_unknown_tender_is_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rest/v1/tenders")
                .query_param("id", "eq.99");
            then.status(200).json_body(json!([]));
        })
        .await;

    let store = store_for(&server);
    let service = TenderService::new(store.clone(), store, fixed_clock(), "documents");
    assert!(matches!(
        service.find_tender(99).await,
        Err(PortalError::NotFound { .. })
    ));
}
