//! API Integration Tests
//!
//! All tests run against the canned inference backend; no model server or
//! network access is required.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use dossier_api::create_router_for_testing;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Helper to create a JSON request
fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Build a multipart body with one part per (filename, content) pair
fn multipart_request(uri: &str, parts: &[(&str, &str)]) -> Request<Body> {
    let boundary = "dossier-test-boundary";
    let mut body = String::new();

    for (filename, content) in parts {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n{content}\r\n"
        ));
    }
    body.push_str(&format!("--{boundary}--\r\n"));

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["model"], "canned-model");
    assert_eq!(json["supported_formats"][0], "pdf");
}

// =============================================================================
// Single-Text Operation Tests
// =============================================================================

#[tokio::test]
async fn test_summarize() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/summarize",
            json!({"text": "Die ABC GmbH hat 2024 einen Umsatz von 1 Million Euro erzielt."}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert!(json["summary"].as_str().unwrap().contains("ABC GmbH"));
    assert_eq!(json["truncated"], false);
    assert_eq!(json["model"], "canned-model");
}

#[tokio::test]
async fn test_summarize_rejects_empty_text() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(json_request("POST", "/api/summarize", json!({"text": "  "})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = response_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_classify() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/classify",
            json!({"text": "Rechnung Nr. 2024-117 über 12.500 EUR"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["category"], "Rechnung");
}

#[tokio::test]
async fn test_extract_entities() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/extract-entities",
            json!({"text": "Die ABC GmbH zahlte 12.500 EUR."}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["entities"]["firmen"][0], "ABC GmbH");
    assert_eq!(json["entities"]["geldbetraege"][0], "12.500 EUR");
}

#[tokio::test]
async fn test_question_requires_question() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/question",
            json!({"text": "Ein Text.", "question": ""}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Batch Upload Tests
// =============================================================================

#[tokio::test]
async fn test_analyze_batch_returns_report() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(multipart_request(
            "/api/analyze",
            &[
                ("rechnung.txt", "Rechnung der ABC GmbH"),
                ("mail.txt", "E-Mail der ABC GmbH"),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["total_files"], 2);
    assert_eq!(json["processed"], 2);
    assert_eq!(json["failed"], 0);
    assert_eq!(json["model"], "canned-model");
    assert_eq!(json["results"][0]["filename"], "rechnung.txt");
    assert_eq!(json["results"][0]["relevanz"], "hoch");
    assert_eq!(json["results"][0]["analyse"]["kategorie"], "Rechnung");
    // Both canned analyses cite ABC GmbH, so it cross-references
    assert_eq!(json["cross_references"]["firmen"][0]["value"], "abc gmbh");
    assert!(json["overview"].as_str().unwrap().contains("2 Dokumente"));
}

#[tokio::test]
async fn test_analyze_batch_isolates_unsupported_file() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(multipart_request(
            "/api/analyze",
            &[("gut.txt", "Text"), ("schlecht.exe", "MZ")],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = response_json(response).await;
    assert_eq!(json["processed"], 1);
    assert_eq!(json["failed"], 1);
    assert_eq!(json["results"][1]["error_kind"], "unsupported_format");
    assert_eq!(json["results"][1]["success"], false);
}

#[tokio::test]
async fn test_analyze_batch_without_files_is_bad_request() {
    let app = create_router_for_testing();

    let response = app
        .oneshot(multipart_request("/api/analyze", &[]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = response_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}
