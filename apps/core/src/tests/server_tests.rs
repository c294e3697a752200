//! HTTP Surface Tests
//!
//! Requests go through the full axum app via `tower::ServiceExt::oneshot`;
//! classification is fixed so only the surface and routing are exercised.

use super::{temp_memory, ScriptedLlm};
use crate::actors::messages::AppError;
use crate::actors::traits::DocumentClassifier;
use crate::agents::pdf::tests::make_test_pdf;
use crate::memory::MemoryLogger;
use crate::models::{ClassificationResult, Format, Intent};
use crate::router::AgentRouter;
use crate::server::build_app;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "intake-test-boundary";

/// Labels `{`-prefixed text as JSON and anything else as PDF, always General Enquiry.
struct PrefixClassifier;

#[async_trait]
impl DocumentClassifier for PrefixClassifier {
    async fn try_classify(&self, text: &str) -> Result<ClassificationResult, AppError> {
        let format = if text.trim_start().starts_with('{') {
            Format::Json
        } else {
            Format::Pdf
        };
        Ok(ClassificationResult {
            format,
            intent: Intent::GeneralEnquiry,
        })
    }
}

async fn test_app() -> (Router, MemoryLogger, TempDir) {
    let (memory, dir) = temp_memory().await;
    let router = AgentRouter::new(
        Arc::new(ScriptedLlm::replying("{}")),
        Arc::new(PrefixClassifier),
        memory.clone(),
    );
    (build_app(Arc::new(router), 1024 * 1024), memory, dir)
}

struct Part<'a> {
    name: &'a str,
    file_name: Option<&'a str>,
    content: &'a [u8],
}

fn multipart_request(parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let disposition = match part.file_name {
            Some(file_name) => format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                part.name, file_name
            ),
            None => format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name),
        };
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(part.content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/route")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_and_index() {
    let (app, _memory, _dir) = test_app().await;

    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let page = String::from_utf8_lossy(&body);
    assert!(page.contains("<form id=\"intake\""));
    assert!(page.contains("Recent Processing Log"));
    assert!(page.contains("/api/logs?limit=10"));
}

#[tokio::test]
async fn test_json_file_upload_is_routed() {
    let (app, memory, _dir) = test_app().await;

    let request = multipart_request(&[Part {
        name: "file",
        file_name: Some("order.json"),
        content: br#"{"order": 7}"#,
    }]);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["source"], json!("order.json"));
    assert_eq!(body["format"], json!("JSON"));
    assert_eq!(body["result"]["valid"], json!(true));
    assert_eq!(memory.fetch_by_source("order.json", 5).await.len(), 1);
}

#[tokio::test]
async fn test_pdf_upload_routed_as_bytes() {
    let (app, _memory, _dir) = test_app().await;
    let pdf = make_test_pdf("Quarterly regulation update");

    let request = multipart_request(&[Part {
        name: "file",
        file_name: Some("UPDATE.PDF"),
        content: &pdf,
    }]);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["format"], json!("PDF"));
    assert!(body["result"]["raw_text"].is_string());
}

#[tokio::test]
async fn test_pdf_detected_by_content_without_extension() {
    let (app, memory, _dir) = test_app().await;
    let pdf = make_test_pdf("Scanned supplier invoice");

    let request = multipart_request(&[Part {
        name: "file",
        file_name: Some("scan.bin"),
        content: &pdf,
    }]);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["source"], json!("scan.bin"));
    assert_eq!(body["format"], json!("PDF"));
    assert!(body["result"].get("error").is_none(), "got {}", body["result"]);
    assert!(body["result"]["raw_text"].is_string());
    assert_eq!(memory.fetch_by_source("scan.bin", 5).await.len(), 1);
}

#[tokio::test]
async fn test_non_utf8_upload_rejected() {
    let (app, memory, _dir) = test_app().await;

    let request = multipart_request(&[Part {
        name: "file",
        file_name: Some("notes.txt"),
        content: &[0xff, 0xfe, 0x00, 0x81],
    }]);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"], json!("validation_error"));
    assert!(body["message"].as_str().unwrap().starts_with("Unable to decode file"));
    assert!(memory.fetch_all(5).await.is_empty());
}

#[tokio::test]
async fn test_pasted_text_gets_manual_source() {
    let (app, _memory, _dir) = test_app().await;

    let request = multipart_request(&[
        Part {
            name: "file",
            file_name: Some(""),
            content: b"",
        },
        Part {
            name: "text",
            file_name: None,
            content: br#"{"note": "hello"}"#,
        },
    ]);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let source = body["source"].as_str().unwrap();
    assert!(source.starts_with("manual_input_"), "got {}", source);
    assert_eq!(source.len(), "manual_input_YYYYmmdd_HHMMSS".len());
}

#[tokio::test]
async fn test_empty_form_rejected() {
    let (app, _memory, _dir) = test_app().await;

    let request = multipart_request(&[Part {
        name: "text",
        file_name: None,
        content: b"   ",
    }]);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_text_endpoint_stats_and_logs() {
    let (app, _memory, _dir) = test_app().await;

    for source in ["a.json", "b.json"] {
        let request = Request::post("/api/route/text")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"source_name": source, "text": "{\"k\": 1}"}).to_string(),
            ))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(Request::get("/api/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let stats = response_json(response).await;
    assert_eq!(stats["total_entries"], json!(2));
    assert_eq!(stats["format_counts"]["JSON"], json!(2));

    let response = app
        .clone()
        .oneshot(Request::get("/api/stats/all").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let all = response_json(response).await;
    assert_eq!(all["intent_counts"]["General Enquiry"], json!(2));

    let response = app
        .oneshot(
            Request::get("/api/logs?limit=1&source=a.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let logs = response_json(response).await;
    let logs = logs.as_array().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["source"], json!("a.json"));
    assert_eq!(logs[0]["payload"]["result"]["valid"], json!(true));
}
