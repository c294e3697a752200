use super::page::INDEX_HTML;
use crate::actors::traits::{DocumentClassifier, LlmActor};
use crate::error::AppError;
use crate::models::{RouteResult, StatsReport};
use crate::router::AgentRouter;
use axum::extract::{Multipart, Query, State};
use axum::response::Html;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

type RouterState<L, C> = State<Arc<AgentRouter<L, C>>>;

const DEFAULT_LOG_LIMIT: u32 = 20;
const MAX_LOG_LIMIT: u32 = 100;

/// GET / - the intake form
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /health
pub async fn health() -> &'static str {
    "OK"
}

/// Source name for pasted text, stamped with the local time.
fn manual_source_name() -> String {
    format!("manual_input_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"))
}

fn is_pdf_upload(file_name: &str, bytes: &[u8]) -> bool {
    file_name.to_lowercase().ends_with(".pdf") || infer::archive::is_pdf(bytes)
}

struct Upload {
    file_name: String,
    bytes: Vec<u8>,
}

/// POST /api/route - multipart form with a `file` part, a `text` part, or both
///
/// A non-empty file wins over pasted text.
pub async fn route_upload<L, C>(
    State(router): RouterState<L, C>,
    mut multipart: Multipart,
) -> Result<Json<RouteResult>, AppError>
where
    L: LlmActor,
    C: DocumentClassifier,
{
    let mut upload: Option<Upload> = None;
    let mut pasted: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file: {}", e)))?;
                if !bytes.is_empty() {
                    upload = Some(Upload {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            "text" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read text: {}", e)))?;
                if !text.trim().is_empty() {
                    pasted = Some(text);
                }
            }
            _ => continue,
        }
    }

    let envelope = match (upload, pasted) {
        (Some(upload), _) => {
            info!("Processing upload: {} ({} bytes)", upload.file_name, upload.bytes.len());
            if is_pdf_upload(&upload.file_name, &upload.bytes) {
                router.route(&upload.file_name, Some(upload.bytes.as_slice()), None).await
            } else {
                let text = String::from_utf8(upload.bytes).map_err(|_| {
                    AppError::Validation(
                        "Unable to decode file. Please ensure it's a valid text file.".to_string(),
                    )
                })?;
                router.route(&upload.file_name, None, Some(&text)).await
            }
        }
        (None, Some(text)) => router.route(&manual_source_name(), None, Some(&text)).await,
        (None, None) => {
            return Err(AppError::Validation(
                "Please upload a file or enter text content.".to_string(),
            ))
        }
    };

    Ok(Json(envelope))
}

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub source_name: Option<String>,
    pub text: String,
}

/// POST /api/route/text - `{ "source_name": "...", "text": "..." }`
pub async fn route_text<L, C>(
    State(router): RouterState<L, C>,
    Json(request): Json<TextRequest>,
) -> Json<RouteResult>
where
    L: LlmActor,
    C: DocumentClassifier,
{
    let source = request
        .source_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(manual_source_name);
    Json(router.route(&source, None, Some(&request.text)).await)
}

/// GET /api/stats - counts over the most recent entries
pub async fn router_stats<L, C>(State(router): RouterState<L, C>) -> Json<StatsReport>
where
    L: LlmActor,
    C: DocumentClassifier,
{
    Json(router.get_memory_stats().await)
}

/// GET /api/stats/all - counts over the whole log
pub async fn memory_stats<L, C>(State(router): RouterState<L, C>) -> Json<StatsReport>
where
    L: LlmActor,
    C: DocumentClassifier,
{
    Json(router.memory().get_stats().await)
}

#[derive(Debug, Default, Deserialize)]
pub struct LogQuery {
    pub limit: Option<u32>,
    pub source: Option<String>,
    pub intent: Option<String>,
}

/// A log row with its payload decoded.
#[derive(Debug, Serialize)]
pub struct LogView {
    pub id: String,
    pub source: String,
    pub format: String,
    pub intent: String,
    pub payload: Value,
    pub timestamp: DateTime<Utc>,
}

/// GET /api/logs?limit=&source=&intent= - newest entries first
///
/// `source` takes precedence over `intent` when both are given.
pub async fn recent_logs<L, C>(
    State(router): RouterState<L, C>,
    Query(query): Query<LogQuery>,
) -> Json<Vec<LogView>>
where
    L: LlmActor,
    C: DocumentClassifier,
{
    let limit = query.limit.unwrap_or(DEFAULT_LOG_LIMIT).clamp(1, MAX_LOG_LIMIT);
    let memory = router.memory();
    let entries = match (query.source.as_deref(), query.intent.as_deref()) {
        (Some(source), _) => memory.fetch_by_source(source, limit).await,
        (None, Some(intent)) => memory.fetch_by_intent(intent, limit).await,
        (None, None) => memory.fetch_all(limit).await,
    };

    Json(
        entries
            .into_iter()
            .map(|entry| LogView {
                payload: entry.payload_json(),
                id: entry.id,
                source: entry.source,
                format: entry.format,
                intent: entry.intent,
                timestamp: entry.timestamp,
            })
            .collect(),
    )
}
