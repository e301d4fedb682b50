use analysis::{AnalysisReport, Analyzer, DocumentMetadata, QueryOptions, QueryResult, SentimentTally};
use axum::{
    Json, Router,
    body::Body,
    extract::{
        Multipart, Query, State,
        multipart::MultipartRejection,
        rejection::{JsonRejection, QueryRejection},
    },
    http::Request,
    routing::{get, post},
};
use extract::EntityMap;
use futures::future::try_join_all;
use ingest::{Document, InputError};
use models::OllamaClient;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, info_span};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::metrics::{Metrics, MetricsSnapshot, Operation, TimedOperation};

/// Name of the multipart field carrying uploaded transcripts.
const FILES_FIELD: &str = "files";

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub backend: OllamaClient,
    pub metrics: Arc<Metrics>,
}

#[derive(Deserialize)]
pub struct TextRequest {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    entity: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct QueryParams {
    entity: Option<String>,
    topic: Option<String>,
    #[serde(default)]
    summarize: bool,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    ollama: String,
}

#[derive(Serialize)]
struct SummaryResponse {
    summary: String,
}

#[derive(Serialize)]
struct EntitiesResponse {
    entities: EntityMap,
}

#[derive(Serialize)]
struct TopicsResponse {
    topics: Vec<String>,
}

#[derive(Serialize)]
struct SentimentResponse {
    sentiment_analysis: SentimentTally,
}

#[derive(Serialize)]
struct MetadataResponse {
    metadata: BTreeMap<String, DocumentMetadata>,
}

#[derive(Serialize)]
struct QueryResponse {
    results: BTreeMap<String, QueryResult>,
}

pub fn router(state: AppState) -> Router {
    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        let request_id = Uuid::new_v4();
        info_span!(
            "request",
            %request_id,
            method = %request.method(),
            uri = %request.uri(),
        )
    });

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(get_metrics))
        .route("/summarize", post(summarize))
        .route("/extract_entities", post(extract_entities))
        .route("/extract_topics", post(extract_topics))
        .route("/analyze_sentiment", post(analyze_sentiment))
        .route("/analyze_minutes", post(analyze_minutes))
        .route("/extract_metadata", post(extract_metadata))
        .route("/query", post(query_documents))
        .layer(trace)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, ollama) = match state.backend.ping().await {
        Ok(()) => ("ok", "ok".to_string()),
        Err(e) => ("degraded", format!("error: {e:#}")),
    };

    Json(HealthResponse { status, ollama })
}

async fn get_metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

async fn summarize(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> ApiResult<Json<SummaryResponse>> {
    let Json(req) = payload.map_err(|e| rejected(&state, e))?;
    let timer = TimedOperation::start();

    let doc = inline_document(req.text).map_err(|e| rejected(&state, e))?;
    let summary = state.analyzer.summarize(&doc).await;
    state.metrics.record_summary(summary.chunks, summary.failed_chunks);

    finish(&state, Operation::Summarize, timer, Ok(SummaryResponse { summary: summary.text }))
}

async fn extract_entities(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> ApiResult<Json<EntitiesResponse>> {
    let Json(req) = payload.map_err(|e| rejected(&state, e))?;
    let timer = TimedOperation::start();

    let doc = inline_document(req.text).map_err(|e| rejected(&state, e))?;
    let result = state
        .analyzer
        .entities(&doc)
        .await
        .map(|entities| EntitiesResponse { entities });

    finish(&state, Operation::Entities, timer, result)
}

async fn extract_topics(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> ApiResult<Json<TopicsResponse>> {
    let Json(req) = payload.map_err(|e| rejected(&state, e))?;
    let timer = TimedOperation::start();

    let doc = inline_document(req.text).map_err(|e| rejected(&state, e))?;
    let topics = state.analyzer.topics(&doc);

    finish(&state, Operation::Topics, timer, Ok(TopicsResponse { topics }))
}

async fn analyze_sentiment(
    State(state): State<AppState>,
    payload: Result<Json<TextRequest>, JsonRejection>,
) -> ApiResult<Json<SentimentResponse>> {
    let Json(req) = payload.map_err(|e| rejected(&state, e))?;
    let timer = TimedOperation::start();

    let doc = inline_document(req.text).map_err(|e| rejected(&state, e))?;
    let result = state
        .analyzer
        .sentiments(&doc)
        .await
        .map(|sentiment_analysis| SentimentResponse { sentiment_analysis });

    finish(&state, Operation::Sentiment, timer, result)
}

async fn analyze_minutes(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> ApiResult<Json<AnalysisReport>> {
    let Json(req) = payload.map_err(|e| rejected(&state, e))?;
    let timer = TimedOperation::start();

    let doc = inline_document(req.text).map_err(|e| rejected(&state, e))?;
    let entity = req.entity.as_deref().filter(|e| !e.is_empty());
    let result = state.analyzer.analyze(&doc, entity).await;

    if let Ok(report) = &result {
        state.metrics.record_documents(1);
        state
            .metrics
            .record_summary(report.summary_chunks, report.summary_failed_chunks);
    }

    finish(&state, Operation::Analyze, timer, result)
}

async fn extract_metadata(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<MetadataResponse>> {
    let docs = read_uploads(multipart).await.map_err(|e| rejected(&state, e))?;
    let timer = TimedOperation::start();
    info!(files = docs.len(), "Extracting metadata");

    let analyzer = &state.analyzer;
    let result = try_join_all(docs.iter().map(|doc| async move {
        let metadata = analyzer.metadata(doc).await?;
        anyhow::Ok((doc.name.clone(), metadata))
    }))
    .await
    .map(|pairs| MetadataResponse {
        metadata: pairs.into_iter().collect(),
    });

    if result.is_ok() {
        state.metrics.record_documents(docs.len());
    }
    finish(&state, Operation::Metadata, timer, result)
}

async fn query_documents(
    State(state): State<AppState>,
    params: Result<Query<QueryParams>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<QueryResponse>> {
    let Query(params) = params.map_err(|e| rejected(&state, e))?;
    let docs = read_uploads(multipart).await.map_err(|e| rejected(&state, e))?;
    let timer = TimedOperation::start();

    let options = QueryOptions {
        entity: params.entity.filter(|e| !e.is_empty()),
        topic: params.topic.filter(|t| !t.is_empty()),
        summarize: params.summarize,
    };

    let analyzer = &state.analyzer;
    let options = &options;
    let result = try_join_all(docs.iter().map(|doc| async move {
        let found = analyzer.query(doc, options).await?;
        anyhow::Ok((doc.name.clone(), found))
    }))
    .await
    .map(|pairs| QueryResponse {
        results: pairs.into_iter().collect(),
    });

    finish(&state, Operation::Query, timer, result)
}

fn inline_document(text: Option<String>) -> Result<Document, InputError> {
    Document::new("inline", text.unwrap_or_default())
}

/// Decode every uploaded file before any analysis starts.
async fn read_uploads(
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Vec<Document>> {
    let mut multipart = multipart?;
    let mut docs = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        let name = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("upload_{}", docs.len()));
        let bytes = field.bytes().await?;
        docs.push(Document::from_bytes(&name, &bytes)?);
    }

    if docs.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "At least one file is required in field '{FILES_FIELD}'"
        )));
    }
    Ok(docs)
}

/// Count a request refused before any analysis ran.
fn rejected(state: &AppState, err: impl Into<ApiError>) -> ApiError {
    state.metrics.record_request(false);
    err.into()
}

fn finish<T>(
    state: &AppState,
    operation: Operation,
    timer: TimedOperation,
    result: anyhow::Result<T>,
) -> ApiResult<Json<T>> {
    state.metrics.record(operation, timer.elapsed());
    state.metrics.record_request(result.is_ok());
    Ok(Json(result?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis::{AnalysisConfig, Collaborators};
    use anyhow::Result;
    use async_trait::async_trait;
    use axum::http::{StatusCode, header};
    use models::{
        EntityTagger, LengthBounds, Sentiment, SentimentClassifier, Summarizer, TaggedEntity,
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    struct NameTagger;

    #[async_trait]
    impl EntityTagger for NameTagger {
        async fn tag(&self, text: &str) -> Result<Vec<TaggedEntity>> {
            if text.contains("explode") {
                anyhow::bail!("tagger crashed");
            }
            Ok(text
                .match_indices("Jane Doe")
                .map(|(start, m)| TaggedEntity {
                    text: m.to_string(),
                    label: "PERSON".to_string(),
                    span: (start, start + m.len()),
                })
                .collect())
        }
    }

    struct PositiveSentiment;

    #[async_trait]
    impl SentimentClassifier for PositiveSentiment {
        async fn classify(&self, _sentence: &str) -> Result<Sentiment> {
            Ok(Sentiment {
                label: "POSITIVE".to_string(),
                confidence: 0.99,
            })
        }
    }

    struct FirstWords;

    #[async_trait]
    impl Summarizer for FirstWords {
        async fn summarize(&self, text: &str, _bounds: LengthBounds) -> Result<String> {
            Ok(text.split_whitespace().take(3).collect::<Vec<_>>().join(" "))
        }
    }

    fn app() -> Router {
        let collaborators = Collaborators {
            tagger: Arc::new(NameTagger),
            sentiment: Arc::new(PositiveSentiment),
            summarizer: Arc::new(FirstWords),
        };
        let analyzer = Analyzer::new(collaborators, &AnalysisConfig::default()).unwrap();

        router(AppState {
            analyzer: Arc::new(analyzer),
            backend: OllamaClient::new("http://127.0.0.1:9".to_string(), "none".to_string()),
            metrics: Metrics::new(),
        })
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    fn multipart_request(uri: &str, files: &[(&str, &[u8])]) -> Request<Body> {
        let boundary = "minutes-boundary";
        let mut body = Vec::new();
        for (name, content) in files {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\nContent-Type: text/plain\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_analyze_minutes() {
        let (status, body) = send(
            app(),
            json_request(
                "/analyze_minutes",
                json!({
                    "text": "Jane Doe opened the budget review. The budget passed.",
                    "entity": "budget"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"], "Jane Doe opened");
        assert_eq!(body["summary_chunks"], 1);
        assert_eq!(body["summary_failed_chunks"], 0);
        assert_eq!(body["entities"]["PERSON"], json!(["Jane Doe"]));
        assert_eq!(body["sentiment_analysis"]["POSITIVE"], 2);
        assert_eq!(body["key_events"][0]["entities"], json!(["Jane Doe"]));
        assert_eq!(body["relevant_contributions"].as_array().unwrap().len(), 2);
        assert_eq!(body["topics"][0], "budget");
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected() {
        let (status, body) = send(app(), json_request("/summarize", json!({ "text": "  " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Meeting text is required");

        let (status, _) = send(app(), json_request("/extract_topics", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_collaborator_failure_is_internal() {
        let (status, body) = send(
            app(),
            json_request("/extract_entities", json!({ "text": "This will explode." })),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["detail"].as_str().unwrap().contains("tagger crashed"));
    }

    #[tokio::test]
    async fn test_single_operations() {
        let text = json!({ "text": "Jane Doe approved the plan. Everyone agreed." });

        let (_, body) = send(app(), json_request("/summarize", text.clone())).await;
        assert_eq!(body["summary"], "Jane Doe approved");

        let (_, body) = send(app(), json_request("/analyze_sentiment", text.clone())).await;
        assert_eq!(body["sentiment_analysis"]["POSITIVE"], 2);

        let (_, body) = send(app(), json_request("/extract_topics", text)).await;
        assert!(body["topics"].as_array().unwrap().len() <= 5);
    }

    #[tokio::test]
    async fn test_metadata_per_file() {
        let request = multipart_request(
            "/extract_metadata",
            &[
                ("a.txt", b"Jane Doe chaired the meeting.".as_slice()),
                ("b.txt", b"The roof repair was funded.".as_slice()),
            ],
        );
        let (status, body) = send(app(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metadata"]["a.txt"]["entities"]["PERSON"], json!(["Jane Doe"]));
        assert!(body["metadata"]["b.txt"]["topics"].is_array());
    }

    #[tokio::test]
    async fn test_undecodable_upload_names_the_file() {
        let request = multipart_request("/extract_metadata", &[("bad.bin", [0xffu8, 0xfe].as_slice())]);
        let (status, body) = send(app(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("bad.bin"));
    }

    #[tokio::test]
    async fn test_query_filters_and_summarizes() {
        let request = multipart_request(
            "/query?entity=Jane%20Doe&summarize=true",
            &[("minutes.txt", b"Jane Doe spoke first. The vote was delayed.".as_slice())],
        );
        let (status, body) = send(app(), request).await;

        assert_eq!(status, StatusCode::OK);
        let result = &body["results"]["minutes.txt"];
        assert_eq!(result["filtered_sentences"], json!(["Jane Doe spoke first."]));
        assert_eq!(result["summary"], "Jane Doe spoke");
    }

    #[tokio::test]
    async fn test_metrics_count_requests() {
        let app = app();
        let _ = send(
            app.clone(),
            json_request("/extract_topics", json!({ "text": "Budget talks." })),
        )
        .await;
        let (_, body) = send(
            app,
            Request::builder().uri("/metrics").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(body["total_requests"], 1);
        assert_eq!(body["successful_requests"], 1);
    }

    #[tokio::test]
    async fn test_metrics_count_rejected_requests() {
        let app = app();
        let (status, _) = send(app.clone(), json_request("/summarize", json!({ "text": "" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let malformed = Request::builder()
            .method("POST")
            .uri("/extract_topics")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.clone().oneshot(malformed).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let request = multipart_request("/extract_metadata", &[("bad.bin", [0xffu8].as_slice())]);
        let (status, _) = send(app.clone(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = send(
            app,
            Request::builder().uri("/metrics").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(body["total_requests"], 3);
        assert_eq!(body["successful_requests"], 0);
        assert_eq!(body["failed_requests"], 3);
    }

    #[tokio::test]
    async fn test_health_reports_unreachable_backend() {
        let (status, body) = send(
            app(),
            Request::builder().uri("/health").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
    }
}
