use axum::{extract::{Path, Query, State}, http::StatusCode, routing::get, Json, Router};
use docsearch_core::{DocId, EngineStatus, LoadError, QueryEngine, SearchOptions};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
    pub limit: Option<usize>,
    pub include_full_content: Option<bool>,
    pub max_content_length: Option<usize>,
}

impl SearchParams {
    fn options(&self) -> SearchOptions {
        let defaults = SearchOptions::default();
        SearchOptions {
            limit: self.limit.unwrap_or(defaults.limit),
            include_full_content: self.include_full_content.unwrap_or(defaults.include_full_content),
            max_content_length: self.max_content_length.unwrap_or(defaults.max_content_length),
        }
    }
}

/// Envelope for every tool-style response: either `data` or `error` is set.
#[derive(Serialize)]
pub struct ToolResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ToolResponse<T> {
    fn ok(data: T) -> Self { Self { success: true, data: Some(data), error: None } }
    fn err(error: impl ToString) -> Self { Self { success: false, data: None, error: Some(error.to_string()) } }
}

type Reply<T> = (StatusCode, Json<ToolResponse<T>>);

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<QueryEngine>,
}

pub fn build_app(engine: Arc<QueryEngine>) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/status", get(status_handler))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .with_state(AppState { engine })
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn load_failure<T>(err: LoadError) -> Reply<T> {
    // A missing index is an operator problem; a broken one is a server fault.
    let status = if err.is_missing() { StatusCode::SERVICE_UNAVAILABLE } else { StatusCode::INTERNAL_SERVER_ERROR };
    (status, Json(ToolResponse::err(err)))
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Reply<docsearch_core::SearchResponse> {
    let opts = params.options();
    let engine = Arc::clone(&state.engine);
    // The first query may build the whole index.
    let outcome = tokio::task::spawn_blocking(move || engine.search(&params.query, &opts)).await;
    match outcome {
        Ok(Ok(resp)) => (StatusCode::OK, Json(ToolResponse::ok(resp))),
        Ok(Err(err)) => load_failure(err),
        Err(join_err) => {
            tracing::error!(error = %join_err, "search task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ToolResponse::err("Unknown error occurred during search")))
        }
    }
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<DocId>) -> Reply<docsearch_core::StoredDoc> {
    let engine = Arc::clone(&state.engine);
    match tokio::task::spawn_blocking(move || engine.document(doc_id)).await {
        Ok(Ok(Some(doc))) => (StatusCode::OK, Json(ToolResponse::ok(doc))),
        Ok(Ok(None)) => (StatusCode::NOT_FOUND, Json(ToolResponse::err("not found"))),
        Ok(Err(err)) => load_failure(err),
        Err(join_err) => (StatusCode::INTERNAL_SERVER_ERROR, Json(ToolResponse::err(join_err))),
    }
}

#[derive(Serialize)]
pub struct StatusBody {
    pub status: EngineStatus,
}

pub async fn status_handler(State(state): State<AppState>) -> Json<StatusBody> {
    Json(StatusBody { status: state.engine.status() })
}
