mod lists;
mod sessions;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use leadscout_workflow::{
    EmailScraper, LeadStore, SearchProvider, SearchSession, WorkflowError,
};

use crate::middleware::{request_id, RequestId};

/// Live search sessions, keyed by the id handed to the client.
///
/// Each session sits behind its own async mutex; handlers take it with
/// `try_lock`, so a session with an operation in flight answers "busy"
/// instead of racing a second fetch against the same continuation token.
pub type Sessions = Arc<Mutex<HashMap<Uuid, Arc<tokio::sync::Mutex<SearchSession>>>>>;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub provider: Arc<dyn SearchProvider>,
    pub scraper: Arc<dyn EmailScraper>,
    pub store: Arc<dyn LeadStore>,
    pub sessions: Sessions,
    pub page_size: usize,
}

impl AppState {
    #[must_use]
    pub fn new(
        pool: PgPool,
        provider: Arc<dyn SearchProvider>,
        scraper: Arc<dyn EmailScraper>,
        store: Arc<dyn LeadStore>,
        page_size: usize,
    ) -> Self {
        Self {
            pool,
            provider,
            scraper,
            store,
            sessions: Arc::new(Mutex::new(HashMap::new())),
            page_size,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" | "session_busy" => StatusCode::CONFLICT,
            "upstream_error" | "scrape_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Maps workflow failures onto wire error codes.
///
/// Every variant gets a distinguishable code so the frontend can render a
/// specific notification rather than a generic failure toast.
pub(super) fn map_workflow_error(request_id: String, error: &WorkflowError) -> ApiError {
    let (code, message) = match error {
        WorkflowError::Validation(_)
        | WorkflowError::UnknownResult { .. }
        | WorkflowError::EmptyListName => ("validation_error", error.to_string()),
        WorkflowError::Fetch { .. } => {
            tracing::error!(error = %error, "search provider failure");
            ("upstream_error", "search provider request failed".to_owned())
        }
        WorkflowError::Scrape { .. } => ("scrape_error", error.to_string()),
        WorkflowError::ListNameConflict { .. } => ("conflict", error.to_string()),
        WorkflowError::ListNotFound { .. } => ("not_found", error.to_string()),
        WorkflowError::Persistence { .. } => {
            tracing::error!(error = %error, "persistence failure");
            ("internal_error", "persistence failure".to_owned())
        }
    };
    ApiError::new(request_id, code, message)
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/sessions", post(sessions::create_session))
        .route(
            "/api/v1/sessions/{session_id}",
            axum::routing::delete(sessions::delete_session),
        )
        .route(
            "/api/v1/sessions/{session_id}/search",
            post(sessions::search),
        )
        .route(
            "/api/v1/sessions/{session_id}/load-more",
            post(sessions::load_more),
        )
        .route(
            "/api/v1/sessions/{session_id}/show-more",
            post(sessions::show_more),
        )
        .route(
            "/api/v1/sessions/{session_id}/results",
            get(sessions::results),
        )
        .route(
            "/api/v1/sessions/{session_id}/enrich",
            post(sessions::enrich_one),
        )
        .route(
            "/api/v1/sessions/{session_id}/enrich-all",
            post(sessions::enrich_all),
        )
        .route("/api/v1/sessions/{session_id}/save", post(sessions::save))
        .route("/api/v1/lists", get(lists::list_lists))
        .route(
            "/api/v1/lists/{list_id}",
            get(lists::get_list).delete(lists::delete_list),
        )
        .route("/api/v1/lists/{list_id}/export", get(lists::export_list))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match leadscout_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
