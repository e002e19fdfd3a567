//! Session-scoped workflow endpoints.
//!
//! A session must be created explicitly; its id then scopes every search,
//! pagination, enrichment, and save call. Handlers acquire the session
//! with `try_lock` — an operation already in flight makes the session
//! answer `session_busy` (409) instead of starting a second fetch that
//! could double-consume a continuation token.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use leadscout_core::{Lead, SearchQuery};
use leadscout_workflow::{EnrichReport, SaveTarget, SearchSession};

use crate::api::{map_workflow_error, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

type SessionHandle = Arc<tokio::sync::Mutex<SearchSession>>;

#[derive(Debug, Serialize)]
pub(super) struct SessionCreatedData {
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchBody {
    pub term: String,
    pub locations: Vec<String>,
    #[serde(default = "default_radius_m")]
    pub radius_m: u32,
    #[serde(default)]
    pub exact_postal: bool,
}

fn default_radius_m() -> u32 {
    5_000
}

#[derive(Debug, Serialize)]
pub(super) struct ResultWindowData {
    /// The currently revealed prefix of the canonical result set.
    pub results: Vec<Lead>,
    /// Size of the full canonical set.
    pub total: usize,
    pub all_shown: bool,
    /// Whether the provider reported further pages.
    pub has_more_pages: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct LoadMoreData {
    pub appended: Vec<Lead>,
    pub total: usize,
    pub has_more_pages: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct EnrichBody {
    pub index: usize,
}

#[derive(Debug, Serialize)]
pub(super) struct EnrichedLeadData {
    pub index: usize,
    pub lead: Lead,
}

#[derive(Debug, Deserialize)]
pub(super) struct SaveBody {
    /// Index of a single result to save; the whole set when absent.
    pub index: Option<usize>,
    pub new_name: Option<String>,
    pub list_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub(super) struct SavedListData {
    pub id: Uuid,
    pub name: String,
    pub item_count: usize,
}

fn window_data(session: &SearchSession) -> ResultWindowData {
    ResultWindowData {
        results: session.visible().to_vec(),
        total: session.results().len(),
        all_shown: session.all_shown(),
        has_more_pages: session.has_more_pages(),
    }
}

fn session_handle(state: &AppState, session_id: Uuid) -> Option<SessionHandle> {
    state
        .sessions
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .get(&session_id)
        .cloned()
}

/// Resolves the session and takes its lock without waiting.
fn acquire(
    state: &AppState,
    session_id: Uuid,
    request_id: &str,
) -> Result<tokio::sync::OwnedMutexGuard<SearchSession>, ApiError> {
    let handle = session_handle(state, session_id).ok_or_else(|| {
        ApiError::new(
            request_id.to_owned(),
            "not_found",
            format!("no session with id {session_id}"),
        )
    })?;
    handle.try_lock_owned().map_err(|_| {
        ApiError::new(
            request_id.to_owned(),
            "session_busy",
            "another operation is in flight for this session",
        )
    })
}

pub(super) async fn create_session(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let session_id = Uuid::new_v4();
    state
        .sessions
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .insert(
            session_id,
            Arc::new(tokio::sync::Mutex::new(SearchSession::new(state.page_size))),
        );
    tracing::info!(%session_id, "created search session");

    Json(ApiResponse {
        data: SessionCreatedData { session_id },
        meta: ResponseMeta::new(req_id.0),
    })
}

pub(super) async fn delete_session(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let removed = state
        .sessions
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .remove(&session_id);
    if removed.is_none() {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("no session with id {session_id}"),
        ));
    }
    Ok(Json(ApiResponse {
        data: serde_json::json!({"deleted": true}),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(session_id): Path<Uuid>,
    Json(body): Json<SearchBody>,
) -> Result<Json<ApiResponse<ResultWindowData>>, ApiError> {
    let query = SearchQuery::build(&body.term, &body.locations, body.radius_m, body.exact_postal)
        .map_err(|e| map_workflow_error(req_id.0.clone(), &e.into()))?;

    let mut session = acquire(&state, session_id, &req_id.0)?;
    session
        .search(state.provider.as_ref(), query)
        .await
        .map_err(|e| map_workflow_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: window_data(&session),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn load_more(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ApiResponse<LoadMoreData>>, ApiError> {
    let mut session = acquire(&state, session_id, &req_id.0)?;
    let appended = session
        .load_more(state.provider.as_ref())
        .await
        .map_err(|e| map_workflow_error(req_id.0.clone(), &e))?
        .to_vec();

    Ok(Json(ApiResponse {
        data: LoadMoreData {
            appended,
            total: session.results().len(),
            has_more_pages: session.has_more_pages(),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn show_more(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ResultWindowData>>, ApiError> {
    let mut session = acquire(&state, session_id, &req_id.0)?;
    session.show_more();

    Ok(Json(ApiResponse {
        data: window_data(&session),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn results(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ResultWindowData>>, ApiError> {
    let session = acquire(&state, session_id, &req_id.0)?;
    Ok(Json(ApiResponse {
        data: window_data(&session),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn enrich_one(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(session_id): Path<Uuid>,
    Json(body): Json<EnrichBody>,
) -> Result<Json<ApiResponse<EnrichedLeadData>>, ApiError> {
    let mut session = acquire(&state, session_id, &req_id.0)?;
    let lead = session
        .enrich_one(state.scraper.as_ref(), body.index)
        .await
        .map_err(|e| map_workflow_error(req_id.0.clone(), &e))?
        .clone();

    Ok(Json(ApiResponse {
        data: EnrichedLeadData {
            index: body.index,
            lead,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn enrich_all(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ApiResponse<EnrichReport>>, ApiError> {
    let mut session = acquire(&state, session_id, &req_id.0)?;
    let report = session.enrich_all(state.scraper.as_ref()).await;

    Ok(Json(ApiResponse {
        data: report,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn save(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(session_id): Path<Uuid>,
    Json(body): Json<SaveBody>,
) -> Result<Json<ApiResponse<SavedListData>>, ApiError> {
    let target = match (body.new_name, body.list_id) {
        (Some(name), None) => SaveTarget::NewList { name },
        (None, Some(id)) => SaveTarget::Existing { id },
        _ => {
            return Err(ApiError::new(
                req_id.0,
                "validation_error",
                "provide exactly one of new_name or list_id",
            ))
        }
    };

    let session = acquire(&state, session_id, &req_id.0)?;
    let saved = match body.index {
        Some(index) => session.save_one(state.store.as_ref(), index, &target).await,
        None => session.save_all(state.store.as_ref(), &target).await,
    }
    .map_err(|e| map_workflow_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: SavedListData {
            id: saved.id,
            name: saved.name,
            item_count: saved.items.len(),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
