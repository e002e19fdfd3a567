//! Saved-list endpoints: overview, detail, delete, export.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use leadscout_core::{SavedList, SavedListSummary};

use crate::api::{map_workflow_error, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

pub(super) async fn list_lists(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<SavedListSummary>>>, ApiError> {
    let lists = state
        .store
        .get_lists()
        .await
        .map_err(|e| map_workflow_error(req_id.0.clone(), &e))?;
    Ok(Json(ApiResponse {
        data: lists,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_list(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(list_id): Path<Uuid>,
) -> Result<Json<ApiResponse<SavedList>>, ApiError> {
    let list = state
        .store
        .get_list(list_id)
        .await
        .map_err(|e| map_workflow_error(req_id.0.clone(), &e))?;
    Ok(Json(ApiResponse {
        data: list,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn delete_list(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(list_id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    state
        .store
        .delete_list(list_id)
        .await
        .map_err(|e| map_workflow_error(req_id.0.clone(), &e))?;
    tracing::info!(%list_id, "deleted saved list");
    Ok(Json(ApiResponse {
        data: serde_json::json!({"deleted": true}),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Streams the list as a CSV attachment named after the list.
pub(super) async fn export_list(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(list_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let list = state
        .store
        .get_list(list_id)
        .await
        .map_err(|e| map_workflow_error(req_id.0.clone(), &e))?;
    let blob = state
        .store
        .export_csv(list_id)
        .await
        .map_err(|e| map_workflow_error(req_id.0.clone(), &e))?;

    let filename = format!("{}.csv", sanitize_filename(&list.name));
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        blob,
    ))
}

/// Keeps list names safe for a `filename=` parameter: alphanumerics,
/// dashes, and underscores survive; everything else becomes `_`.
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "list".to_owned()
    } else {
        cleaned
    }
}
