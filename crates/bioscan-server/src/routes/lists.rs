use crate::app::AppState;
use crate::error::ApiError;
use axum::extract::{Path, State};
use axum::Json;
use bioscan_store::SavedList;
use serde_json::{json, Value};
use std::sync::Arc;

pub async fn list_names(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let names = state.lists.names()?;
    Ok(Json(json!({ "status": "success", "lists": names })))
}

pub async fn get_list(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<SavedList>, ApiError> {
    Ok(Json(state.lists.load(&name)?))
}
