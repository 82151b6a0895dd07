use crate::app::AppState;
use crate::error::{invalid_input, ApiError};
use crate::service::check_batch_size;
use crate::util::now_utc;
use axum::extract::State;
use axum::Json;
use bioscan_core::{validate_limit, LookupTarget};
use bioscan_store::lists::followers_list_name;
use bioscan_store::SavedList;
use bioscan_upstream::Credentials;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

type ApiResult = Result<Json<Value>, ApiError>;

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TargetRequest {
    pub username: Option<String>,
    pub user_id: Option<Value>,
    pub limit: Option<i64>,
    #[serde(default)]
    pub save: bool,
}

impl TargetRequest {
    fn target(&self) -> Result<LookupTarget, ApiError> {
        let user_id = self.user_id.as_ref().and_then(|value| match value {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        });
        Ok(LookupTarget::new(
            self.username.as_deref(),
            user_id.as_deref(),
        )?)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub usernames: Vec<String>,
}

fn body<T: Default>(payload: Option<Json<T>>) -> T {
    payload.map(|Json(value)| value).unwrap_or_default()
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Option<Json<LoginRequest>>,
) -> ApiResult {
    let request = body(payload);
    let fallback = state.default_credentials.as_ref();
    let username = request
        .username
        .as_deref()
        .filter(|value| !value.trim().is_empty())
        .or(fallback.map(|creds| creds.username.as_str()));
    let password = request
        .password
        .as_deref()
        .filter(|value| !value.is_empty())
        .or(fallback.map(|creds| creds.password.as_str()));
    let credentials = Credentials::from_parts(username, password)
        .ok_or_else(|| invalid_input("Username and password required"))?;

    let session = state.service.sessions().login_with(credentials).await?;
    Ok(Json(json!({
        "status": "success",
        "message": "Logged in successfully",
        "username": session.username,
    })))
}

pub async fn logout(State(state): State<Arc<AppState>>) -> ApiResult {
    state.service.sessions().release().await?;
    info!("logged out");
    Ok(Json(json!({
        "status": "success",
        "message": "Logged out",
    })))
}

pub async fn followers(
    State(state): State<Arc<AppState>>,
    payload: Option<Json<TargetRequest>>,
) -> ApiResult {
    let request = body(payload);
    let target = request.target()?;
    let limit = validate_limit(request.limit)?;

    let report = state.service.followers(&target, limit).await?;

    if request.save {
        let name = followers_list_name(
            report
                .target_username
                .as_deref()
                .unwrap_or(report.target_user_id.as_str()),
        );
        let list = SavedList {
            name: name.clone(),
            target_username: report.target_username.clone(),
            saved_at: now_utc(),
            profiles: report.followers.clone(),
        };
        match state.lists.save(&list) {
            Ok(path) => info!(list = %name, path = %path.display(), "followers saved"),
            Err(err) => warn!(list = %name, error = %err, "could not save followers"),
        }
    }

    Ok(Json(json!({
        "status": "success",
        "target_user_id": report.target_user_id,
        "target_username": report.target_username,
        "count": report.followers.len(),
        "followers": report.followers,
    })))
}

pub async fn user_info(
    State(state): State<Arc<AppState>>,
    payload: Option<Json<TargetRequest>>,
) -> ApiResult {
    let request = body(payload);
    let target = request.target()?;
    let user = state.service.user_info(&target).await?;
    Ok(Json(json!({ "status": "success", "user": user })))
}

pub async fn batch(
    State(state): State<Arc<AppState>>,
    payload: Option<Json<BatchRequest>>,
) -> ApiResult {
    let request = body(payload);
    check_batch_size(&request.usernames)?;
    let profiles = state.service.batch(&request.usernames).await;
    Ok(Json(json!({
        "status": "success",
        "count": profiles.len(),
        "profiles": profiles,
    })))
}
