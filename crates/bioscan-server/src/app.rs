use crate::routes;
use crate::service::ProfileService;
use axum::routing::{get, post};
use axum::Router;
use bioscan_store::ListStore;
use bioscan_upstream::Credentials;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub struct AppState {
    pub service: ProfileService,
    pub lists: ListStore,
    /// Used by `/login` when the request omits username or password.
    pub default_credentials: Option<Credentials>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/login", post(routes::login))
        .route("/logout", post(routes::logout))
        .route("/followers", post(routes::followers))
        .route("/user-info", post(routes::user_info))
        .route("/batch", post(routes::batch))
        .route("/lists", get(routes::list_names))
        .route("/lists/:name", get(routes::get_list))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
