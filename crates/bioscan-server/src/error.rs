use anyhow::Error;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bioscan_config::ConfigError;
use bioscan_core::CoreError;
use bioscan_store::error::{StoreError, StoreErrorKind};
use bioscan_upstream::UpstreamError;
use serde_json::json;
use std::process::ExitCode;
use thiserror::Error as ThisError;

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_NOT_FOUND: u8 = 2;
pub const EXIT_INVALID_INPUT: u8 = 3;
pub const EXIT_AUTH: u8 = 4;

#[derive(Debug, ThisError)]
pub enum AppError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
}

pub fn invalid_input(message: impl Into<String>) -> Error {
    AppError::InvalidInput(message.into()).into()
}

pub fn not_found(message: impl Into<String>) -> Error {
    AppError::NotFound(message.into()).into()
}

/// Coarse outcome of a failed operation, shared by the HTTP and CLI surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    InvalidInput,
    Unauthorized,
    Forbidden,
    NotFound,
    RateLimited,
    Upstream,
    Internal,
}

impl Failure {
    pub fn status(self) -> StatusCode {
        match self {
            Failure::InvalidInput => StatusCode::BAD_REQUEST,
            Failure::Unauthorized => StatusCode::UNAUTHORIZED,
            Failure::Forbidden => StatusCode::FORBIDDEN,
            Failure::NotFound => StatusCode::NOT_FOUND,
            Failure::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Failure::Upstream => StatusCode::BAD_GATEWAY,
            Failure::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn exit_code(self) -> u8 {
        match self {
            Failure::InvalidInput => EXIT_INVALID_INPUT,
            Failure::NotFound => EXIT_NOT_FOUND,
            Failure::Unauthorized | Failure::Forbidden => EXIT_AUTH,
            Failure::RateLimited | Failure::Upstream | Failure::Internal => EXIT_FAILURE,
        }
    }
}

pub fn classify(err: &Error) -> Failure {
    for cause in err.chain() {
        if let Some(app_err) = cause.downcast_ref::<AppError>() {
            return match app_err {
                AppError::InvalidInput(_) => Failure::InvalidInput,
                AppError::NotFound(_) => Failure::NotFound,
            };
        }
        if let Some(upstream_err) = cause.downcast_ref::<UpstreamError>() {
            return upstream_failure(upstream_err);
        }
        if let Some(store_err) = cause.downcast_ref::<StoreError>() {
            return store_failure(store_err);
        }
        if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            return config_failure(config_err);
        }
        if let Some(_core_err) = cause.downcast_ref::<CoreError>() {
            return Failure::InvalidInput;
        }
        if let Some(_json_err) = cause.downcast_ref::<serde_json::Error>() {
            return Failure::InvalidInput;
        }
    }
    Failure::Internal
}

fn upstream_failure(err: &UpstreamError) -> Failure {
    match err {
        UpstreamError::LoginRequired
        | UpstreamError::BadCredentials
        | UpstreamError::MissingCredentials => Failure::Unauthorized,
        UpstreamError::PrivateAccount(_) => Failure::Forbidden,
        UpstreamError::UserNotFound(_) => Failure::NotFound,
        UpstreamError::RateLimited(_) => Failure::RateLimited,
        UpstreamError::Http { .. } | UpstreamError::Decode(_) | UpstreamError::Unavailable(_) => {
            Failure::Upstream
        }
        UpstreamError::Url(_) | UpstreamError::Io(_) => Failure::Internal,
    }
}

fn store_failure(err: &StoreError) -> Failure {
    match err.kind() {
        StoreErrorKind::NotFound => Failure::NotFound,
        StoreErrorKind::InvalidListName | StoreErrorKind::InvalidDataPath | StoreErrorKind::Csv => {
            Failure::InvalidInput
        }
        StoreErrorKind::MissingHomeDir | StoreErrorKind::Io | StoreErrorKind::Json => {
            Failure::Internal
        }
    }
}

fn config_failure(err: &ConfigError) -> Failure {
    match err {
        ConfigError::MissingHomeDir => Failure::Internal,
        ConfigError::InvalidConfigPath(_)
        | ConfigError::MissingConfigFile(_)
        | ConfigError::InsecurePermissions(_)
        | ConfigError::InvalidPort(_)
        | ConfigError::InvalidRequestDelay(_)
        | ConfigError::InvalidRequestTimeout(_)
        | ConfigError::InvalidUpstreamUrl(_)
        | ConfigError::InvalidEnrichmentUrl(_)
        | ConfigError::InvalidEnv { .. }
        | ConfigError::Read { .. }
        | ConfigError::Parse { .. } => Failure::InvalidInput,
    }
}

pub fn report_error(err: &Error, verbose: bool) {
    if verbose {
        eprintln!("error: {:#}", err);
    } else {
        eprintln!("error: {}", err);
    }
}

pub fn exit_code_for(err: &Error) -> ExitCode {
    ExitCode::from(classify(err).exit_code())
}

/// JSON error response: `{"error": message}` with a status derived from the error chain.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn from_anyhow(err: &Error) -> Self {
        Self::new(classify(err).status(), err.to_string())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<E> From<E> for ApiError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        Self::from_anyhow(&err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::warn!(status = %self.status, error = %self.message, "request failed");
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
