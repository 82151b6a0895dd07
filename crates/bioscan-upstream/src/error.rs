use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("login required")]
    LoginRequired,
    #[error("invalid username or password")]
    BadCredentials,
    #[error("no credentials configured")]
    MissingCredentials,
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error("account is private: {0}")]
    PrivateAccount(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("upstream returned {status}: {message}")]
    Http { status: u16, message: String },
    #[error("invalid url: {0}")]
    Url(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("upstream unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, UpstreamError>;

impl From<serde_json::Error> for UpstreamError {
    fn from(err: serde_json::Error) -> Self {
        UpstreamError::Decode(err.to_string())
    }
}

#[cfg(any(feature = "http-client", feature = "llm-enrich"))]
impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return UpstreamError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            };
        }
        if err.is_decode() {
            return UpstreamError::Decode(err.to_string());
        }
        UpstreamError::Unavailable(err.to_string())
    }
}

#[cfg(any(feature = "http-client", feature = "llm-enrich"))]
impl From<url::ParseError> for UpstreamError {
    fn from(err: url::ParseError) -> Self {
        UpstreamError::Url(err.to_string())
    }
}
