use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("either username or user_id is required")]
    MissingTarget,
    #[error("invalid username: {0}")]
    InvalidUsername(String),
    #[error("invalid limit: {0}")]
    InvalidLimit(i64),
}
