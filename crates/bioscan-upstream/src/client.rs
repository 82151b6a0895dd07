use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw user record as returned by the platform.
pub type RawProfile = serde_json::Value;

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Builds credentials only when both parts are non-blank.
    pub fn from_parts(username: Option<&str>, password: Option<&str>) -> Option<Self> {
        let username = username.map(str::trim).filter(|value| !value.is_empty())?;
        let password = password.filter(|value| !value.is_empty())?;
        Some(Self::new(username, password))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An authenticated session with the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub username: String,
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowerEntry {
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub full_name: String,
}

#[async_trait]
pub trait SocialClient: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<SessionState>;
    /// Returns `false` when the session is no longer accepted.
    async fn validate(&self, session: &SessionState) -> Result<bool>;
    async fn user_id_from_username(&self, session: &SessionState, username: &str)
        -> Result<String>;
    async fn user_info(&self, session: &SessionState, user_id: &str) -> Result<RawProfile>;
    async fn user_followers(
        &self,
        session: &SessionState,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<FollowerEntry>>;
}
