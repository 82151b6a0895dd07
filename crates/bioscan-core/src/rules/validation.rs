use crate::error::CoreError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FOLLOWER_LIMIT: usize = 20;
pub const MAX_FOLLOWER_LIMIT: usize = 200;

/// Who to look up upstream. A username wins when both are given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupTarget {
    Username(String),
    UserId(String),
}

impl LookupTarget {
    pub fn new(username: Option<&str>, user_id: Option<&str>) -> Result<Self, CoreError> {
        if let Some(raw) = username.map(str::trim).filter(|value| !value.is_empty()) {
            return Ok(Self::Username(normalize_username(raw)?));
        }
        if let Some(id) = user_id.map(str::trim).filter(|value| !value.is_empty()) {
            return Ok(Self::UserId(id.to_string()));
        }
        Err(CoreError::MissingTarget)
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Username(name) => Some(name),
            Self::UserId(_) => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Username(name) => format!("@{name}"),
            Self::UserId(id) => id.clone(),
        }
    }
}

pub fn normalize_username(raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim().trim_start_matches('@');
    let valid = !trimmed.is_empty()
        && trimmed.len() <= 30
        && trimmed
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_'));
    if !valid {
        return Err(CoreError::InvalidUsername(raw.trim().to_string()));
    }
    Ok(trimmed.to_ascii_lowercase())
}

pub fn validate_limit(limit: Option<i64>) -> Result<usize, CoreError> {
    match limit {
        None => Ok(DEFAULT_FOLLOWER_LIMIT),
        Some(value) if value >= 1 && value <= MAX_FOLLOWER_LIMIT as i64 => Ok(value as usize),
        Some(value) => Err(CoreError::InvalidLimit(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_username, validate_limit, LookupTarget, DEFAULT_FOLLOWER_LIMIT};
    use crate::error::CoreError;

    #[test]
    fn username_wins_over_user_id() {
        let target = LookupTarget::new(Some(" @Jane.Doe "), Some("123")).unwrap();
        assert_eq!(target, LookupTarget::Username("jane.doe".to_string()));
        assert_eq!(target.label(), "@jane.doe");
    }

    #[test]
    fn blank_username_falls_back_to_user_id() {
        let target = LookupTarget::new(Some("  "), Some("123")).unwrap();
        assert_eq!(target, LookupTarget::UserId("123".to_string()));
        assert!(target.username().is_none());
    }

    #[test]
    fn missing_target_is_rejected() {
        assert_eq!(LookupTarget::new(None, None), Err(CoreError::MissingTarget));
        assert_eq!(
            LookupTarget::new(Some(""), Some(" ")),
            Err(CoreError::MissingTarget)
        );
    }

    #[test]
    fn invalid_usernames_are_rejected() {
        assert!(normalize_username("has space").is_err());
        assert!(normalize_username("@").is_err());
        assert!(normalize_username(&"a".repeat(31)).is_err());
    }

    #[test]
    fn limit_defaults_and_bounds() {
        assert_eq!(validate_limit(None), Ok(DEFAULT_FOLLOWER_LIMIT));
        assert_eq!(validate_limit(Some(5)), Ok(5));
        assert_eq!(validate_limit(Some(0)), Err(CoreError::InvalidLimit(0)));
        assert_eq!(validate_limit(Some(201)), Err(CoreError::InvalidLimit(201)));
    }
}
