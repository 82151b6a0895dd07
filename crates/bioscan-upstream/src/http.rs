use crate::client::{Credentials, FollowerEntry, RawProfile, SessionState, SocialClient};
use crate::error::{Result, UpstreamError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

const DEFAULT_USER_AGENT: &str = concat!("bioscan/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// `SocialClient` backed by a REST bridge in front of the platform's private API.
#[derive(Debug, Clone)]
pub struct HttpSocialClient {
    base: Url,
    client: Client,
}

impl HttpSocialClient {
    pub fn new(base_url: &str, user_agent: Option<&str>, timeout: Duration) -> Result<Self> {
        let mut base = Url::parse(base_url)?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(UpstreamError::Url(base_url.to_string()));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder()
            .user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT))
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self { base, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    async fn post_form(&self, path: &str, form: &[(&str, &str)], subject: &str) -> Result<Value> {
        let url = self.base.join(path)?;
        debug!(endpoint = path, subject, "upstream request");
        let response = self.client.post(url).form(form).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(map_status(status.as_u16(), &body, subject));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl SocialClient for HttpSocialClient {
    async fn login(&self, credentials: &Credentials) -> Result<SessionState> {
        let form = [
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ];
        let subject = credentials.username.as_str();
        let body = match self.post_form("auth/login", &form, subject).await {
            Ok(body) => body,
            Err(UpstreamError::Http { status, .. }) if (400..500).contains(&status) => {
                return Err(UpstreamError::BadCredentials);
            }
            Err(UpstreamError::LoginRequired) | Err(UpstreamError::UserNotFound(_)) => {
                return Err(UpstreamError::BadCredentials);
            }
            Err(err) => return Err(err),
        };
        let session_id = scalar(&body, &["sessionid", "session_id"])
            .ok_or_else(|| UpstreamError::Decode("login response without session id".into()))?;
        Ok(SessionState {
            username: credentials.username.clone(),
            session_id,
        })
    }

    async fn validate(&self, session: &SessionState) -> Result<bool> {
        let form = [("sessionid", session.session_id.as_str())];
        let subject = session.username.as_str();
        match self.post_form("auth/validate", &form, subject).await {
            Ok(Value::Bool(valid)) => Ok(valid),
            Ok(_) => Ok(true),
            Err(UpstreamError::LoginRequired) => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn user_id_from_username(
        &self,
        session: &SessionState,
        username: &str,
    ) -> Result<String> {
        let form = [
            ("sessionid", session.session_id.as_str()),
            ("username", username),
        ];
        let body = self.post_form("user/id_from_username", &form, username).await?;
        scalar(&body, &["user_id", "pk", "id"])
            .ok_or_else(|| UpstreamError::UserNotFound(username.to_string()))
    }

    async fn user_info(&self, session: &SessionState, user_id: &str) -> Result<RawProfile> {
        let form = [
            ("sessionid", session.session_id.as_str()),
            ("user_id", user_id),
        ];
        let body = self.post_form("user/info", &form, user_id).await?;
        match body {
            Value::Object(mut map) => match map.remove("user") {
                Some(user @ Value::Object(_)) => Ok(user),
                Some(other) => {
                    map.insert("user".to_string(), other);
                    Ok(Value::Object(map))
                }
                None => Ok(Value::Object(map)),
            },
            _ => Err(UpstreamError::UserNotFound(user_id.to_string())),
        }
    }

    async fn user_followers(
        &self,
        session: &SessionState,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<FollowerEntry>> {
        let amount = limit.to_string();
        let form = [
            ("sessionid", session.session_id.as_str()),
            ("user_id", user_id),
            ("amount", amount.as_str()),
        ];
        let body = self.post_form("user/followers", &form, user_id).await?;
        let mut followers = parse_followers(&body);
        followers.truncate(limit);
        Ok(followers)
    }
}

/// Maps a non-success bridge response to an error; `subject` names the user involved.
pub fn map_status(status: u16, body: &str, subject: &str) -> UpstreamError {
    let detail = error_detail(body);
    let lower = detail.to_ascii_lowercase();
    match status {
        401 => UpstreamError::LoginRequired,
        403 if lower.contains("private") => UpstreamError::PrivateAccount(subject.to_string()),
        403 if lower.contains("login") => UpstreamError::LoginRequired,
        404 => UpstreamError::UserNotFound(subject.to_string()),
        429 => UpstreamError::RateLimited(detail),
        _ if lower.contains("login_required") => UpstreamError::LoginRequired,
        _ => UpstreamError::Http {
            status,
            message: detail,
        },
    }
}

fn error_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        let message = ["detail", "message", "error", "exc_type"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str));
        if let Some(message) = message {
            return message.to_string();
        }
    }
    body.trim().to_string()
}

/// Accepts either a list of user records or a map keyed by user id.
pub fn parse_followers(body: &Value) -> Vec<FollowerEntry> {
    let entries: Vec<(Option<&str>, &Value)> = match body {
        Value::Array(items) => items.iter().map(|item| (None, item)).collect(),
        Value::Object(map) => map
            .iter()
            .map(|(key, item)| (Some(key.as_str()), item))
            .collect(),
        _ => Vec::new(),
    };

    entries
        .into_iter()
        .filter_map(|(key, item)| {
            let user_id = scalar(item, &["pk", "id", "user_id"])
                .or_else(|| key.map(str::to_string))?;
            let username = scalar(item, &["username"])?;
            let full_name = scalar(item, &["full_name"]).unwrap_or_default();
            Some(FollowerEntry {
                user_id,
                username,
                full_name,
            })
        })
        .collect()
}

fn scalar(value: &Value, keys: &[&str]) -> Option<String> {
    let direct = match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    };
    direct
        .or_else(|| {
            keys.iter().find_map(|key| match value.get(*key)? {
                Value::String(text) => Some(text.clone()),
                Value::Number(number) => Some(number.to_string()),
                _ => None,
            })
        })
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{map_status, parse_followers, HttpSocialClient};
    use crate::error::UpstreamError;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn base_url_gets_trailing_slash() {
        let client =
            HttpSocialClient::new("http://bridge.local:8000/api", None, Duration::from_secs(5))
                .expect("client");
        assert_eq!(client.base_url().as_str(), "http://bridge.local:8000/api/");
        assert!(HttpSocialClient::new("ftp://bridge", None, Duration::from_secs(5)).is_err());
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(map_status(401, "", "a"), UpstreamError::LoginRequired));
        assert!(matches!(
            map_status(403, r#"{"detail":"login_required"}"#, "a"),
            UpstreamError::LoginRequired
        ));
        assert!(matches!(
            map_status(403, r#"{"detail":"Not authorized to view user: private account"}"#, "a"),
            UpstreamError::PrivateAccount(user) if user == "a"
        ));
        assert!(matches!(
            map_status(404, "", "ghost"),
            UpstreamError::UserNotFound(user) if user == "ghost"
        ));
        assert!(matches!(
            map_status(429, r#"{"detail":"Please wait a few minutes"}"#, "a"),
            UpstreamError::RateLimited(message) if message == "Please wait a few minutes"
        ));
        assert!(matches!(
            map_status(500, r#"{"exc_type":"LoginRequired"}"#, "a"),
            UpstreamError::Http { status: 500, .. }
        ));
        assert!(matches!(
            map_status(500, r#"{"detail":"login_required"}"#, "a"),
            UpstreamError::LoginRequired
        ));
    }

    #[test]
    fn followers_from_map_or_list() {
        let keyed = json!({
            "101": {"username": "first", "full_name": "First One"},
            "202": {"pk": 202, "username": "second"},
            "303": {"full_name": "no username"}
        });
        let mut parsed = parse_followers(&keyed);
        parsed.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].user_id, "101");
        assert_eq!(parsed[0].full_name, "First One");
        assert_eq!(parsed[1].user_id, "202");

        let listed = json!([{"pk": "7", "username": "seven"}, {"username": "noid"}]);
        let parsed = parse_followers(&listed);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].username, "seven");
    }
}
