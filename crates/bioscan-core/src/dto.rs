use crate::domain::{classify_account, AccountType, ContactRecord, ProfileInput};
use crate::extract::extract;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The per-profile payload returned to API callers and written to saved lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub username: String,
    pub full_name: String,
    pub user_id: String,
    pub profile_pic_url: Option<String>,
    pub bio: String,
    pub external_url: Option<String>,
    pub is_verified: bool,
    pub is_private: bool,
    pub follower_count: u64,
    pub following_count: u64,
    pub post_count: u64,
    pub account_type: AccountType,
    pub category: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    #[serde(flatten)]
    pub contact: ContactRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProfileSummary {
    pub fn from_raw(raw: &Value) -> Self {
        let input = ProfileInput::from_raw(raw);
        let contact = extract(&input);

        Self {
            username: text(raw, &["username"]).unwrap_or_default(),
            full_name: text(raw, &["full_name"]).unwrap_or_default(),
            user_id: text(raw, &["pk", "id", "user_id"]).unwrap_or_default(),
            profile_pic_url: text(raw, &["profile_pic_url_hd", "profile_pic_url"]),
            bio: input.biography,
            external_url: input.external_url,
            is_verified: flag(raw, "is_verified"),
            is_private: flag(raw, "is_private"),
            follower_count: count(raw, "follower_count"),
            following_count: count(raw, "following_count"),
            post_count: count(raw, "media_count"),
            account_type: classify_account(raw),
            category: text(raw, &["category", "category_name", "business_category_name"]),
            location: text(raw, &["city_name", "location"]),
            description: None,
            contact,
            error: None,
        }
    }

    /// Degraded entry for a profile whose details could not be fetched.
    pub fn placeholder(
        username: impl Into<String>,
        user_id: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            user_id: user_id.into(),
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn has_contact(&self) -> bool {
        !self.contact.is_empty()
    }
}

fn text(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match raw.get(*key)? {
        Value::String(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    })
}

fn flag(raw: &Value, key: &str) -> bool {
    raw.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn count(raw: &Value, key: &str) -> u64 {
    raw.get(key).and_then(Value::as_u64).unwrap_or(0)
}
