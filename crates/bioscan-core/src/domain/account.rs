use serde::{Deserialize, Serialize};
use serde_json::Value;

const ACCOUNT_TYPE_BUSINESS: i64 = 2;
const ACCOUNT_TYPE_CREATOR: i64 = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[default]
    Personal,
    Business,
    Creator,
}

impl AccountType {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountType::Personal => "personal",
            AccountType::Business => "business",
            AccountType::Creator => "creator",
        }
    }
}

/// Creator flags win over business flags; anything else is a personal account.
pub fn classify_account(raw: &Value) -> AccountType {
    let account_type = raw.get("account_type").and_then(Value::as_i64);
    if flag(raw, "is_creator") || account_type == Some(ACCOUNT_TYPE_CREATOR) {
        return AccountType::Creator;
    }
    if flag(raw, "is_business")
        || flag(raw, "is_business_account")
        || account_type == Some(ACCOUNT_TYPE_BUSINESS)
    {
        return AccountType::Business;
    }
    AccountType::Personal
}

fn flag(raw: &Value, key: &str) -> bool {
    raw.get(key).and_then(Value::as_bool).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::{classify_account, AccountType};
    use serde_json::json;

    #[test]
    fn creator_takes_precedence_over_business() {
        let raw = json!({"is_business": true, "account_type": 3});
        assert_eq!(classify_account(&raw), AccountType::Creator);
    }

    #[test]
    fn business_flag_or_type_marks_business() {
        assert_eq!(
            classify_account(&json!({"is_business": true})),
            AccountType::Business
        );
        assert_eq!(
            classify_account(&json!({"account_type": 2})),
            AccountType::Business
        );
    }

    #[test]
    fn defaults_to_personal_on_missing_or_malformed_flags() {
        assert_eq!(classify_account(&json!({})), AccountType::Personal);
        assert_eq!(
            classify_account(&json!({"is_business": "yes"})),
            AccountType::Personal
        );
        assert_eq!(classify_account(&json!(null)), AccountType::Personal);
    }

    #[test]
    fn serializes_lowercase() {
        let value = serde_json::to_value(AccountType::Creator).unwrap();
        assert_eq!(value, json!("creator"));
    }
}
