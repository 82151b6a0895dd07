use serde_json::Value;
use std::collections::BTreeMap;

pub const BUSINESS_EMAIL_KEYS: &[&str] = &["email", "email_address"];
pub const TOP_LEVEL_EMAIL_KEYS: &[&str] = &["public_email", "business_email"];
pub const BUSINESS_PHONE_KEYS: &[&str] = &[
    "phone_number",
    "phone",
    "contact_phone_number",
    "public_phone_number",
];
pub const TOP_LEVEL_PHONE_KEYS: &[&str] = &[
    "business_phone_number",
    "public_phone_number",
    "contact_phone_number",
];
pub const COUNTRY_CODE_KEYS: &[&str] = &["country_code", "phone_country_code"];

/// Scalar fields of a loosely typed upstream record, keyed by their upstream spelling.
///
/// Strings are kept trimmed and numbers are stringified. Anything else is
/// treated as absent, so a malformed record degrades to fewer fields rather
/// than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    values: BTreeMap<String, String>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: &Value) -> Self {
        let Value::Object(object) = value else {
            return Self::default();
        };

        let mut values = BTreeMap::new();
        for (key, value) in object {
            let scalar = match value {
                Value::String(text) => text.trim().to_string(),
                Value::Number(number) => number.to_string(),
                _ => continue,
            };
            values.insert(key.clone(), scalar);
        }
        Self { values }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        self.values.insert(key.into(), value.trim().to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|value| value.as_str())
            .filter(|value| !value.is_empty())
    }

    /// Returns the first non-empty value, trying `aliases` in priority order.
    pub fn first(&self, aliases: &[&str]) -> Option<&str> {
        aliases.iter().find_map(|alias| self.get(alias))
    }

    pub fn is_empty(&self) -> bool {
        self.values.values().all(|value| value.is_empty())
    }
}

impl<K, V> FromIterator<(K, V)> for FieldMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = FieldMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}
