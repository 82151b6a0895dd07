use crate::domain::fields::FieldMap;
use serde_json::Value;

/// The free-text and structured fields the extractor reads from one profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileInput {
    pub biography: String,
    pub external_url: Option<String>,
    pub is_business: bool,
    pub business_contact: Option<FieldMap>,
    /// Top-level scalar fields, consulted as the last resort for business contact details.
    pub public_fields: FieldMap,
}

impl ProfileInput {
    pub fn new(biography: impl Into<String>) -> Self {
        Self {
            biography: biography.into(),
            ..Self::default()
        }
    }

    pub fn with_external_url(mut self, url: impl Into<String>) -> Self {
        self.external_url = Some(url.into());
        self
    }

    pub fn with_business_contact(mut self, contact: FieldMap) -> Self {
        self.is_business = true;
        self.business_contact = Some(contact);
        self
    }

    /// Builds the input from a raw upstream profile record.
    ///
    /// Wrong types anywhere in the record read as absent.
    pub fn from_raw(raw: &Value) -> Self {
        let text = |key: &str| {
            raw.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        let flag = |key: &str| raw.get(key).and_then(Value::as_bool).unwrap_or(false);

        let business_contact = match raw.get("business_contact_method") {
            Some(value @ Value::Object(_)) => Some(FieldMap::from_value(value)),
            _ => None,
        };

        Self {
            biography: text("biography").unwrap_or_default(),
            external_url: text("external_url"),
            is_business: flag("is_business") || flag("is_business_account"),
            business_contact,
            public_fields: FieldMap::from_value(raw),
        }
    }

    /// Biography and external URL joined into the text every free-text scan runs over.
    pub fn search_corpus(&self) -> String {
        match self.external_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => format!("{} {}", self.biography, url),
            _ => self.biography.clone(),
        }
    }
}
