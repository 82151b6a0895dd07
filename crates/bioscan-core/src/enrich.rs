use crate::category::CategoryIndex;
use crate::dto::ProfileSummary;
use serde::{Deserialize, Serialize};

/// What an enrichment model proposes for a profile. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentSuggestion {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Fills only fields the profile does not already have. Returns whether anything changed.
pub fn apply_enrichment(
    summary: &mut ProfileSummary,
    suggestion: EnrichmentSuggestion,
    categories: &CategoryIndex,
) -> bool {
    let mut changed = false;

    if summary.description.is_none() {
        if let Some(description) = non_blank(suggestion.description) {
            summary.description = Some(description);
            changed = true;
        }
    }

    if summary.location.is_none() {
        if let Some(location) = non_blank(suggestion.location) {
            summary.location = Some(location);
            changed = true;
        }
    }

    if summary.category.is_none() {
        if let Some(category) = suggestion
            .category
            .as_deref()
            .and_then(|guess| categories.best_match(guess))
        {
            summary.category = Some(category);
            changed = true;
        }
    }

    changed
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
