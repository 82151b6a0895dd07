pub mod category;
pub mod domain;
pub mod dto;
pub mod enrich;
pub mod error;
pub mod extract;
pub mod rules;

pub use category::CategoryIndex;
pub use domain::*;
pub use dto::*;
pub use enrich::{apply_enrichment, EnrichmentSuggestion};
pub use error::CoreError;
pub use extract::extract;
pub use rules::*;
