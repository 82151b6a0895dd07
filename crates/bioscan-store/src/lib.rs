pub mod csv;
pub mod error;
pub mod lists;
pub mod paths;

pub use error::{Result, StoreError, StoreErrorKind};
pub use lists::{ListStore, SavedList};
