pub mod validation;

pub use validation::{
    normalize_username, validate_limit, LookupTarget, DEFAULT_FOLLOWER_LIMIT, MAX_FOLLOWER_LIMIT,
};
