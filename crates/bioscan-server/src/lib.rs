pub mod app;
pub mod error;
pub mod routes;
pub mod service;
pub mod util;

pub use app::{router, AppState};
pub use error::ApiError;
pub use service::{check_batch_size, FollowersReport, ProfileService, MAX_BATCH_USERNAMES};
