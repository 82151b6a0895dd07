pub mod client;
pub mod enrich;
pub mod error;
#[cfg(feature = "http-client")]
pub mod http;
pub mod session;

pub use client::{Credentials, FollowerEntry, RawProfile, SessionState, SocialClient};
pub use enrich::Enricher;
#[cfg(feature = "llm-enrich")]
pub use enrich::OpenAiEnricher;
pub use error::{Result, UpstreamError};
#[cfg(feature = "http-client")]
pub use http::HttpSocialClient;
pub use session::SessionManager;
