use anyhow::{Context as _, Result};
use bioscan_config::AppConfig;
use bioscan_core::CategoryIndex;
use bioscan_server::{AppState, ProfileService};
use bioscan_store::{paths, ListStore};
use bioscan_upstream::{Credentials, SessionManager, SocialClient};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub mod batch;
pub mod export;
pub mod extract;
pub mod serve;

pub struct Context {
    pub config: AppConfig,
    pub data_dir: PathBuf,
}

impl Context {
    pub fn new(config: AppConfig) -> Result<Self> {
        let data_dir =
            paths::data_dir(config.data_dir.as_deref()).with_context(|| "resolve data dir")?;
        debug!(path = %data_dir.display(), "data dir resolved");
        Ok(Self { config, data_dir })
    }

    pub fn lists(&self) -> ListStore {
        ListStore::new(&self.data_dir)
    }

    pub fn session_path(&self) -> PathBuf {
        self.config
            .upstream
            .session_path
            .clone()
            .unwrap_or_else(|| paths::session_path_in(&self.data_dir))
    }

    pub fn credentials(&self) -> Option<Credentials> {
        Credentials::from_parts(
            self.config.upstream.username.as_deref(),
            self.config.upstream.password.as_deref(),
        )
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.config.server.request_timeout_secs)
    }

    /// Wires the upstream client, session manager and optional enricher into app state.
    pub fn build_state(&self) -> Result<AppState> {
        paths::ensure_dir(&self.data_dir)
            .with_context(|| format!("create data dir {}", self.data_dir.display()))?;
        let client = self.social_client()?;
        let sessions = Arc::new(SessionManager::new(
            client,
            self.credentials(),
            Some(self.session_path()),
        ));
        let delay = Duration::from_millis(self.config.server.request_delay_ms);
        let service = self.with_enrichment(ProfileService::new(sessions, delay))?;
        Ok(AppState {
            service,
            lists: self.lists(),
            default_credentials: self.credentials(),
        })
    }

    #[cfg(feature = "http-client")]
    fn social_client(&self) -> Result<Arc<dyn SocialClient>> {
        let upstream = &self.config.upstream;
        let client = bioscan_upstream::HttpSocialClient::new(
            &upstream.base_url,
            upstream.user_agent.as_deref(),
            self.request_timeout(),
        )
        .with_context(|| format!("create upstream client for {}", upstream.base_url))?;
        Ok(Arc::new(client))
    }

    #[cfg(not(feature = "http-client"))]
    fn social_client(&self) -> Result<Arc<dyn SocialClient>> {
        Err(bioscan_upstream::UpstreamError::Unavailable(
            "built without the http-client feature".to_string(),
        )
        .into())
    }

    #[cfg(feature = "llm-enrich")]
    fn with_enrichment(&self, service: ProfileService) -> Result<ProfileService> {
        let settings = &self.config.enrichment;
        if !settings.is_active() {
            debug!("enrichment disabled");
            return Ok(service);
        }
        let api_key = settings.api_key.clone().unwrap_or_default();
        let enricher = bioscan_upstream::OpenAiEnricher::new(
            &settings.api_base,
            api_key,
            settings.model.clone(),
            self.request_timeout(),
        )
        .with_context(|| "create enrichment client")?;
        let categories = load_categories(settings.categories_path.as_deref())?;
        info!(model = %settings.model, categories = categories.len(), "enrichment enabled");
        Ok(service.with_enricher(Arc::new(enricher), categories))
    }

    #[cfg(not(feature = "llm-enrich"))]
    fn with_enrichment(&self, service: ProfileService) -> Result<ProfileService> {
        Ok(service)
    }
}

pub fn load_categories(path: Option<&Path>) -> Result<CategoryIndex> {
    let Some(path) = path else {
        return Ok(CategoryIndex::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("read categories {}", path.display()))?;
    Ok(CategoryIndex::parse(&text))
}

pub fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .with_context(|| "start async runtime")
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
