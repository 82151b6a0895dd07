use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

const APP_DIR: &str = "bioscan";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5001;
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 500;
pub const MAX_REQUEST_DELAY_MS: u64 = 60_000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_UPSTREAM_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_ENRICHMENT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_ENRICHMENT_API_BASE: &str = "https://api.openai.com/v1";

pub const ENV_HOST: &str = "BIOSCAN_HOST";
pub const ENV_PORT: &str = "BIOSCAN_PORT";
pub const ENV_UPSTREAM_URL: &str = "BIOSCAN_UPSTREAM_URL";
pub const ENV_USERNAME: &str = "BIOSCAN_USERNAME";
pub const ENV_PASSWORD: &str = "BIOSCAN_PASSWORD";
pub const ENV_DATA_DIR: &str = "BIOSCAN_DATA_DIR";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub enrichment: EnrichmentConfig,
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_delay_ms: u64,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub session_path: Option<PathBuf>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    pub enabled: bool,
    pub model: String,
    pub api_base: String,
    pub api_key: Option<String>,
    pub categories_path: Option<PathBuf>,
}

impl EnrichmentConfig {
    /// Enrichment runs only when switched on and a key is available.
    pub fn is_active(&self) -> bool {
        self.enabled && self.api_key.as_deref().is_some_and(|key| !key.is_empty())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_HOST.to_string(),
                port: DEFAULT_PORT,
                request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
                request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            },
            upstream: UpstreamConfig {
                base_url: DEFAULT_UPSTREAM_URL.to_string(),
                username: None,
                password: None,
                session_path: None,
                user_agent: None,
            },
            enrichment: EnrichmentConfig {
                enabled: false,
                model: DEFAULT_ENRICHMENT_MODEL.to_string(),
                api_base: DEFAULT_ENRICHMENT_API_BASE.to_string(),
                api_key: None,
                categories_path: None,
            },
            data_dir: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("config file permissions too permissive: {0}")]
    InsecurePermissions(PathBuf),
    #[error("invalid port: {0}")]
    InvalidPort(u16),
    #[error("invalid request_delay_ms value: {0}")]
    InvalidRequestDelay(u64),
    #[error("invalid request_timeout_secs value: {0}")]
    InvalidRequestTimeout(u64),
    #[error("invalid upstream base_url: {0}")]
    InvalidUpstreamUrl(String),
    #[error("invalid enrichment api_base: {0}")]
    InvalidEnrichmentUrl(String),
    #[error("invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    server: Option<ServerFile>,
    upstream: Option<UpstreamFile>,
    enrichment: Option<EnrichmentFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ServerFile {
    host: Option<String>,
    port: Option<u16>,
    request_delay_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct UpstreamFile {
    base_url: Option<String>,
    username: Option<String>,
    password: Option<String>,
    session_path: Option<PathBuf>,
    user_agent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct EnrichmentFile {
    enabled: Option<bool>,
    model: Option<String>,
    api_base: Option<String>,
    categories_path: Option<PathBuf>,
}

/// Loads the config file (if any), then applies environment overrides.
pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let base = load_file(config_path)?;
    apply_overrides(base, |key| env::var(key).ok())
}

fn load_file(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    ensure_permissions(path)?;
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();
    config.data_dir = parsed.data_dir;

    if let Some(server) = parsed.server {
        if let Some(host) = server.host {
            config.server.host = host;
        }
        if let Some(port) = server.port {
            config.server.port = port;
        }
        if let Some(delay) = server.request_delay_ms {
            config.server.request_delay_ms = delay;
        }
        if let Some(timeout) = server.request_timeout_secs {
            config.server.request_timeout_secs = timeout;
        }
    }

    if let Some(upstream) = parsed.upstream {
        if let Some(base_url) = upstream.base_url {
            config.upstream.base_url = base_url;
        }
        config.upstream.username = upstream.username;
        config.upstream.password = upstream.password;
        config.upstream.session_path = upstream.session_path;
        config.upstream.user_agent = upstream.user_agent;
    }

    if let Some(enrichment) = parsed.enrichment {
        if let Some(enabled) = enrichment.enabled {
            config.enrichment.enabled = enabled;
        }
        if let Some(model) = enrichment.model {
            config.enrichment.model = model;
        }
        if let Some(api_base) = enrichment.api_base {
            config.enrichment.api_base = api_base;
        }
        config.enrichment.categories_path = enrichment.categories_path;
    }

    validate(&config)?;
    Ok(config)
}

/// Applies environment overrides on top of `config`. `lookup` returns the raw variable value.
pub fn apply_overrides<F>(mut config: AppConfig, lookup: F) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| {
        lookup(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };

    if let Some(host) = get(ENV_HOST) {
        config.server.host = host;
    }
    if let Some(port) = get(ENV_PORT) {
        config.server.port = port.parse().map_err(|_| ConfigError::InvalidEnv {
            key: ENV_PORT,
            value: port.clone(),
        })?;
    }
    if let Some(base_url) = get(ENV_UPSTREAM_URL) {
        config.upstream.base_url = base_url;
    }
    if let Some(username) = get(ENV_USERNAME) {
        config.upstream.username = Some(username);
    }
    if let Some(password) = get(ENV_PASSWORD) {
        config.upstream.password = Some(password);
    }
    if let Some(dir) = get(ENV_DATA_DIR) {
        config.data_dir = Some(PathBuf::from(dir));
    }
    if let Some(key) = get(ENV_OPENAI_API_KEY) {
        config.enrichment.api_key = Some(key);
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &AppConfig) -> Result<()> {
    if config.server.port == 0 {
        return Err(ConfigError::InvalidPort(config.server.port));
    }
    if config.server.request_delay_ms > MAX_REQUEST_DELAY_MS {
        return Err(ConfigError::InvalidRequestDelay(
            config.server.request_delay_ms,
        ));
    }
    let timeout = config.server.request_timeout_secs;
    if timeout == 0 || timeout > MAX_REQUEST_TIMEOUT_SECS {
        return Err(ConfigError::InvalidRequestTimeout(timeout));
    }
    if !is_http_url(&config.upstream.base_url) {
        return Err(ConfigError::InvalidUpstreamUrl(
            config.upstream.base_url.clone(),
        ));
    }
    if !is_http_url(&config.enrichment.api_base) {
        return Err(ConfigError::InvalidEnrichmentUrl(
            config.enrichment.api_base.clone(),
        ));
    }
    Ok(())
}

fn is_http_url(raw: &str) -> bool {
    Url::parse(raw).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

#[cfg(unix)]
fn ensure_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mode = metadata.permissions().mode();
    if mode & 0o077 != 0 {
        return Err(ConfigError::InsecurePermissions(path.to_path_buf()));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
