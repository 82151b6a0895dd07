use crate::client::{Credentials, SessionState, SocialClient};
use crate::error::{Result, UpstreamError};
use std::fs;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
struct SessionSlot {
    credentials: Option<Credentials>,
    session: Option<SessionState>,
}

/// Owns the login lifecycle against a `SocialClient`.
///
/// A session is reused while it lasts, restored from the session file when possible and
/// otherwise obtained by logging in with the configured credentials.
pub struct SessionManager {
    client: Arc<dyn SocialClient>,
    session_path: Option<PathBuf>,
    slot: Mutex<SessionSlot>,
}

impl SessionManager {
    pub fn new(
        client: Arc<dyn SocialClient>,
        credentials: Option<Credentials>,
        session_path: Option<PathBuf>,
    ) -> Self {
        Self {
            client,
            session_path,
            slot: Mutex::new(SessionSlot {
                credentials,
                session: None,
            }),
        }
    }

    pub fn client(&self) -> &dyn SocialClient {
        self.client.as_ref()
    }

    pub async fn acquire(&self) -> Result<SessionState> {
        let mut slot = self.slot.lock().await;
        if let Some(session) = &slot.session {
            return Ok(session.clone());
        }

        if let Some(cached) = self.load_cached(slot.credentials.as_ref()) {
            match self.client.validate(&cached).await {
                Ok(true) => {
                    debug!(username = %cached.username, "restored cached session");
                    slot.session = Some(cached.clone());
                    return Ok(cached);
                }
                Ok(false) => debug!("cached session rejected"),
                Err(err) => warn!(error = %err, "could not validate cached session"),
            }
        }

        let session = self.login_locked(&mut slot).await?;
        Ok(session)
    }

    /// Drops the current session and logs in again.
    pub async fn refresh(&self) -> Result<SessionState> {
        let mut slot = self.slot.lock().await;
        slot.session = None;
        self.login_locked(&mut slot).await
    }

    pub async fn release(&self) -> Result<()> {
        let mut slot = self.slot.lock().await;
        slot.session = None;
        if let Some(path) = &self.session_path {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    /// Logs in with `credentials` and keeps them for later refreshes.
    ///
    /// On failure the previous credentials and session stay in place.
    pub async fn login_with(&self, credentials: Credentials) -> Result<SessionState> {
        let mut slot = self.slot.lock().await;
        let session = self.client.login(&credentials).await?;
        info!(username = %session.username, "logged in");
        self.persist(&session);
        slot.credentials = Some(credentials);
        slot.session = Some(session.clone());
        Ok(session)
    }

    /// Runs `op` with a live session, re-logging in and retrying once when the session expired.
    pub async fn with_session<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: Fn(SessionState) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let session = self.acquire().await?;
        match op(session).await {
            Err(UpstreamError::LoginRequired) => {
                warn!("session expired, logging in again");
                let session = self.refresh().await?;
                op(session).await
            }
            other => other,
        }
    }

    async fn login_locked(&self, slot: &mut SessionSlot) -> Result<SessionState> {
        let credentials = slot
            .credentials
            .as_ref()
            .ok_or(UpstreamError::MissingCredentials)?;
        let session = self.client.login(credentials).await?;
        info!(username = %session.username, "logged in");
        self.persist(&session);
        slot.session = Some(session.clone());
        Ok(session)
    }

    fn load_cached(&self, credentials: Option<&Credentials>) -> Option<SessionState> {
        let path = self.session_path.as_deref()?;
        let cached = match read_session(path) {
            Ok(Some(cached)) => cached,
            Ok(None) => return None,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "could not read session file");
                return None;
            }
        };
        match credentials {
            Some(credentials) if credentials.username != cached.username => None,
            _ => Some(cached),
        }
    }

    fn persist(&self, session: &SessionState) {
        let Some(path) = self.session_path.as_deref() else {
            return;
        };
        if let Err(err) = write_session(path, session) {
            warn!(path = %path.display(), error = %err, "could not save session file");
        }
    }
}

pub fn read_session(path: &Path) -> Result<Option<SessionState>> {
    let contents = match fs::read(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    Ok(Some(serde_json::from_slice(&contents)?))
}

pub fn write_session(path: &Path, session: &SessionState) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_vec(session)?;
    write_private(path, &body)?;
    Ok(())
}

#[cfg(unix)]
fn write_private(path: &Path, body: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(body)
}

#[cfg(not(unix))]
fn write_private(path: &Path, body: &[u8]) -> std::io::Result<()> {
    fs::write(path, body)
}
