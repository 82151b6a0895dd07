use crate::error::invalid_input;
use anyhow::Result;
use bioscan_core::{
    apply_enrichment, normalize_username, CategoryIndex, LookupTarget, ProfileSummary,
    MAX_FOLLOWER_LIMIT,
};
use bioscan_upstream::{Enricher, FollowerEntry, SessionManager};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const MAX_BATCH_USERNAMES: usize = MAX_FOLLOWER_LIMIT;

/// Rejects empty batches and batches over `MAX_BATCH_USERNAMES`.
pub fn check_batch_size(usernames: &[String]) -> Result<()> {
    if usernames.is_empty() {
        return Err(invalid_input("usernames must not be empty"));
    }
    if usernames.len() > MAX_BATCH_USERNAMES {
        return Err(invalid_input(format!(
            "at most {MAX_BATCH_USERNAMES} usernames per batch, got {}",
            usernames.len()
        )));
    }
    Ok(())
}

/// Result of a follower lookup.
#[derive(Debug, Clone, Serialize)]
pub struct FollowersReport {
    pub target_user_id: String,
    pub target_username: Option<String>,
    pub followers: Vec<ProfileSummary>,
}

/// Fetches profiles upstream and turns them into summaries.
pub struct ProfileService {
    sessions: Arc<SessionManager>,
    enricher: Option<Arc<dyn Enricher>>,
    categories: CategoryIndex,
    request_delay: Duration,
}

impl ProfileService {
    pub fn new(sessions: Arc<SessionManager>, request_delay: Duration) -> Self {
        Self {
            sessions,
            enricher: None,
            categories: CategoryIndex::default(),
            request_delay,
        }
    }

    pub fn with_enricher(mut self, enricher: Arc<dyn Enricher>, categories: CategoryIndex) -> Self {
        self.enricher = Some(enricher);
        self.categories = categories;
        self
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    async fn resolve_user_id(&self, target: &LookupTarget) -> Result<String> {
        match target {
            LookupTarget::UserId(id) => Ok(id.clone()),
            LookupTarget::Username(username) => {
                let client = self.sessions.client();
                let user_id = self
                    .sessions
                    .with_session(|session| async move {
                        client.user_id_from_username(&session, username).await
                    })
                    .await?;
                debug!(username = %username, user_id = %user_id, "resolved user id");
                Ok(user_id)
            }
        }
    }

    async fn fetch_summary(&self, user_id: &str) -> Result<ProfileSummary> {
        let client = self.sessions.client();
        let raw = self
            .sessions
            .with_session(|session| async move { client.user_info(&session, user_id).await })
            .await?;
        let mut summary = ProfileSummary::from_raw(&raw);
        if summary.user_id.is_empty() {
            summary.user_id = user_id.to_string();
        }
        self.enrich(&mut summary).await;
        Ok(summary)
    }

    async fn enrich(&self, summary: &mut ProfileSummary) {
        let Some(enricher) = &self.enricher else {
            return;
        };
        match enricher.suggest(summary).await {
            Ok(suggestion) => {
                if apply_enrichment(summary, suggestion, &self.categories) {
                    debug!(username = %summary.username, "profile enriched");
                }
            }
            Err(err) => {
                warn!(username = %summary.username, error = %err, "enrichment failed");
            }
        }
    }

    pub async fn user_info(&self, target: &LookupTarget) -> Result<ProfileSummary> {
        let user_id = self.resolve_user_id(target).await?;
        let summary = self.fetch_summary(&user_id).await?;
        info!(
            target = %target.label(),
            has_contact = summary.has_contact(),
            "user info fetched"
        );
        Ok(summary)
    }

    /// Lists up to `limit` followers of `target` with their summaries.
    ///
    /// A follower whose details cannot be fetched is reported as a placeholder entry
    /// carrying the error instead of failing the whole lookup.
    pub async fn followers(&self, target: &LookupTarget, limit: usize) -> Result<FollowersReport> {
        let target_user_id = self.resolve_user_id(target).await?;
        let client = self.sessions.client();
        let user_id = target_user_id.as_str();
        let mut entries = self
            .sessions
            .with_session(|session| async move {
                client.user_followers(&session, user_id, limit).await
            })
            .await?;
        entries.truncate(limit);
        debug!(target = %target.label(), count = entries.len(), "followers listed");

        let mut followers = Vec::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            if idx > 0 {
                self.pause().await;
            }
            followers.push(self.follower_summary(entry).await);
        }

        info!(
            target = %target.label(),
            count = followers.len(),
            with_contact = followers.iter().filter(|p| p.has_contact()).count(),
            "followers fetched"
        );
        Ok(FollowersReport {
            target_user_id,
            target_username: target.username().map(str::to_string),
            followers,
        })
    }

    /// Summaries for each username, in input order. Failures become placeholder entries.
    pub async fn batch(&self, usernames: &[String]) -> Vec<ProfileSummary> {
        let mut profiles = Vec::with_capacity(usernames.len());
        for (idx, raw) in usernames.iter().enumerate() {
            if idx > 0 {
                self.pause().await;
            }
            let username = match normalize_username(raw) {
                Ok(username) => username,
                Err(err) => {
                    profiles.push(ProfileSummary::placeholder(raw.trim(), "", err.to_string()));
                    continue;
                }
            };
            let target = LookupTarget::Username(username.clone());
            match self.user_info(&target).await {
                Ok(summary) => profiles.push(summary),
                Err(err) => {
                    warn!(username = %username, error = %err, "batch lookup failed");
                    profiles.push(ProfileSummary::placeholder(username, "", err.to_string()));
                }
            }
        }
        profiles
    }

    async fn follower_summary(&self, entry: &FollowerEntry) -> ProfileSummary {
        match self.fetch_summary(&entry.user_id).await {
            Ok(summary) => summary,
            Err(err) => {
                warn!(user_id = %entry.user_id, error = %err, "could not fetch follower details");
                let mut placeholder = ProfileSummary::placeholder(
                    entry.username.clone(),
                    entry.user_id.clone(),
                    format!("Could not fetch detailed info: {err}"),
                );
                placeholder.full_name = entry.full_name.clone();
                placeholder
            }
        }
    }

    async fn pause(&self) {
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }
    }
}
