use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use podium_shared::{LeaderboardPayload, PayloadError, Period};
use tokio::sync::RwLock;

use crate::config;

/// A validated snapshot file, kept as the exact bytes that were read.
#[derive(Debug, Clone)]
pub struct LoadedSnapshot {
    /// Process-wide counter, bumped whenever any period's content changes.
    pub revision: u64,
    pub timestamp: Option<String>,
    pub agent_count: usize,
    pub loaded_at: DateTime<Utc>,
    pub json: Arc<Bytes>,
}

impl LoadedSnapshot {
    pub fn etag(&self, period: Period) -> String {
        format!("\"leaderboard-{period}-{}\"", self.revision)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub snapshots: Arc<RwLock<HashMap<Period, LoadedSnapshot>>>,
    next_revision: Arc<AtomicU64>,
    pub data_dir: Arc<PathBuf>,
    pub static_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(data_dir: PathBuf, static_dir: PathBuf) -> Self {
        Self {
            snapshots: Arc::new(RwLock::new(HashMap::new())),
            next_revision: Arc::new(AtomicU64::new(0)),
            data_dir: Arc::new(data_dir),
            static_dir: Arc::new(static_dir),
        }
    }

    pub fn from_env() -> Self {
        Self::new(config::data_dir(), config::static_dir())
    }

    /// Validate `body` and make it the served snapshot for `period`.
    ///
    /// Returns `Ok(false)` when the bytes are identical to what is already
    /// served, so the revision (and ETag) only moves on real changes. A body
    /// that fails validation leaves the previous snapshot in place.
    pub async fn install(&self, period: Period, body: Bytes) -> Result<bool, PayloadError> {
        let payload = LeaderboardPayload::from_slice(&body)?;

        let mut snapshots = self.snapshots.write().await;
        if let Some(current) = snapshots.get(&period)
            && current.json.as_ref() == &body
        {
            return Ok(false);
        }

        let revision = self.next_revision.fetch_add(1, Ordering::Relaxed) + 1;
        snapshots.insert(
            period,
            LoadedSnapshot {
                revision,
                timestamp: payload.timestamp,
                agent_count: payload.agents.len(),
                loaded_at: Utc::now(),
                json: Arc::new(body),
            },
        );
        Ok(true)
    }

    pub async fn snapshot(&self, period: Period) -> Option<LoadedSnapshot> {
        self.snapshots.read().await.get(&period).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::new(PathBuf::from("data"), PathBuf::from("dist"))
    }

    #[tokio::test]
    async fn install_bumps_revision_only_on_change() {
        let state = state();
        let body = Bytes::from_static(br#"{"timestamp":"t1","agents":[{"name":"A"}]}"#);

        assert!(state.install(Period::Daily, body.clone()).await.expect("valid"));
        let first = state.snapshot(Period::Daily).await.expect("loaded");
        assert_eq!(first.revision, 1);
        assert_eq!(first.agent_count, 1);
        assert_eq!(first.timestamp.as_deref(), Some("t1"));

        assert!(!state.install(Period::Daily, body).await.expect("valid"));
        let again = state.snapshot(Period::Daily).await.expect("loaded");
        assert_eq!(again.revision, 1);

        let changed = Bytes::from_static(br#"{"timestamp":"t2","agents":[]}"#);
        assert!(state.install(Period::Daily, changed).await.expect("valid"));
        assert_eq!(state.snapshot(Period::Daily).await.expect("loaded").revision, 2);
    }

    #[tokio::test]
    async fn invalid_body_keeps_last_good_snapshot() {
        let state = state();
        let good = Bytes::from_static(br#"{"agents":[{"name":"A"},{"name":"B"}]}"#);
        state.install(Period::Weekly, good).await.expect("valid");

        let bad = Bytes::from_static(br#"{"timestamp":"t9"}"#);
        assert!(matches!(
            state.install(Period::Weekly, bad).await,
            Err(PayloadError::MissingAgents)
        ));
        let kept = state.snapshot(Period::Weekly).await.expect("still loaded");
        assert_eq!(kept.agent_count, 2);
    }

    #[test]
    fn etag_names_period_and_revision() {
        let snapshot = LoadedSnapshot {
            revision: 7,
            timestamp: None,
            agent_count: 0,
            loaded_at: Utc::now(),
            json: Arc::new(Bytes::new()),
        };
        assert_eq!(snapshot.etag(Period::Monthly), "\"leaderboard-monthly-7\"");
    }
}
