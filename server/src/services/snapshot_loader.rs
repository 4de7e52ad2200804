use std::fmt;
use std::io;

use bytes::Bytes;
use podium_shared::{PayloadError, Period};
use tracing::{debug, info, warn};

use crate::config::snapshot_reload_interval;
use crate::state::AppState;

#[derive(Debug)]
pub enum LoadError {
    Io(io::Error),
    Payload(PayloadError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "read failed: {e}"),
            Self::Payload(e) => write!(f, "invalid snapshot: {e}"),
        }
    }
}

/// Re-read the snapshot directory on a fixed interval. The startup load in
/// `main` already happened, so the immediate first tick is skipped.
pub async fn run(state: AppState) {
    let mut interval = tokio::time::interval(snapshot_reload_interval());
    interval.tick().await;

    loop {
        interval.tick().await;
        reload_all(&state).await;
    }
}

/// Load every period's file. Returns how many periods are being served afterwards.
pub async fn reload_all(state: &AppState) -> usize {
    for period in Period::ALL {
        match load_period(state, period).await {
            Ok(true) => {
                if let Some(snapshot) = state.snapshot(period).await {
                    info!(
                        %period,
                        revision = snapshot.revision,
                        agents = snapshot.agent_count,
                        "loaded leaderboard snapshot"
                    );
                }
            }
            Ok(false) => {}
            Err(LoadError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                debug!(%period, "no snapshot file for period");
            }
            Err(e) => {
                warn!(%period, error = %e, "keeping previous leaderboard snapshot");
            }
        }
    }
    state.snapshots.read().await.len()
}

async fn load_period(state: &AppState, period: Period) -> Result<bool, LoadError> {
    let path = state.data_dir.join(period.snapshot_file_name());
    let body = tokio::fs::read(&path).await.map_err(LoadError::Io)?;
    state
        .install(period, Bytes::from(body))
        .await
        .map_err(LoadError::Payload)
}
