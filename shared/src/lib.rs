pub mod agent;
pub mod cache_bust;
pub mod format;
pub mod period;
pub mod rank_history;
pub mod reconcile;
pub mod roster;
pub mod state;

pub use agent::{AgentRecord, LeaderboardPayload, PayloadError, normalize, stable_id};
pub use period::Period;
pub use rank_history::{RankHistory, RankMovement};
pub use state::{
    ApplyOutcome, FetchError, FetchOutcome, LeaderboardState, RequestTicket, Snapshot,
    SnapshotSource, Status,
};
