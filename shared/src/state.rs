use std::fmt;

use crate::agent::{AgentRecord, LeaderboardPayload, normalize};
use crate::period::Period;

/// What the page is currently showing, as far as banners are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Nothing fetched yet.
    Loading,
    Live,
    /// Last successful fetch had zero agents.
    Empty,
    /// Last fetch cycle failed on both sources; the previous render is kept.
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    Primary,
    Fallback,
}

impl SnapshotSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Fallback => "fallback",
        }
    }
}

/// A successfully fetched and normalized leaderboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub timestamp: Option<String>,
    pub agents: Vec<AgentRecord>,
    pub source: SnapshotSource,
}

impl Snapshot {
    pub fn from_payload(payload: &LeaderboardPayload, source: SnapshotSource) -> Self {
        Self {
            timestamp: payload.timestamp.clone(),
            agents: normalize(payload),
            source,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Request never produced a response.
    Transport(String),
    /// Response with a non-success status.
    Status(u16),
    /// Body was not JSON or had no agents array.
    Malformed(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "fetch error: {e}"),
            Self::Status(code) => write!(f, "HTTP {code}"),
            Self::Malformed(e) => write!(f, "malformed payload: {e}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Result of one primary-then-fallback fetch cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Loaded(Snapshot),
    Offline {
        primary: FetchError,
        fallback: FetchError,
    },
}

/// Issued when a fetch starts; handed back with its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    pub seq: u64,
    pub period: Period,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// New agents replaced the old ones; render them.
    Rendered,
    /// Successful fetch with zero agents; render the empty state.
    Emptied,
    /// Same timestamp as the last applied snapshot; nothing to do.
    Unchanged,
    /// Response overtaken by a newer request or a period switch; dropped.
    Stale,
    /// Both sources failed; previous render stays.
    Offline,
}

impl ApplyOutcome {
    pub fn needs_render(self) -> bool {
        matches!(self, Self::Rendered | Self::Emptied)
    }
}

/// Owned client-side leaderboard state. The only writer of the current agent list.
#[derive(Debug, Clone)]
pub struct LeaderboardState {
    period: Period,
    agents: Vec<AgentRecord>,
    last_timestamp: Option<String>,
    next_seq: u64,
    applied_seq: u64,
    last_success_ms: Option<f64>,
    status: Status,
}

impl LeaderboardState {
    pub fn new(period: Period) -> Self {
        Self {
            period,
            agents: Vec::new(),
            last_timestamp: None,
            next_seq: 0,
            applied_seq: 0,
            last_success_ms: None,
            status: Status::Loading,
        }
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn agents(&self) -> &[AgentRecord] {
        &self.agents
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn last_success_ms(&self) -> Option<f64> {
        self.last_success_ms
    }

    pub fn last_timestamp(&self) -> Option<&str> {
        self.last_timestamp.as_deref()
    }

    pub fn begin_request(&mut self) -> RequestTicket {
        self.next_seq = self.next_seq.wrapping_add(1);
        RequestTicket {
            seq: self.next_seq,
            period: self.period,
        }
    }

    /// Switch the viewed period. Clears the timestamp guard so the next
    /// snapshot renders even if its data is identical.
    pub fn set_period(&mut self, period: Period) -> bool {
        if period == self.period {
            return false;
        }
        self.period = period;
        self.last_timestamp = None;
        true
    }

    pub fn apply(&mut self, ticket: RequestTicket, outcome: FetchOutcome, now_ms: f64) -> ApplyOutcome {
        if ticket.period != self.period || ticket.seq < self.applied_seq {
            return ApplyOutcome::Stale;
        }
        self.applied_seq = ticket.seq;

        let snapshot = match outcome {
            FetchOutcome::Loaded(snapshot) => snapshot,
            FetchOutcome::Offline { .. } => {
                self.status = Status::Offline;
                return ApplyOutcome::Offline;
            }
        };
        self.last_success_ms = Some(now_ms);

        if let Some(ts) = snapshot.timestamp.as_deref()
            && self.last_timestamp.as_deref() == Some(ts)
        {
            self.status = if self.agents.is_empty() {
                Status::Empty
            } else {
                Status::Live
            };
            return ApplyOutcome::Unchanged;
        }

        self.last_timestamp = Some(
            snapshot
                .timestamp
                .unwrap_or_else(|| synthesized_timestamp(now_ms)),
        );
        self.agents = snapshot.agents;

        if self.agents.is_empty() {
            self.status = Status::Empty;
            ApplyOutcome::Emptied
        } else {
            self.status = Status::Live;
            ApplyOutcome::Rendered
        }
    }
}

fn synthesized_timestamp(now_ms: f64) -> String {
    chrono::DateTime::from_timestamp_millis(now_ms as i64)
        .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
        .unwrap_or_else(|| format!("local-{now_ms}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(timestamp: Option<&str>, json: &str) -> FetchOutcome {
        let payload = LeaderboardPayload::from_json(json).expect("payload should parse");
        let mut snap = Snapshot::from_payload(&payload, SnapshotSource::Primary);
        snap.timestamp = timestamp.map(str::to_string);
        FetchOutcome::Loaded(snap)
    }

    fn offline() -> FetchOutcome {
        FetchOutcome::Offline {
            primary: FetchError::Status(502),
            fallback: FetchError::Transport("offline".into()),
        }
    }

    const ABC: &str = r#"{"agents":[{"id":"a"},{"id":"b"},{"id":"c"}]}"#;

    #[test]
    fn same_timestamp_twice_is_unchanged() {
        let mut state = LeaderboardState::new(Period::Daily);
        let t1 = state.begin_request();
        assert_eq!(state.apply(t1, snapshot(Some("t1"), ABC), 1.0), ApplyOutcome::Rendered);
        let t2 = state.begin_request();
        assert_eq!(state.apply(t2, snapshot(Some("t1"), ABC), 2.0), ApplyOutcome::Unchanged);
        assert_eq!(state.agents().len(), 3);
        assert_eq!(state.last_success_ms(), Some(2.0));
    }

    #[test]
    fn missing_timestamp_always_renders() {
        let mut state = LeaderboardState::new(Period::Daily);
        let t1 = state.begin_request();
        state.apply(t1, snapshot(None, ABC), 1_700_000_000_000.0);
        assert_eq!(state.last_timestamp(), Some("2023-11-14T22:13:20.000Z"));
        let t2 = state.begin_request();
        assert_eq!(state.apply(t2, snapshot(None, ABC), 1_700_000_030_000.0), ApplyOutcome::Rendered);
    }

    #[test]
    fn older_response_is_discarded() {
        let mut state = LeaderboardState::new(Period::Daily);
        let slow = state.begin_request();
        let fast = state.begin_request();
        assert_eq!(state.apply(fast, snapshot(Some("new"), ABC), 1.0), ApplyOutcome::Rendered);
        assert_eq!(
            state.apply(slow, snapshot(Some("old"), r#"{"agents":[]}"#), 2.0),
            ApplyOutcome::Stale
        );
        assert_eq!(state.agents().len(), 3);
        assert_eq!(state.last_timestamp(), Some("new"));
    }

    #[test]
    fn failure_before_first_load_goes_straight_to_offline() {
        let mut state = LeaderboardState::new(Period::Daily);
        assert_eq!(state.status(), Status::Loading);
        let t1 = state.begin_request();
        assert_eq!(state.apply(t1, offline(), 1.0), ApplyOutcome::Offline);
        assert_eq!(state.status(), Status::Offline);
        assert!(state.agents().is_empty());
        assert_eq!(state.last_success_ms(), None);
    }

    #[test]
    fn offline_keeps_last_agents() {
        let mut state = LeaderboardState::new(Period::Daily);
        let t1 = state.begin_request();
        state.apply(t1, snapshot(Some("t1"), ABC), 1.0);
        let before = state.agents().to_vec();
        let t2 = state.begin_request();
        assert_eq!(state.apply(t2, offline(), 2.0), ApplyOutcome::Offline);
        assert_eq!(state.agents(), before.as_slice());
        assert_eq!(state.status(), Status::Offline);
        assert_eq!(state.last_success_ms(), Some(1.0));
    }

    #[test]
    fn recovery_after_offline_with_same_data_goes_live() {
        let mut state = LeaderboardState::new(Period::Daily);
        let t1 = state.begin_request();
        state.apply(t1, snapshot(Some("t1"), ABC), 1.0);
        let t2 = state.begin_request();
        state.apply(t2, offline(), 2.0);
        let t3 = state.begin_request();
        assert_eq!(state.apply(t3, snapshot(Some("t1"), ABC), 3.0), ApplyOutcome::Unchanged);
        assert_eq!(state.status(), Status::Live);
    }

    #[test]
    fn empty_payload_then_data() {
        let mut state = LeaderboardState::new(Period::Daily);
        let t1 = state.begin_request();
        assert_eq!(
            state.apply(t1, snapshot(Some("e"), r#"{"agents":[]}"#), 1.0),
            ApplyOutcome::Emptied
        );
        assert_eq!(state.status(), Status::Empty);
        let t2 = state.begin_request();
        assert_eq!(state.apply(t2, snapshot(Some("f"), ABC), 2.0), ApplyOutcome::Rendered);
        assert_eq!(state.status(), Status::Live);
    }

    #[test]
    fn period_switch_bypasses_timestamp_guard() {
        let mut state = LeaderboardState::new(Period::Daily);
        let t1 = state.begin_request();
        state.apply(t1, snapshot(Some("same"), ABC), 1.0);
        let in_flight = state.begin_request();

        assert!(state.set_period(Period::Weekly));
        assert!(!state.set_period(Period::Weekly));

        assert_eq!(state.apply(in_flight, snapshot(Some("same"), ABC), 2.0), ApplyOutcome::Stale);
        let t2 = state.begin_request();
        assert_eq!(t2.period, Period::Weekly);
        assert_eq!(state.apply(t2, snapshot(Some("same"), ABC), 3.0), ApplyOutcome::Rendered);
    }

    #[test]
    fn needs_render_only_for_new_data() {
        assert!(ApplyOutcome::Rendered.needs_render());
        assert!(ApplyOutcome::Emptied.needs_render());
        assert!(!ApplyOutcome::Unchanged.needs_render());
        assert!(!ApplyOutcome::Stale.needs_render());
        assert!(!ApplyOutcome::Offline.needs_render());
    }
}
