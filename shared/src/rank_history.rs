use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::agent::AgentRecord;

/// Previous and current daily rank per agent id. Persisted client-side between page loads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankHistory {
    pub previous: HashMap<String, u32>,
    pub current: HashMap<String, u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankMovement {
    Up(u32),
    Down(u32),
    Steady,
    /// No previous daily rank to compare against.
    New,
}

impl RankMovement {
    /// Arrow label for a list row. Steady and new agents show nothing.
    pub fn indicator(self) -> String {
        match self {
            Self::Up(n) => format!("\u{25B2}{n}"),
            Self::Down(n) => format!("\u{25BC}{n}"),
            Self::Steady | Self::New => String::new(),
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Up(_) => "movement up",
            Self::Down(_) => "movement down",
            Self::Steady | Self::New => "movement",
        }
    }
}

impl RankHistory {
    /// Record a freshly applied daily ranking. Shifts `current` into `previous` only
    /// when the mapping actually changed, so repeated polls of the same data keep
    /// the last real movement visible. Returns whether anything changed.
    pub fn record_daily(&mut self, records: &[AgentRecord]) -> bool {
        let next: HashMap<String, u32> = records
            .iter()
            .map(|record| (record.id.clone(), record.rank))
            .collect();
        if next.is_empty() || next == self.current {
            return false;
        }
        self.previous = std::mem::replace(&mut self.current, next);
        true
    }

    pub fn movement(&self, id: &str) -> RankMovement {
        let (Some(&before), Some(&now)) = (self.previous.get(id), self.current.get(id)) else {
            return RankMovement::New;
        };
        match before.cmp(&now) {
            std::cmp::Ordering::Greater => RankMovement::Up(before - now),
            std::cmp::Ordering::Less => RankMovement::Down(now - before),
            std::cmp::Ordering::Equal => RankMovement::Steady,
        }
    }
}
