use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::roster;

/// One leaderboard entry for the current period, after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: String,
    pub rank: u32,
    pub name: String,
    pub team: String,
    pub avatar_url: String,
    pub amount: f64,
    pub sales: u64,
}

/// One agent as it arrives on the wire. Every field is optional and loosely typed;
/// [`normalize`] is the only place that interprets them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAgent {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub rank: Option<Value>,
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub amount: Option<Value>,
    #[serde(default)]
    pub points: Option<Value>,
    #[serde(default)]
    pub sales: Option<Value>,
    #[serde(default)]
    pub team: Option<Value>,
    #[serde(default)]
    pub avatar: Option<Value>,
    #[serde(default)]
    pub avatar_url: Option<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct LeaderboardPayload {
    pub timestamp: Option<String>,
    pub agents: Vec<RawAgent>,
}

#[derive(Debug)]
pub enum PayloadError {
    /// Body was not JSON at all.
    Json(serde_json::Error),
    /// JSON, but without an `agents` array.
    MissingAgents,
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(e) => write!(f, "invalid JSON: {e}"),
            Self::MissingAgents => f.write_str("payload has no agents array"),
        }
    }
}

impl std::error::Error for PayloadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::MissingAgents => None,
        }
    }
}

impl LeaderboardPayload {
    pub fn from_json(text: &str) -> Result<Self, PayloadError> {
        let value: Value = serde_json::from_str(text).map_err(PayloadError::Json)?;
        Self::from_value(value)
    }

    /// Same as [`Self::from_json`] for raw bytes, e.g. a snapshot file read from disk.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, PayloadError> {
        let value: Value = serde_json::from_slice(bytes).map_err(PayloadError::Json)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, PayloadError> {
        let Value::Object(mut root) = value else {
            return Err(PayloadError::MissingAgents);
        };
        let Some(Value::Array(entries)) = root.remove("agents") else {
            return Err(PayloadError::MissingAgents);
        };

        let timestamp = root
            .remove("timestamp")
            .and_then(|v| coerce_string(&v))
            .filter(|s| !s.is_empty());

        // A malformed entry still occupies its slot so array-position ranks stay aligned.
        let agents = entries
            .into_iter()
            .map(|entry| match entry {
                Value::Object(_) => serde_json::from_value(entry).unwrap_or_default(),
                _ => RawAgent::default(),
            })
            .collect();

        Ok(Self { timestamp, agents })
    }
}

/// Stable identity for an agent across refresh cycles.
///
/// Explicit ids win when non-blank; otherwise the key is derived from the
/// lowercased, trimmed name and team. The two forms are namespaced so a derived
/// key can never equal an explicit id.
pub fn stable_id(explicit: Option<&str>, name: &str, team: &str) -> String {
    if let Some(id) = explicit.map(str::trim).filter(|id| !id.is_empty()) {
        return format!("id:{id}");
    }
    format!(
        "nt:{}|{}",
        name.trim().to_lowercase(),
        team.trim().to_lowercase()
    )
}

/// Convert a wire payload into rank-ordered records.
pub fn normalize(payload: &LeaderboardPayload) -> Vec<AgentRecord> {
    let mut seen: HashMap<String, u32> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::new();
    let mut records: Vec<AgentRecord> = payload
        .agents
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let name = raw.name.as_ref().and_then(coerce_string).unwrap_or_default();
            let team = raw
                .team
                .as_ref()
                .and_then(coerce_string)
                .filter(|t| !t.trim().is_empty())
                .or_else(|| roster::team_for_name(&name).map(str::to_string))
                .unwrap_or_default();
            let avatar_url = raw
                .avatar
                .as_ref()
                .and_then(coerce_string)
                .filter(|a| !a.is_empty())
                .or_else(|| raw.avatar_url.as_ref().and_then(coerce_string))
                .unwrap_or_default();
            let amount = raw
                .amount
                .as_ref()
                .or(raw.points.as_ref())
                .map(coerce_amount)
                .unwrap_or(0.0);
            let sales = raw.sales.as_ref().map(coerce_count).unwrap_or(0);
            let rank = raw
                .rank
                .as_ref()
                .and_then(coerce_rank)
                .unwrap_or(index as u32 + 1);

            let explicit = raw.id.as_ref().and_then(coerce_string);
            let base = stable_id(explicit.as_deref(), &name, &team);
            let occurrences = seen.entry(base.clone()).or_insert(0);
            *occurrences += 1;
            let mut id = if *occurrences > 1 {
                format!("{base}#{occurrences}")
            } else {
                base.clone()
            };
            // A suffix can land on another record's real id; skip past it.
            while !taken.insert(id.clone()) {
                *occurrences += 1;
                id = format!("{base}#{occurrences}");
            }

            AgentRecord {
                id,
                rank,
                name,
                team,
                avatar_url,
                amount,
                sales,
            }
        })
        .collect();

    records.sort_by_key(|record| record.rank);
    records
}

fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn coerce_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn coerce_amount(value: &Value) -> f64 {
    coerce_f64(value).filter(|v| *v > 0.0).unwrap_or(0.0)
}

fn coerce_count(value: &Value) -> u64 {
    coerce_f64(value)
        .filter(|v| *v > 0.0)
        .map(|v| v.floor() as u64)
        .unwrap_or(0)
}

fn coerce_rank(value: &Value) -> Option<u32> {
    coerce_f64(value)
        .filter(|v| *v >= 1.0 && *v <= u32::MAX as f64)
        .map(|v| v.floor() as u32)
}
