use std::fmt;

use serde::{Deserialize, Serialize};

/// Aggregation window for leaderboard figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Period {
    pub const ALL: [Period; 3] = [Period::Daily, Period::Weekly, Period::Monthly];

    /// Strict parse of a query value. Case-insensitive, surrounding whitespace ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }

    /// Resolve a URL fragment (`#weekly`, `weekly`, `""`). Anything unrecognized is daily.
    pub fn from_fragment(fragment: &str) -> Self {
        let trimmed = fragment.trim();
        let raw = trimmed.strip_prefix('#').unwrap_or(trimmed);
        Self::parse(raw).unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
        }
    }

    pub fn subtitle(self) -> String {
        format!("{} sales \u{2014} updated automatically", self.label())
    }

    /// File name of the static snapshot for this period.
    pub fn snapshot_file_name(self) -> String {
        format!("leaderboard-{}.json", self.as_str())
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
