use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

/// Per-date completion marker. `timestamp` is the last time the record was
/// written, not necessarily when it first became completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub date: String,
    pub completed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completions: Vec<CompletionRecord>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default)]
    pub scheduled_time: Option<String>,
}

impl Task {
    pub fn completion_for(&self, date_key: &str) -> Option<&CompletionRecord> {
        self.completions.iter().find(|record| record.date == date_key)
    }

    pub fn completion_for_mut(&mut self, date_key: &str) -> Option<&mut CompletionRecord> {
        self.completions
            .iter_mut()
            .find(|record| record.date == date_key)
    }
}

/// A copy of a bank task taken when the day's selection was generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTask {
    #[serde(flatten)]
    pub task: Task,
    pub order: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOption {
    MostUsed,
    #[default]
    RecentlyUsed,
    Alphabetical,
}

impl SortOption {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MostUsed => "mostUsed",
            Self::RecentlyUsed => "recentlyUsed",
            Self::Alphabetical => "alphabetical",
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOption {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let cleaned: String = raw
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric())
            .map(|ch| ch.to_ascii_lowercase())
            .collect();
        match cleaned.as_str() {
            "mostused" | "most" => Ok(Self::MostUsed),
            "recentlyused" | "recent" => Ok(Self::RecentlyUsed),
            "alphabetical" | "alpha" | "az" => Ok(Self::Alphabetical),
            _ => Err(format!("unknown sort option '{}'", raw.trim())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}
