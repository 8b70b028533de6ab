//! Ranked standings pushed by the server.
//!
//! Entries are kept as the server sent them. The client never merges, sorts or
//! re-ranks; a new board replaces the old one wholesale.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row of the leaderboard.
///
/// Typically `{"name": "...", "score": 10}`, but the shape belongs to the
/// server and is preserved untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeaderBoardEntry(Value);

impl LeaderBoardEntry {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Display name, if the entry carries a string `name` field.
    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// Numeric `score`, if present.
    pub fn score(&self) -> Option<f64> {
        self.0.get("score").and_then(Value::as_f64)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for LeaderBoardEntry {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeaderBoard(Vec<LeaderBoardEntry>);

impl LeaderBoard {
    pub fn new(entries: Vec<LeaderBoardEntry>) -> Self {
        Self(entries)
    }

    pub fn entries(&self) -> &[LeaderBoardEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LeaderBoardEntry> {
        self.0.iter()
    }
}

impl FromIterator<LeaderBoardEntry> for LeaderBoard {
    fn from_iter<I: IntoIterator<Item = LeaderBoardEntry>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a LeaderBoard {
    type Item = &'a LeaderBoardEntry;
    type IntoIter = std::slice::Iter<'a, LeaderBoardEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
