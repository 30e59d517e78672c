/// Data models for database entities
///
/// All models map to database tables and use sqlx for type-safe queries.

use crate::intelligence::Intent;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// A persisted command line
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoredCommand {
    pub id: i64,
    pub session_id: String,
    /// Already redacted
    pub raw_text: String,
    pub intent: Option<String>, // Intent name, NULL when the command did not classify
    pub succeeded: bool,
    pub timestamp: String, // RFC 3339
}

impl StoredCommand {
    pub fn intent(&self) -> Option<Intent> {
        self.intent.as_deref().and_then(Intent::from_name)
    }
}

/// Input for recording a new command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRecord {
    pub session_id: String,
    pub raw_text: String,
    pub intent: Option<Intent>,
    pub succeeded: bool,
}

/// The kinds of value remembered across sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Host,
    Base,
    Filter,
}

impl ValueKind {
    pub const ALL: [ValueKind; 3] = [ValueKind::Host, ValueKind::Base, ValueKind::Filter];

    /// Accepts the singular and plural spelling
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().trim_end_matches('s') {
            "host" => Some(ValueKind::Host),
            "base" => Some(ValueKind::Base),
            "filter" => Some(ValueKind::Filter),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Host => "host",
            ValueKind::Base => "base",
            ValueKind::Filter => "filter",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A remembered host, base DN or filter
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QueryValue {
    pub kind: String,
    pub value: String,
    pub usage_count: i64,
    pub last_used: String, // RFC 3339
}

/// Search results with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub command: StoredCommand,
    pub score: f64, // Fuzzy match score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_command_intent() {
        let mut cmd = StoredCommand {
            id: 1,
            session_id: "s".to_string(),
            raw_text: "search host dc=x".to_string(),
            intent: Some("search".to_string()),
            succeeded: true,
            timestamp: "2026-01-01T00:00:00+00:00".to_string(),
        };
        assert_eq!(cmd.intent(), Some(Intent::Search));

        cmd.intent = None;
        assert_eq!(cmd.intent(), None);
    }

    #[test]
    fn test_value_kind_display() {
        assert_eq!(ValueKind::Host.to_string(), "host");
        assert_eq!(ValueKind::Base.as_str(), "base");
        assert_eq!(ValueKind::from_name("Filters"), Some(ValueKind::Filter));
        assert_eq!(ValueKind::from_name("hosts"), Some(ValueKind::Host));
        assert_eq!(ValueKind::from_name("dn"), None);
    }
}
