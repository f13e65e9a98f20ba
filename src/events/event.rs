//! Event feed message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Kind of event published on the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// A target's health flag (snapshot or transition).
    Status,
    /// A request was routed.
    Request,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Status => "status",
            EventKind::Request => "request",
        }
    }
}

/// One message on the event feed.
///
/// Wire format:
/// `{"Server":..,"Healthy":..,"MessageType":"status"|"request","Timestamp":..,"Skipped":"a, b"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StatusEvent {
    pub server: String,
    pub healthy: bool,
    pub message_type: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "join_skipped",
        deserialize_with = "split_skipped"
    )]
    pub skipped: Vec<String>,
}

impl StatusEvent {
    /// Current health of a target, without timestamp (catch-up snapshot).
    pub fn status(server: impl Into<String>, healthy: bool) -> Self {
        Self {
            server: server.into(),
            healthy,
            message_type: EventKind::Status,
            timestamp: None,
            skipped: Vec::new(),
        }
    }

    /// A health flag transition observed at `at`.
    pub fn transition(server: impl Into<String>, healthy: bool, at: DateTime<Utc>) -> Self {
        Self {
            timestamp: Some(at),
            ..Self::status(server, healthy)
        }
    }

    /// A routed request. `healthy` is false when the target was chosen by fallback.
    pub fn request(
        server: impl Into<String>,
        healthy: bool,
        skipped: Vec<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            server: server.into(),
            healthy,
            message_type: EventKind::Request,
            timestamp: Some(at),
            skipped,
        }
    }
}

fn join_skipped<S: Serializer>(skipped: &[String], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&skipped.join(", "))
}

fn split_skipped<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let joined = String::deserialize(deserializer)?;
    Ok(joined
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect())
}
