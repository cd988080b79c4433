//! Task model shared by the backend, the local cache and the sync controller.
//!
//! Records arrive from two untrusted sources (the remote store and the local
//! snapshot), so decoding is lenient: unknown fields are ignored, a missing
//! `done` flag means not done, and any priority that is not one of the three
//! known values becomes [`Priority::Medium`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefix of client-generated placeholder ids.
///
/// Remote ids are hexadecimal object ids, so a prefixed id can never collide
/// with one of them.
pub const TEMP_ID_PREFIX: &str = "tmp-";

/// Task priority, ordered so that `High > Medium > Low`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Parse a priority, falling back to `Medium` for anything unrecognized.
    pub fn normalize(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!("unknown priority '{other}'")),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Accept any JSON value so a bad priority never rejects the whole record
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(value.as_str().map(Priority::normalize).unwrap_or_default())
    }
}

/// A single to-do item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(alias = "_id")]
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Build a placeholder task that has not been acknowledged by the remote store yet.
    pub fn tentative(id: String, text: String, priority: Priority) -> Self {
        Self {
            id,
            text,
            done: false,
            priority,
            created_at: Some(Utc::now()),
        }
    }

    /// Whether this task still carries a client-generated id.
    pub fn is_temporary(&self) -> bool {
        is_temp_id(&self.id)
    }
}

pub fn is_temp_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

/// Generate a fresh placeholder id.
///
/// Version 7 UUIDs are time-ordered and monotonic within the process, so two
/// ids generated in the same millisecond still differ.
pub fn new_temp_id() -> String {
    format!("{TEMP_ID_PREFIX}{}", uuid::Uuid::now_v7().simple())
}

/// Stable sort by priority, highest first. Equal priorities keep their input order.
pub fn sort_by_priority(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| b.priority.cmp(&a.priority));
}
