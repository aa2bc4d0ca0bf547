use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of a namespace as reported by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceInfo {
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl NamespaceInfo {
    pub fn new(name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            created_at,
            labels: BTreeMap::new(),
        }
    }
}

/// Rate interval resolved against a namespace lifetime.
///
/// `expression` is what gets forwarded to collaborators: the caller's text
/// when no clamping happened, otherwise whole seconds (`"120s"`).
/// `start` is never earlier than the namespace creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateInterval {
    pub expression: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl RateInterval {
    pub fn length(&self) -> chrono::TimeDelta {
        self.end - self.start
    }

    pub fn was_clamped(&self, requested: &str) -> bool {
        self.expression != requested
    }
}
