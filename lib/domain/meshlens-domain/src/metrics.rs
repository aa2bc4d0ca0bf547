use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reporter {
    Source,
    Destination,
}

impl Reporter {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "source" => Some(Self::Source),
            "destination" => Some(Self::Destination),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Destination => "destination",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "inbound" => Some(Self::Inbound),
            "outbound" => Some(Self::Outbound),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateFunc {
    Rate,
    Irate,
}

impl RateFunc {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "rate" => Some(Self::Rate),
            "irate" => Some(Self::Irate),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rate => "rate",
            Self::Irate => "irate",
        }
    }
}

/// Fully validated metrics query handed to the metrics backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsQuery {
    pub namespace: String,
    pub service: String,
    pub reporter: Reporter,
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_protocol: Option<String>,
    pub rate_interval: String,
    pub rate_func: RateFunc,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(with = "step_seconds")]
    pub step: TimeDelta,
    pub quantiles: Vec<String>,
    pub avg: bool,
    #[serde(default)]
    pub by_labels: Vec<String>,
    #[serde(default)]
    pub filters: Vec<String>,
}

impl MetricsQuery {
    /// Whether `name` passes the optional metric-name filter.
    pub fn wants(&self, name: &str) -> bool {
        self.filters.is_empty() || self.filters.iter().any(|filter| filter == name)
    }
}

mod step_seconds {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(step: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(step.num_seconds())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
        let seconds = i64::deserialize(deserializer)?;
        TimeDelta::try_seconds(seconds)
            .ok_or_else(|| serde::de::Error::custom("step out of range"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    pub timestamp_ms: i64,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeries {
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub points: Vec<TimeSeriesPoint>,
}

/// Metrics backend answer: plain series by metric name, histograms by
/// metric name then statistic (`avg`, `0.5`, `0.95`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResult {
    #[serde(default)]
    pub metrics: BTreeMap<String, Vec<TimeSeries>>,
    #[serde(default)]
    pub histograms: BTreeMap<String, BTreeMap<String, Vec<TimeSeries>>>,
}
