use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::metrics::TimeSeries;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregation {
    pub label: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chart {
    pub name: String,
    pub unit: String,
    pub spans: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<Vec<TimeSeries>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub histogram: Option<BTreeMap<String, Vec<TimeSeries>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub title: String,
    pub aggregations: Vec<Aggregation>,
    pub charts: Vec<Chart>,
}
