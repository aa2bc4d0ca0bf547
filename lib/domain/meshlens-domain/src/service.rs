use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::namespace::NamespaceInfo;
use crate::validation::ValidationSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOverview {
    pub name: String,
    #[serde(default)]
    pub has_sidecar: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceList {
    pub namespace: NamespaceInfo,
    pub services: Vec<ServiceOverview>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    pub name: String,
    pub protocol: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDefinition {
    pub name: String,
    pub namespace: String,
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_service_type")]
    pub service_type: String,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub ports: Vec<PortMapping>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

fn default_service_type() -> String {
    "ClusterIP".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub ip: String,
    #[serde(default)]
    pub pod: Option<String>,
}

/// Request-rate based health computed over the resolved rate interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestHealth {
    pub rate_interval: String,
    pub request_rate: f64,
    pub error_ratio: f64,
}

/// Detail payload for one service.
///
/// `validations` is only ever populated by the aggregation step, and only
/// when the caller asked for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDetails {
    pub service: ServiceDefinition,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
    pub health: RequestHealth,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validations: Option<ValidationSet>,
}
