use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use meshlens_domain::{Endpoint, MetricsResult, ObjectValidation, PortMapping};

/// Mesh snapshot served by the static backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Fixture {
    pub namespaces: Vec<NamespaceFixture>,
    pub services: Vec<ServiceFixture>,
    pub validations: Vec<ValidationFixture>,
    pub metrics: Vec<MetricsFixture>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceFixture {
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceFixture {
    pub namespace: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub has_sidecar: bool,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub ports: Vec<PortMapping>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
    #[serde(default)]
    pub request_rate: f64,
    #[serde(default)]
    pub error_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFixture {
    pub namespace: String,
    pub service: String,
    #[serde(default)]
    pub objects: Vec<ObjectValidation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsFixture {
    pub namespace: String,
    pub service: String,
    #[serde(flatten)]
    pub result: MetricsResult,
}
