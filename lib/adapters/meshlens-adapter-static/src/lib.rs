//! Fixture-backed implementations of every collaborator port.

pub mod fixture;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use meshlens_domain::{
    CollaboratorError, MetricsQuery, MetricsResult, NamespaceInfo, RequestHealth,
    ServiceDefinition, ServiceDetails, ServiceOverview, TimeSeries, ValidationSet,
};
use meshlens_ports::{
    MetricsPort, NamespacePort, PortResult, PortSet, ServicePort, ValidationsPort,
};

pub use fixture::Fixture;
use fixture::ServiceFixture;

#[derive(Debug, Clone, Default)]
pub struct StaticBackend {
    fixture: Arc<Fixture>,
}

impl StaticBackend {
    pub fn new(fixture: Fixture) -> Self {
        Self {
            fixture: Arc::new(fixture),
        }
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let fixture: Fixture = serde_yaml::from_str(raw).context("failed to parse fixture YAML")?;
        Ok(Self::new(fixture))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read fixture at {}", path.display()))?;
        let backend = Self::from_yaml(&raw)
            .with_context(|| format!("invalid fixture at {}", path.display()))?;
        debug!(
            path = %path.display(),
            namespaces = backend.fixture.namespaces.len(),
            services = backend.fixture.services.len(),
            "fixture loaded"
        );
        Ok(backend)
    }

    pub fn port_set(self) -> PortSet {
        let backend = Arc::new(self);
        PortSet {
            namespaces: backend.clone(),
            services: backend.clone(),
            validations: backend.clone(),
            metrics: backend,
        }
    }

    fn namespace_info(&self, namespace: &str) -> PortResult<NamespaceInfo> {
        self.fixture
            .namespaces
            .iter()
            .find(|candidate| candidate.name == namespace)
            .map(|found| NamespaceInfo {
                name: found.name.clone(),
                created_at: found.created_at,
                labels: found.labels.clone(),
            })
            .ok_or_else(|| CollaboratorError::not_found(format!("namespace {namespace:?} not found")))
    }

    fn service(&self, namespace: &str, service: &str) -> PortResult<&ServiceFixture> {
        self.namespace_info(namespace)?;
        self.fixture
            .services
            .iter()
            .find(|candidate| candidate.namespace == namespace && candidate.name == service)
            .ok_or_else(|| {
                CollaboratorError::not_found(format!(
                    "service {service:?} not found in namespace {namespace:?}"
                ))
            })
    }
}

#[async_trait]
impl NamespacePort for StaticBackend {
    async fn get_namespace(&self, namespace: &str) -> PortResult<NamespaceInfo> {
        self.namespace_info(namespace)
    }
}

#[async_trait]
impl ServicePort for StaticBackend {
    async fn get_service_list(&self, namespace: &str) -> PortResult<Vec<ServiceOverview>> {
        self.namespace_info(namespace)?;
        Ok(self
            .fixture
            .services
            .iter()
            .filter(|candidate| candidate.namespace == namespace)
            .map(|found| ServiceOverview {
                name: found.name.clone(),
                has_sidecar: found.has_sidecar,
            })
            .collect())
    }

    async fn get_service(
        &self,
        namespace: &str,
        service: &str,
        rate_interval: &str,
        _query_time: DateTime<Utc>,
    ) -> PortResult<ServiceDetails> {
        let found = self.service(namespace, service)?;
        Ok(ServiceDetails {
            service: ServiceDefinition {
                name: found.name.clone(),
                namespace: found.namespace.clone(),
                created_at: found.created_at,
                service_type: found
                    .service_type
                    .clone()
                    .unwrap_or_else(|| "ClusterIP".to_string()),
                ip: found.ip.clone(),
                ports: found.ports.clone(),
                labels: found.labels.clone(),
            },
            endpoints: found.endpoints.clone(),
            health: RequestHealth {
                rate_interval: rate_interval.to_string(),
                request_rate: found.request_rate,
                error_ratio: found.error_ratio,
            },
            validations: None,
        })
    }
}

#[async_trait]
impl ValidationsPort for StaticBackend {
    async fn get_validations(&self, namespace: &str, service: &str) -> PortResult<ValidationSet> {
        self.service(namespace, service)?;
        Ok(self
            .fixture
            .validations
            .iter()
            .filter(|entry| entry.namespace == namespace && entry.service == service)
            .flat_map(|entry| entry.objects.iter().cloned())
            .collect())
    }
}

#[async_trait]
impl MetricsPort for StaticBackend {
    async fn get_metrics(&self, query: &MetricsQuery) -> PortResult<MetricsResult> {
        self.service(&query.namespace, &query.service)?;
        let mut result = MetricsResult::default();
        let entries = self
            .fixture
            .metrics
            .iter()
            .filter(|entry| entry.namespace == query.namespace && entry.service == query.service);
        for entry in entries {
            for (name, series) in &entry.result.metrics {
                if query.wants(name) {
                    result
                        .metrics
                        .entry(name.clone())
                        .or_default()
                        .extend(series.iter().map(|s| within_window(s, query)));
                }
            }
            for (name, stats) in &entry.result.histograms {
                if !query.wants(name) {
                    continue;
                }
                let histogram = result.histograms.entry(name.clone()).or_default();
                for (stat, series) in stats {
                    if stat != "avg" && !query.quantiles.contains(stat) {
                        continue;
                    }
                    if stat == "avg" && !query.avg {
                        continue;
                    }
                    histogram
                        .entry(stat.clone())
                        .or_default()
                        .extend(series.iter().map(|s| within_window(s, query)));
                }
            }
        }
        Ok(result)
    }
}

fn within_window(series: &TimeSeries, query: &MetricsQuery) -> TimeSeries {
    let start = query.start.timestamp_millis();
    let end = query.end.timestamp_millis();
    TimeSeries {
        labels: series.labels.clone(),
        points: series
            .points
            .iter()
            .filter(|point| point.timestamp_ms >= start && point.timestamp_ms <= end)
            .copied()
            .collect(),
    }
}
