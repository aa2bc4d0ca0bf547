//! In-memory port fakes with call counters.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use meshlens_domain::{
    CollaboratorError, Endpoint, MetricsQuery, MetricsResult, NamespaceInfo, ObjectValidation,
    PortMapping, RequestHealth, ServiceDefinition, ServiceDetails, ServiceOverview, Severity,
    TimeSeries, TimeSeriesPoint, ValidationCheck, ValidationSet,
};
use meshlens_ports::{
    MetricsPort, NamespacePort, PortProvider, PortResult, PortSet, ServicePort, ValidationsPort,
};

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
}

pub fn sample_details() -> ServiceDetails {
    ServiceDetails {
        service: ServiceDefinition {
            name: "reviews".into(),
            namespace: "bookinfo".into(),
            created_at: t0(),
            service_type: "ClusterIP".into(),
            ip: Some("10.96.0.12".into()),
            ports: vec![PortMapping {
                name: "http".into(),
                protocol: "TCP".into(),
                port: 9080,
            }],
            labels: BTreeMap::from([("app".to_string(), "reviews".to_string())]),
        },
        endpoints: vec![Endpoint {
            ip: "10.244.0.7".into(),
            pod: Some("reviews-v1-7f99cc4496-abcde".into()),
        }],
        health: RequestHealth {
            rate_interval: "10m".into(),
            request_rate: 4.2,
            error_ratio: 0.0,
        },
        validations: None,
    }
}

pub fn sample_validations() -> ValidationSet {
    [ObjectValidation::new("virtualservice", "reviews").with_check(ValidationCheck {
        message: "VirtualService is pointing to a non-existent gateway".into(),
        severity: Severity::Error,
        path: "spec/gateways[0]".into(),
    })]
    .into_iter()
    .collect()
}

pub fn sample_metrics() -> MetricsResult {
    let series = vec![TimeSeries {
        labels: BTreeMap::from([("reporter".to_string(), "source".to_string())]),
        points: vec![TimeSeriesPoint {
            timestamp_ms: t0().timestamp_millis(),
            value: 1.5,
        }],
    }];
    MetricsResult {
        metrics: BTreeMap::from([("request_count".to_string(), series.clone())]),
        histograms: BTreeMap::from([(
            "request_duration".to_string(),
            BTreeMap::from([("avg".to_string(), series)]),
        )]),
    }
}

pub struct FakeRegistry {
    namespaces: BTreeMap<String, NamespaceInfo>,
    services: Vec<ServiceOverview>,
    detail: Result<ServiceDetails, CollaboratorError>,
    detail_delay: Option<Duration>,
    pub detail_calls: AtomicUsize,
    pub namespace_calls: AtomicUsize,
}

impl FakeRegistry {
    pub fn bookinfo() -> Self {
        Self {
            namespaces: BTreeMap::from([(
                "bookinfo".to_string(),
                NamespaceInfo::new("bookinfo", t0()),
            )]),
            services: vec![
                ServiceOverview {
                    name: "details".into(),
                    has_sidecar: true,
                },
                ServiceOverview {
                    name: "reviews".into(),
                    has_sidecar: true,
                },
            ],
            detail: Ok(sample_details()),
            detail_delay: None,
            detail_calls: AtomicUsize::new(0),
            namespace_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_detail(mut self, err: CollaboratorError) -> Self {
        self.detail = Err(err);
        self
    }

    pub fn with_detail_delay(mut self, delay: Duration) -> Self {
        self.detail_delay = Some(delay);
        self
    }
}

#[async_trait]
impl NamespacePort for FakeRegistry {
    async fn get_namespace(&self, namespace: &str) -> PortResult<NamespaceInfo> {
        self.namespace_calls.fetch_add(1, Ordering::SeqCst);
        self.namespaces
            .get(namespace)
            .cloned()
            .ok_or_else(|| CollaboratorError::not_found(format!("namespace {namespace:?} not found")))
    }
}

#[async_trait]
impl ServicePort for FakeRegistry {
    async fn get_service_list(&self, _namespace: &str) -> PortResult<Vec<ServiceOverview>> {
        Ok(self.services.clone())
    }

    async fn get_service(
        &self,
        _namespace: &str,
        _service: &str,
        rate_interval: &str,
        _query_time: DateTime<Utc>,
    ) -> PortResult<ServiceDetails> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.detail_delay {
            tokio::time::sleep(delay).await;
        }
        let mut details = self.detail.clone()?;
        details.health.rate_interval = rate_interval.to_string();
        Ok(details)
    }
}

enum ValidationBehavior {
    Succeed(ValidationSet),
    Fail(CollaboratorError),
    Panic,
}

/// Validation port fake.
///
/// `finished` counts lookups that were either completed or dropped; a lookup
/// still pending after `aggregate` returns would leave it behind `calls`.
pub struct FakeValidations {
    behavior: ValidationBehavior,
    delay: Option<Duration>,
    pub calls: Arc<AtomicUsize>,
    pub finished: Arc<AtomicUsize>,
    pub completed: Arc<AtomicUsize>,
}

impl FakeValidations {
    fn with_behavior(behavior: ValidationBehavior) -> Self {
        Self {
            behavior,
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
            finished: Arc::new(AtomicUsize::new(0)),
            completed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn succeeding(validations: ValidationSet) -> Self {
        Self::with_behavior(ValidationBehavior::Succeed(validations))
    }

    pub fn failing(err: CollaboratorError) -> Self {
        Self::with_behavior(ValidationBehavior::Fail(err))
    }

    pub fn panicking() -> Self {
        Self::with_behavior(ValidationBehavior::Panic)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

struct FinishGuard(Arc<AtomicUsize>);

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ValidationsPort for FakeValidations {
    async fn get_validations(&self, _namespace: &str, _service: &str) -> PortResult<ValidationSet> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _guard = FinishGuard(Arc::clone(&self.finished));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            ValidationBehavior::Succeed(validations) => Ok(validations.clone()),
            ValidationBehavior::Fail(err) => Err(err.clone()),
            ValidationBehavior::Panic => panic!("validation engine crashed"),
        }
    }
}

pub struct FakeMetrics {
    result: Result<MetricsResult, CollaboratorError>,
    pub last_query: Mutex<Option<MetricsQuery>>,
}

impl FakeMetrics {
    pub fn succeeding(result: MetricsResult) -> Self {
        Self {
            result: Ok(result),
            last_query: Mutex::new(None),
        }
    }

    pub fn failing(err: CollaboratorError) -> Self {
        Self {
            result: Err(err),
            last_query: Mutex::new(None),
        }
    }

    pub fn last_query(&self) -> Option<MetricsQuery> {
        self.last_query.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetricsPort for FakeMetrics {
    async fn get_metrics(&self, query: &MetricsQuery) -> PortResult<MetricsResult> {
        *self.last_query.lock().unwrap() = Some(query.clone());
        self.result.clone()
    }
}

pub fn port_set(
    registry: &Arc<FakeRegistry>,
    validations: &Arc<FakeValidations>,
    metrics: &Arc<FakeMetrics>,
) -> PortSet {
    PortSet {
        namespaces: registry.clone(),
        services: registry.clone(),
        validations: validations.clone(),
        metrics: metrics.clone(),
    }
}

pub struct UnavailableProvider;

impl PortProvider for UnavailableProvider {
    fn ports(&self) -> PortResult<PortSet> {
        Err(CollaboratorError::unavailable("registry client not configured"))
    }
}
