//! Collaborator contracts used by the application layer.
//!
//! Every external system is reached through one of these traits and handed
//! in as part of a [`PortSet`]; nothing is looked up from process state.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use meshlens_domain::{
    CollaboratorError, MetricsQuery, MetricsResult, NamespaceInfo, ServiceDetails,
    ServiceOverview, ValidationSet,
};

pub type PortResult<T> = Result<T, CollaboratorError>;

#[async_trait]
pub trait NamespacePort: Send + Sync {
    async fn get_namespace(&self, namespace: &str) -> PortResult<NamespaceInfo>;
}

#[async_trait]
pub trait ServicePort: Send + Sync {
    async fn get_service_list(&self, namespace: &str) -> PortResult<Vec<ServiceOverview>>;

    /// Detail for one service; `rate_interval` is the already resolved
    /// expression and `query_time` the end of the health window.
    async fn get_service(
        &self,
        namespace: &str,
        service: &str,
        rate_interval: &str,
        query_time: DateTime<Utc>,
    ) -> PortResult<ServiceDetails>;
}

#[async_trait]
pub trait ValidationsPort: Send + Sync {
    async fn get_validations(&self, namespace: &str, service: &str) -> PortResult<ValidationSet>;
}

#[async_trait]
pub trait MetricsPort: Send + Sync {
    async fn get_metrics(&self, query: &MetricsQuery) -> PortResult<MetricsResult>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Clone)]
pub struct PortSet {
    pub namespaces: Arc<dyn NamespacePort>,
    pub services: Arc<dyn ServicePort>,
    pub validations: Arc<dyn ValidationsPort>,
    pub metrics: Arc<dyn MetricsPort>,
}

/// Source of a [`PortSet`] for one request.
///
/// Resolved per request so that implementations can bind collaborators to
/// caller credentials; a failure here is reported as an initialization error.
pub trait PortProvider: Send + Sync {
    fn ports(&self) -> PortResult<PortSet>;
}

impl PortProvider for PortSet {
    fn ports(&self) -> PortResult<PortSet> {
        Ok(self.clone())
    }
}
