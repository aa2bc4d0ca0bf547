//! Request-level service operations.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use meshlens_domain::{
    Dashboard, HealthConfig, MeshlensConfig, MetricsDefaults, MetricsQuery, MetricsResult,
    NamespaceInfo, ServiceDetails, ServiceError, ServiceList,
};
use meshlens_ports::{Clock, PortProvider, PortSet};

use crate::aggregator::{AggregationOutcome, ConcurrentAggregator};
use crate::dashboards::DashboardsService;
use crate::metrics_query::MetricsQueryBuilder;
use crate::rate_interval;
use crate::request::{QueryParams, RequestContext};

#[derive(Clone)]
pub struct ServicesApi {
    provider: Arc<dyn PortProvider>,
    clock: Arc<dyn Clock>,
    health: HealthConfig,
    metrics: MetricsDefaults,
}

impl ServicesApi {
    pub fn new(provider: Arc<dyn PortProvider>, clock: Arc<dyn Clock>, config: &MeshlensConfig) -> Self {
        Self {
            provider,
            clock,
            health: config.health.clone(),
            metrics: config.metrics.clone(),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn ports(&self) -> Result<PortSet, ServiceError> {
        self.provider.ports().map_err(ServiceError::Initialization)
    }

    async fn namespace(ports: &PortSet, namespace: &str) -> Result<NamespaceInfo, ServiceError> {
        ports
            .namespaces
            .get_namespace(namespace)
            .await
            .map_err(ServiceError::NamespaceLookup)
    }

    pub async fn service_list(&self, namespace: &str) -> Result<ServiceList, ServiceError> {
        let ports = self.ports()?;
        let namespace = Self::namespace(&ports, namespace).await?;
        let services = ports
            .services
            .get_service_list(&namespace.name)
            .await
            .map_err(ServiceError::EntityLookup)?;
        Ok(ServiceList {
            namespace,
            services,
        })
    }

    pub async fn service_details(&self, ctx: &RequestContext) -> AggregationOutcome {
        let ports = self.ports()?;
        let namespace = Self::namespace(&ports, &ctx.namespace).await?;
        let interval = rate_interval::resolve(
            &namespace,
            ctx.raw_rate_interval.as_deref(),
            &self.health.default_rate_interval,
            ctx.now,
        )?;
        ConcurrentAggregator::from_ports(&ports)
            .aggregate(ctx, &interval)
            .await
    }

    async fn metrics_query(
        &self,
        ports: &PortSet,
        namespace: &str,
        service: &str,
        params: &QueryParams,
        now: DateTime<Utc>,
    ) -> Result<MetricsQuery, ServiceError> {
        let namespace = Self::namespace(ports, namespace).await?;
        MetricsQueryBuilder::new(&self.metrics).build(&namespace, service, params, now)
    }

    pub async fn service_metrics(
        &self,
        namespace: &str,
        service: &str,
        params: &QueryParams,
        now: DateTime<Utc>,
    ) -> Result<MetricsResult, ServiceError> {
        let ports = self.ports()?;
        let query = self.metrics_query(&ports, namespace, service, params, now).await?;
        ports
            .metrics
            .get_metrics(&query)
            .await
            .map_err(ServiceError::MetricsBackend)
    }

    pub async fn service_dashboard(
        &self,
        namespace: &str,
        service: &str,
        params: &QueryParams,
        now: DateTime<Utc>,
    ) -> Result<Dashboard, ServiceError> {
        let ports = self.ports()?;
        let query = self.metrics_query(&ports, namespace, service, params, now).await?;
        DashboardsService::new(Arc::clone(&ports.metrics))
            .istio_dashboard(&query)
            .await
    }
}
