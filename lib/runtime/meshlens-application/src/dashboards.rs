//! Istio-style service dashboard assembled from one metrics query.

use std::sync::Arc;

use meshlens_domain::{Aggregation, Chart, Dashboard, Direction, MetricsQuery, MetricsResult, ServiceError};
use meshlens_ports::MetricsPort;

enum ChartSource {
    Metric,
    Histogram,
}

struct ChartSpec {
    name: &'static str,
    metric: &'static str,
    unit: &'static str,
    source: ChartSource,
}

const CHARTS: [ChartSpec; 6] = [
    ChartSpec {
        name: "Request volume",
        metric: "request_count",
        unit: "ops",
        source: ChartSource::Metric,
    },
    ChartSpec {
        name: "Request duration",
        metric: "request_duration",
        unit: "seconds",
        source: ChartSource::Histogram,
    },
    ChartSpec {
        name: "Request size",
        metric: "request_size",
        unit: "bytes",
        source: ChartSource::Histogram,
    },
    ChartSpec {
        name: "Response size",
        metric: "response_size",
        unit: "bytes",
        source: ChartSource::Histogram,
    },
    ChartSpec {
        name: "TCP received",
        metric: "tcp_received",
        unit: "bitrate",
        source: ChartSource::Metric,
    },
    ChartSpec {
        name: "TCP sent",
        metric: "tcp_sent",
        unit: "bitrate",
        source: ChartSource::Metric,
    },
];

const AGGREGATIONS: [(&str, &str); 4] = [
    ("destination_version", "Local version"),
    ("source_workload", "Remote service"),
    ("source_version", "Remote version"),
    ("response_code", "Response code"),
];

#[derive(Clone)]
pub struct DashboardsService {
    metrics: Arc<dyn MetricsPort>,
}

impl DashboardsService {
    pub fn new(metrics: Arc<dyn MetricsPort>) -> Self {
        Self { metrics }
    }

    pub async fn istio_dashboard(&self, query: &MetricsQuery) -> Result<Dashboard, ServiceError> {
        let result = self
            .metrics
            .get_metrics(query)
            .await
            .map_err(ServiceError::MetricsBackend)?;
        Ok(build_dashboard(query.direction, result))
    }
}

fn build_dashboard(direction: Direction, mut result: MetricsResult) -> Dashboard {
    let title = match direction {
        Direction::Inbound => "Inbound Metrics",
        Direction::Outbound => "Outbound Metrics",
    };

    let charts = CHARTS
        .iter()
        .map(|spec| {
            let (metric, histogram) = match spec.source {
                ChartSource::Metric => (
                    Some(result.metrics.remove(spec.metric).unwrap_or_default()),
                    None,
                ),
                ChartSource::Histogram => (
                    None,
                    Some(result.histograms.remove(spec.metric).unwrap_or_default()),
                ),
            };
            Chart {
                name: spec.name.to_string(),
                unit: spec.unit.to_string(),
                spans: 6,
                metric,
                histogram,
            }
        })
        .collect();

    Dashboard {
        title: title.to_string(),
        aggregations: AGGREGATIONS
            .iter()
            .map(|(label, display_name)| Aggregation {
                label: label.to_string(),
                display_name: display_name.to_string(),
            })
            .collect(),
        charts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use meshlens_domain::{CollaboratorError, ErrorKind, MetricsDefaults, NamespaceInfo};

    use crate::metrics_query::MetricsQueryBuilder;
    use crate::request::QueryParams;
    use crate::test_support::{FakeMetrics, sample_metrics, t0};

    fn query(direction: &str) -> MetricsQuery {
        let defaults = MetricsDefaults::default();
        MetricsQueryBuilder::new(&defaults)
            .build(
                &NamespaceInfo::new("bookinfo", t0()),
                "reviews",
                &QueryParams::from_pairs([("direction", direction)]),
                t0() + TimeDelta::days(1),
            )
            .unwrap()
    }

    #[tokio::test]
    async fn builds_charts_in_fixed_order() {
        let service = DashboardsService::new(Arc::new(FakeMetrics::succeeding(sample_metrics())));
        let dashboard = service.istio_dashboard(&query("inbound")).await.unwrap();

        assert_eq!(dashboard.title, "Inbound Metrics");
        let names: Vec<_> = dashboard.charts.iter().map(|chart| chart.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "Request volume",
                "Request duration",
                "Request size",
                "Response size",
                "TCP received",
                "TCP sent"
            ]
        );
        assert_eq!(dashboard.charts[0].metric.as_ref().map(Vec::len), Some(1));
        assert!(dashboard.charts[1].histogram.as_ref().unwrap().contains_key("avg"));
        assert_eq!(dashboard.charts[4].metric.as_ref().map(Vec::len), Some(0));
        assert_eq!(dashboard.aggregations.len(), 4);
    }

    #[tokio::test]
    async fn title_follows_direction() {
        let service = DashboardsService::new(Arc::new(FakeMetrics::succeeding(sample_metrics())));
        let dashboard = service.istio_dashboard(&query("outbound")).await.unwrap();
        assert_eq!(dashboard.title, "Outbound Metrics");
    }

    #[tokio::test]
    async fn backend_failure_is_metrics_backend_error() {
        let service = DashboardsService::new(Arc::new(FakeMetrics::failing(
            CollaboratorError::unavailable("prometheus unreachable"),
        )));
        let err = service.istio_dashboard(&query("inbound")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MetricsBackend);
    }
}
