//! Request handling for the service read API.
//!
//! The pieces compose leaf-first: [`rate_interval`] resolves the health
//! window, [`ConcurrentAggregator`] fetches detail and validations,
//! [`MetricsQueryBuilder`] validates metrics requests, and [`project`] turns
//! any outcome into a status code and JSON body. [`ServicesApi`] wires them to
//! the collaborator ports for each request.

pub mod aggregator;
pub mod dashboards;
pub mod metrics_query;
pub mod projector;
pub mod rate_interval;
pub mod request;
pub mod services;

pub use aggregator::{AggregationOutcome, ConcurrentAggregator};
pub use dashboards::DashboardsService;
pub use metrics_query::MetricsQueryBuilder;
pub use projector::{ApiResponse, project, status_for};
pub use request::{QueryParams, RequestContext};
pub use services::ServicesApi;

#[cfg(test)]
mod test_support;
