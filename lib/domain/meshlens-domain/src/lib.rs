//! Domain models and invariants.

pub mod config;
pub mod dashboard;
pub mod duration;
pub mod error;
pub mod metrics;
pub mod namespace;
pub mod service;
pub mod validation;

pub use config::{
    FixturesConfig, HealthConfig, LogConfig, MeshlensConfig, MetricsDefaults, ServerConfig,
};
pub use dashboard::{Aggregation, Chart, Dashboard};
pub use duration::{DurationError, format_seconds, parse_duration};
pub use error::{CollaboratorError, CollaboratorErrorKind, ErrorKind, ServiceError};
pub use metrics::{
    Direction, MetricsQuery, MetricsResult, RateFunc, Reporter, TimeSeries, TimeSeriesPoint,
};
pub use namespace::{NamespaceInfo, RateInterval};
pub use service::{
    Endpoint, PortMapping, RequestHealth, ServiceDefinition, ServiceDetails, ServiceList,
    ServiceOverview,
};
pub use validation::{ObjectValidation, Severity, ValidationCheck, ValidationSet};
