//! Builds validated metrics queries from request parameters.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use meshlens_domain::{
    Direction, MetricsDefaults, MetricsQuery, NamespaceInfo, RateFunc, Reporter, ServiceError,
};

use crate::rate_interval::{clamp_to_creation, parse_rate_interval};
use crate::request::QueryParams;

pub struct MetricsQueryBuilder<'a> {
    defaults: &'a MetricsDefaults,
}

impl<'a> MetricsQueryBuilder<'a> {
    pub fn new(defaults: &'a MetricsDefaults) -> Self {
        Self { defaults }
    }

    pub fn build(
        &self,
        namespace: &NamespaceInfo,
        service: &str,
        params: &QueryParams,
        now: DateTime<Utc>,
    ) -> Result<MetricsQuery, ServiceError> {
        let defaults = self.defaults;

        let reporter = match params.get("reporter") {
            Some(raw) => Reporter::parse(raw).ok_or_else(|| {
                ServiceError::bad_request("reporter", "must be either 'source' or 'destination'")
            })?,
            None => defaults.reporter,
        };
        let direction = match params.get("direction") {
            Some(raw) => Direction::parse(raw).ok_or_else(|| {
                ServiceError::bad_request("direction", "must be either 'inbound' or 'outbound'")
            })?,
            None => defaults.direction,
        };
        let rate_func = match params.get("rateFunc") {
            Some(raw) => RateFunc::parse(raw).ok_or_else(|| {
                ServiceError::bad_request("rateFunc", "must be either 'rate' or 'irate'")
            })?,
            None => defaults.rate_func,
        };

        let rate_interval = params
            .get("rateInterval")
            .unwrap_or(defaults.rate_interval.as_str())
            .to_string();
        let requested_interval = parse_rate_interval(&rate_interval)?;

        let end = match params.get("queryTime") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .ok_or_else(|| {
                    ServiceError::bad_request("queryTime", "must be a unix timestamp in seconds")
                })?,
            None => now,
        };
        let range = match params.get("duration") {
            Some(raw) => parse_seconds("duration", raw, false)?,
            None => seconds("duration", defaults.range_secs)?,
        };
        let step = match params.get("step") {
            Some(raw) => parse_seconds("step", raw, true)?,
            None => seconds("step", defaults.step_secs)?,
        };

        let requested_quantiles: Vec<&str> = params
            .get_all("quantiles[]")
            .into_iter()
            .filter(|value| !value.is_empty())
            .collect();
        let quantiles = match requested_quantiles {
            raw if raw.is_empty() => defaults.quantiles.clone(),
            raw => raw
                .into_iter()
                .map(parse_quantile)
                .collect::<Result<Vec<_>, _>>()?,
        };
        let avg = match params.get("avg") {
            Some(raw) => parse_bool(raw)
                .ok_or_else(|| ServiceError::bad_request("avg", "must be a boolean"))?,
            None => defaults.avg,
        };

        let request_protocol = params.get("requestProtocol").map(str::to_string);
        let by_labels = owned_values(params, "byLabels[]");
        let filters = owned_values(params, "filters[]");

        if end < namespace.created_at {
            return Err(query_window_empty());
        }
        let interval = clamp_to_creation(namespace.created_at, &rate_interval, requested_interval, end);
        if interval.was_clamped(&rate_interval) {
            debug!(
                namespace = %namespace.name,
                service,
                requested = %rate_interval,
                adjusted = %interval.expression,
                "metrics rate interval clamped to namespace age"
            );
        }

        let mut start = end.checked_sub_signed(range).unwrap_or(namespace.created_at);
        let allowed_start = namespace.created_at + interval.length();
        if start < allowed_start {
            debug!(
                namespace = %namespace.name,
                service,
                requested = %start,
                allowed = %allowed_start,
                "metrics query start bounded by namespace age"
            );
            start = allowed_start;
            if start > end {
                return Err(query_window_empty());
            }
        }

        debug!(
            namespace = %namespace.name,
            service,
            reporter = reporter.as_str(),
            direction = direction.as_str(),
            rate_func = rate_func.as_str(),
            rate_interval = %interval.expression,
            %start,
            %end,
            "metrics query built"
        );

        Ok(MetricsQuery {
            namespace: namespace.name.clone(),
            service: service.to_string(),
            reporter,
            direction,
            request_protocol,
            rate_interval: interval.expression,
            rate_func,
            start,
            end,
            step,
            quantiles,
            avg,
            by_labels,
            filters,
        })
    }
}

fn query_window_empty() -> ServiceError {
    ServiceError::bad_request(
        "queryTime",
        "after checks, query start time is after end time",
    )
}

fn parse_seconds(param: &str, raw: &str, positive: bool) -> Result<TimeDelta, ServiceError> {
    let value: i64 = raw
        .parse()
        .map_err(|_| ServiceError::bad_request(param, "must be a whole number of seconds"))?;
    if value < 0 || (positive && value == 0) {
        let rule = if positive { "must be positive" } else { "must not be negative" };
        return Err(ServiceError::bad_request(param, rule));
    }
    seconds(param, value)
}

fn seconds(param: &str, value: i64) -> Result<TimeDelta, ServiceError> {
    TimeDelta::try_seconds(value).ok_or_else(|| ServiceError::bad_request(param, "is out of range"))
}

fn parse_quantile(raw: &str) -> Result<String, ServiceError> {
    let value: f64 = raw
        .parse()
        .map_err(|_| ServiceError::bad_request("quantiles", "cannot be parsed, float expected"))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(ServiceError::bad_request(
            "quantiles",
            "has invalid quantile(s): should be between 0 and 1",
        ));
    }
    Ok(raw.to_string())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "t" | "true" => Some(true),
        "0" | "f" | "false" => Some(false),
        _ => None,
    }
}

fn owned_values(params: &QueryParams, key: &str) -> Vec<String> {
    params
        .get_all(key)
        .into_iter()
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}
