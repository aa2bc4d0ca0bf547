//! Rate interval resolution against a namespace lifetime.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use meshlens_domain::{NamespaceInfo, RateInterval, ServiceError, format_seconds, parse_duration};

/// Resolves `raw` (or `default` when absent) into a window ending at `now`.
///
/// A window reaching back before the namespace existed is clamped to start at
/// its creation time, and the forwarded expression becomes the namespace age
/// in whole seconds. A malformed expression is a bad request, never clamped.
pub fn resolve(
    namespace: &NamespaceInfo,
    raw: Option<&str>,
    default: &str,
    now: DateTime<Utc>,
) -> Result<RateInterval, ServiceError> {
    let expression = raw.filter(|value| !value.is_empty()).unwrap_or(default);
    let requested = parse_rate_interval(expression)?;
    let interval = clamp_to_creation(namespace.created_at, expression, requested, now);
    if interval.was_clamped(expression) {
        debug!(
            namespace = %namespace.name,
            requested = expression,
            adjusted = %interval.expression,
            "rate interval clamped to namespace age"
        );
    }
    Ok(interval)
}

pub(crate) fn parse_rate_interval(expression: &str) -> Result<TimeDelta, ServiceError> {
    parse_duration(expression)
        .map_err(|err| ServiceError::bad_request("rateInterval", format!("is invalid: {err}")))
}

/// Window `[end - requested, end)` with its start bounded by `created_at`.
///
/// An `end` earlier than `created_at` collapses to an empty window at
/// `created_at`.
pub(crate) fn clamp_to_creation(
    created_at: DateTime<Utc>,
    expression: &str,
    requested: TimeDelta,
    end: DateTime<Utc>,
) -> RateInterval {
    if let Some(start) = end.checked_sub_signed(requested)
        && start >= created_at
    {
        return RateInterval {
            expression: expression.to_string(),
            start,
            end,
        };
    }

    let end = end.max(created_at);
    RateInterval {
        expression: format_seconds(end - created_at),
        start: created_at,
        end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use meshlens_domain::ErrorKind;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    fn namespace() -> NamespaceInfo {
        NamespaceInfo::new("bookinfo", t0())
    }

    #[test]
    fn young_namespace_clamps_window_to_creation() {
        let now = t0() + TimeDelta::minutes(2);
        let interval = resolve(&namespace(), Some("10m"), "10m", now).unwrap();

        assert_eq!(interval.start, t0());
        assert_eq!(interval.end, now);
        assert_eq!(interval.length(), TimeDelta::minutes(2));
        assert_eq!(interval.expression, "120s");
    }

    #[test]
    fn old_namespace_keeps_requested_window() {
        let now = t0() + TimeDelta::hours(3);
        let interval = resolve(&namespace(), Some("1h"), "10m", now).unwrap();

        assert_eq!(interval.expression, "1h");
        assert_eq!(interval.start, now - TimeDelta::hours(1));
        assert!(!interval.was_clamped("1h"));
    }

    #[test]
    fn window_starting_exactly_at_creation_is_not_clamped() {
        let now = t0() + TimeDelta::minutes(10);
        let interval = resolve(&namespace(), Some("10m"), "10m", now).unwrap();

        assert_eq!(interval.expression, "10m");
        assert_eq!(interval.start, t0());
    }

    #[test]
    fn absent_or_empty_interval_uses_default() {
        let now = t0() + TimeDelta::days(1);
        assert_eq!(
            resolve(&namespace(), None, "10m", now).unwrap().expression,
            "10m"
        );
        assert_eq!(
            resolve(&namespace(), Some(""), "5m", now).unwrap().expression,
            "5m"
        );
    }

    #[test]
    fn malformed_interval_is_bad_request() {
        let now = t0() + TimeDelta::minutes(2);
        let err = resolve(&namespace(), Some("ten minutes"), "10m", now).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert!(matches!(err, ServiceError::BadRequest { ref param, .. } if param == "rateInterval"));
    }

    #[test]
    fn clock_before_creation_collapses_to_empty_window() {
        let now = t0() - TimeDelta::seconds(30);
        let interval = resolve(&namespace(), Some("10m"), "10m", now).unwrap();

        assert_eq!(interval.start, t0());
        assert_eq!(interval.end, t0());
        assert_eq!(interval.expression, "0s");
    }

    #[test]
    fn huge_interval_does_not_overflow() {
        let now = t0() + TimeDelta::minutes(1);
        let interval = resolve(&namespace(), Some("290000y"), "10m", now).unwrap();
        assert_eq!(interval.start, t0());
        assert_eq!(interval.expression, "60s");
    }

    #[test]
    fn start_never_precedes_creation() {
        let intervals = ["0", "1s", "59s", "1m", "10m", "1h", "1d", "4w", "1y"];
        let ages = [0, 1, 59, 60, 61, 600, 3_599, 86_400, 10_000_000];
        for raw in intervals {
            for age in ages {
                let now = t0() + TimeDelta::seconds(age);
                let interval = resolve(&namespace(), Some(raw), "10m", now).unwrap();
                assert!(
                    interval.start >= t0(),
                    "{raw} at age {age}s started at {}",
                    interval.start
                );
                assert_eq!(interval.end, now);
            }
        }
    }
}
