//! Prometheus-style duration expressions (`10m`, `1h30m`, `500ms`).

use std::sync::LazyLock;

use chrono::TimeDelta;
use regex::Regex;
use thiserror::Error;

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:([0-9]+)y)?(?:([0-9]+)w)?(?:([0-9]+)d)?(?:([0-9]+)h)?(?:([0-9]+)m)?(?:([0-9]+)s)?(?:([0-9]+)ms)?$",
    )
    .expect("duration pattern is valid")
});

const MS_PER_UNIT: [u64; 7] = [
    365 * 24 * 60 * 60 * 1000,
    7 * 24 * 60 * 60 * 1000,
    24 * 60 * 60 * 1000,
    60 * 60 * 1000,
    60 * 1000,
    1000,
    1,
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    #[error("empty duration string")]
    Empty,
    #[error("not a valid duration string: {0:?}")]
    Malformed(String),
    #[error("duration out of range: {0:?}")]
    Overflow(String),
}

/// Parses a duration expression into a non-negative [`TimeDelta`].
///
/// Units must appear at most once and in decreasing order (`y w d h m s ms`).
/// The bare literal `0` is accepted.
pub fn parse_duration(raw: &str) -> Result<TimeDelta, DurationError> {
    match raw {
        "" => return Err(DurationError::Empty),
        "0" => return Ok(TimeDelta::zero()),
        _ => {}
    }

    let captures = DURATION_RE
        .captures(raw)
        .ok_or_else(|| DurationError::Malformed(raw.to_string()))?;

    let mut total_ms: u64 = 0;
    for (index, per_unit) in MS_PER_UNIT.iter().enumerate() {
        let Some(group) = captures.get(index + 1) else {
            continue;
        };
        let amount: u64 = group
            .as_str()
            .parse()
            .map_err(|_| DurationError::Overflow(raw.to_string()))?;
        total_ms = amount
            .checked_mul(*per_unit)
            .and_then(|ms| total_ms.checked_add(ms))
            .ok_or_else(|| DurationError::Overflow(raw.to_string()))?;
    }

    i64::try_from(total_ms)
        .ok()
        .and_then(TimeDelta::try_milliseconds)
        .ok_or_else(|| DurationError::Overflow(raw.to_string()))
}

/// Renders whole seconds of `delta` the way clamped rate intervals are reported.
pub fn format_seconds(delta: TimeDelta) -> String {
    format!("{}s", delta.num_seconds().max(0))
}
