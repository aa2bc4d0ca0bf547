use chrono::{DateTime, Utc};

/// Decoded query string, keeping repeated keys in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// First value for `key`, treating an empty value as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.is_empty())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(candidate, _)| candidate == key)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    /// Whether `key` appears at all, with or without a value.
    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(candidate, _)| candidate == key)
    }
}

/// Per-request inputs for the service detail path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub namespace: String,
    pub service: String,
    pub raw_rate_interval: Option<String>,
    pub include_validations: bool,
    pub now: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(
        namespace: impl Into<String>,
        service: impl Into<String>,
        raw_rate_interval: Option<String>,
        include_validations: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            service: service.into(),
            raw_rate_interval,
            include_validations,
            now,
        }
    }

    /// `rateInterval` is optional; presence of `validate` enables validations
    /// regardless of its value.
    pub fn from_query(
        namespace: impl Into<String>,
        service: impl Into<String>,
        params: &QueryParams,
        now: DateTime<Utc>,
    ) -> Self {
        Self::new(
            namespace,
            service,
            params.get("rateInterval").map(str::to_string),
            params.contains("validate"),
            now,
        )
    }
}
