//! Service configuration loaded from YAML.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::duration::parse_duration;
use crate::metrics::{Direction, RateFunc, Reporter};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshlensConfig {
    pub server: ServerConfig,
    pub health: HealthConfig,
    pub metrics: MetricsDefaults,
    pub fixtures: FixturesConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:20001".to_string(),
            worker_threads: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Rate interval used for health when the request carries none.
    pub default_rate_interval: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            default_rate_interval: "10m".to_string(),
        }
    }
}

/// Values a metrics query starts from before request parameters apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsDefaults {
    pub range_secs: i64,
    pub step_secs: i64,
    pub rate_interval: String,
    pub rate_func: RateFunc,
    pub avg: bool,
    pub quantiles: Vec<String>,
    pub reporter: Reporter,
    pub direction: Direction,
}

impl Default for MetricsDefaults {
    fn default() -> Self {
        Self {
            range_secs: 1800,
            step_secs: 15,
            rate_interval: "1m".to_string(),
            rate_func: RateFunc::Rate,
            avg: true,
            quantiles: vec!["0.5".into(), "0.95".into(), "0.99".into()],
            reporter: Reporter::Source,
            direction: Direction::Outbound,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixturesConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl MeshlensConfig {
    /// Loads and validates the config at `path`. A missing file yields defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let config = Self::from_yaml(&raw)
            .with_context(|| format!("invalid config at {}", path.display()))?;
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let config: Self = if raw.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(raw).context("failed to parse config YAML")?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        parse_duration(&self.health.default_rate_interval)
            .context("health.default_rate_interval")?;
        parse_duration(&self.metrics.rate_interval).context("metrics.rate_interval")?;
        if self.metrics.step_secs <= 0 {
            bail!("metrics.step_secs must be positive");
        }
        if self.metrics.range_secs < 0 {
            bail!("metrics.range_secs must not be negative");
        }
        for quantile in &self.metrics.quantiles {
            let value: f64 = quantile
                .parse()
                .with_context(|| format!("metrics.quantiles: {quantile:?} is not a number"))?;
            if !(0.0..=1.0).contains(&value) {
                bail!("metrics.quantiles: {quantile} should be between 0 and 1");
            }
        }
        if self.server.worker_threads == Some(0) {
            bail!("server.worker_threads must be positive");
        }
        Ok(())
    }
}
