//! Process-level helpers for the `api-service` binary.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::Result;

pub use meshlens_domain::MeshlensConfig;

pub const CONFIG_ENV: &str = "MESHLENS_CONFIG_PATH";

/// Config location: `--config`, then `MESHLENS_CONFIG_PATH`, then
/// `$HOME/.meshlens/config.yaml`, then `meshlens-config.yaml`.
pub fn config_path(cli: Option<PathBuf>) -> PathBuf {
    resolve_config_path(cli, env::var(CONFIG_ENV).ok(), env::var("HOME").ok())
}

fn resolve_config_path(cli: Option<PathBuf>, from_env: Option<String>, home: Option<String>) -> PathBuf {
    if let Some(path) = cli {
        return path;
    }
    if let Some(path) = from_env.filter(|value| !value.is_empty()) {
        return PathBuf::from(path);
    }
    if let Some(home) = home {
        return Path::new(&home).join(".meshlens").join("config.yaml");
    }
    PathBuf::from("meshlens-config.yaml")
}

pub fn load_config(path: &Path) -> Result<MeshlensConfig> {
    MeshlensConfig::load_from_path(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn flag_wins_over_environment() {
        let path = resolve_config_path(
            Some(PathBuf::from("/etc/meshlens.yaml")),
            Some("/tmp/env.yaml".into()),
            Some("/home/ops".into()),
        );
        assert_eq!(path, PathBuf::from("/etc/meshlens.yaml"));
    }

    #[test]
    fn falls_back_through_env_and_home() {
        let from_env = resolve_config_path(None, Some("/tmp/env.yaml".into()), Some("/home/ops".into()));
        assert_eq!(from_env, PathBuf::from("/tmp/env.yaml"));

        let from_home = resolve_config_path(None, Some(String::new()), Some("/home/ops".into()));
        assert_eq!(from_home, PathBuf::from("/home/ops/.meshlens/config.yaml"));

        let bare = resolve_config_path(None, None, None);
        assert_eq!(bare, PathBuf::from("meshlens-config.yaml"));
    }

    #[test]
    fn load_config_reads_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "health:\n  default_rate_interval: 5m\nlog:\n  level: debug").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.health.default_rate_interval, "5m");
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn load_config_rejects_bad_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "metrics:\n  step_secs: -5").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("step_secs"));
    }
}
