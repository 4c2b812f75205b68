use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use ::config::{Config, Environment};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::data::aggregate::DEFAULT_TOP_REGIONS;

// ---------------------------------------------------------------------------
// Startup configuration
// ---------------------------------------------------------------------------

/// Environment variables are read as `DASHBOARD_DATA`,
/// `DASHBOARD_TOP_REGIONS` and `DASHBOARD_RELOAD_SECS`.
pub const ENV_PREFIX: &str = "DASHBOARD";

const DEFAULT_DATA_PATH: &str = "dashboard/ecommerce_final.csv";
const DEFAULT_RELOAD_SECS: u64 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Order dataset opened at startup.
    #[serde(rename = "data")]
    pub data_path: PathBuf,
    /// Regions shown in each pie chart.
    pub top_regions: usize,
    /// Seconds between source change checks; `0` disables them.
    pub reload_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            top_regions: DEFAULT_TOP_REGIONS,
            reload_secs: DEFAULT_RELOAD_SECS,
        }
    }
}

impl DashboardConfig {
    /// Read `.env` and the process environment; a first positional argument
    /// overrides the data path.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }
        Self::from_sources(Environment::with_prefix(ENV_PREFIX), std::env::args().nth(1))
    }

    /// How often the source file is checked for changes.
    pub fn reload_interval(&self) -> Option<Duration> {
        (self.reload_secs > 0).then(|| Duration::from_secs(self.reload_secs))
    }

    fn from_sources(env: Environment, path_arg: Option<String>) -> Self {
        let mut config = match layered(env) {
            Ok(settings) => match settings.clone().try_deserialize::<Self>() {
                Ok(config) => config,
                Err(err) => {
                    log::warn!("Invalid dashboard configuration ({err}), checking key by key");
                    Self::key_by_key(&settings)
                }
            },
            Err(err) => {
                log::warn!("{err:#}, using defaults");
                Self::default()
            }
        };

        if let Some(path) = path_arg {
            config.data_path = PathBuf::from(path);
        }
        config.top_regions = config.top_regions.max(1);
        config
    }

    /// Keep every key that deserializes; fall back to the default for the rest.
    fn key_by_key(settings: &Config) -> Self {
        let defaults = Self::default();
        Self {
            data_path: key_or(settings, "data", defaults.data_path),
            top_regions: key_or(settings, "top_regions", defaults.top_regions),
            reload_secs: key_or(settings, "reload_secs", defaults.reload_secs),
        }
    }
}

/// Defaults, overridden by prefixed environment variables.
fn layered(env: Environment) -> Result<Config> {
    Config::builder()
        .add_source(Config::try_from(&DashboardConfig::default())?)
        .add_source(env.try_parsing(true))
        .build()
        .context("Failed to build configuration")
}

fn key_or<T: DeserializeOwned>(settings: &Config, key: &str, default: T) -> T {
    settings.get(key).unwrap_or_else(|err| {
        log::warn!(
            "Ignoring invalid {ENV_PREFIX}_{}: {err}",
            key.to_ascii_uppercase()
        );
        default
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(vars: &[(&str, &str)], arg: Option<&str>) -> DashboardConfig {
        let vars: ::config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let env = Environment::with_prefix(ENV_PREFIX).source(Some(vars));
        DashboardConfig::from_sources(env, arg.map(String::from))
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let c = config(&[], None);
        assert_eq!(c, DashboardConfig::default());
        assert_eq!(c.reload_interval(), Some(Duration::from_secs(DEFAULT_RELOAD_SECS)));
    }

    #[test]
    fn environment_overrides_defaults() {
        let c = config(
            &[
                ("DASHBOARD_DATA", "/tmp/orders.parquet"),
                ("DASHBOARD_TOP_REGIONS", "5"),
                ("DASHBOARD_RELOAD_SECS", "0"),
            ],
            None,
        );
        assert_eq!(c.data_path, PathBuf::from("/tmp/orders.parquet"));
        assert_eq!(c.top_regions, 5);
        assert_eq!(c.reload_interval(), None);
    }

    #[test]
    fn argument_beats_environment() {
        let c = config(&[("DASHBOARD_DATA", "env.csv")], Some("arg.csv"));
        assert_eq!(c.data_path, PathBuf::from("arg.csv"));
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let c = config(
            &[("DASHBOARD_TOP_REGIONS", "lots"), ("DASHBOARD_RELOAD_SECS", "-1")],
            None,
        );
        assert_eq!(c.top_regions, DEFAULT_TOP_REGIONS);
        assert_eq!(c.reload_secs, DEFAULT_RELOAD_SECS);
    }

    #[test]
    fn one_bad_key_keeps_the_valid_ones() {
        let c = config(
            &[("DASHBOARD_TOP_REGIONS", "lots"), ("DASHBOARD_RELOAD_SECS", "30")],
            None,
        );
        assert_eq!(c.top_regions, DEFAULT_TOP_REGIONS);
        assert_eq!(c.reload_interval(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn zero_top_regions_is_clamped() {
        let c = config(&[("DASHBOARD_TOP_REGIONS", "0")], None);
        assert_eq!(c.top_regions, 1);
    }
}
