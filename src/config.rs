//! Runtime configuration.
//!
//! Values come from serde defaults overlaid with `OPEN_METEO_*` environment
//! variables, e.g. `OPEN_METEO_DEFAULT_UNITS=imperial`.

use std::time::Duration;

use anyhow::{Context, Result};
use ::config::Environment;
use serde::{Deserialize, Serialize};

use crate::constants::{
    AIR_QUALITY_URL, DEFAULT_GEOCODE_LIMIT, DEFAULT_RESOLVE_LIMIT, DEFAULT_TIMEOUT_SECONDS,
    FORECAST_URL, GEOCODING_URL, MAX_GEOCODE_LIMIT,
};
use crate::location::normalize_country_code;
use crate::units::UnitSystem;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Units used when a tool call does not specify any
    #[serde(default)]
    pub default_units: UnitSystem,
    /// Number of candidates the `geocode` tool returns by default
    #[serde(default = "default_geocode_limit")]
    pub geocode_limit: u32,
    /// Number of candidates fetched when resolving a city for a weather lookup
    #[serde(default = "default_resolve_limit")]
    pub resolve_limit: u32,
    /// Country preferred when candidates have equal population
    #[serde(default)]
    pub preferred_country: Option<String>,
    /// Upstream request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,
    #[serde(default = "default_air_quality_url")]
    pub air_quality_url: String,
}

fn default_geocode_limit() -> u32 {
    DEFAULT_GEOCODE_LIMIT
}

fn default_resolve_limit() -> u32 {
    DEFAULT_RESOLVE_LIMIT
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_geocoding_url() -> String {
    GEOCODING_URL.to_string()
}

fn default_forecast_url() -> String {
    FORECAST_URL.to_string()
}

fn default_air_quality_url() -> String {
    AIR_QUALITY_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_units: UnitSystem::default(),
            geocode_limit: default_geocode_limit(),
            resolve_limit: default_resolve_limit(),
            preferred_country: None,
            timeout_seconds: default_timeout_seconds(),
            geocoding_url: default_geocoding_url(),
            forecast_url: default_forecast_url(),
            air_quality_url: default_air_quality_url(),
        }
    }
}

impl Config {
    /// Load configuration from the environment and validate it
    pub fn load() -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(Environment::with_prefix("OPEN_METEO").try_parsing(true))
            .build()
            .context("Failed to read OPEN_METEO_* environment variables")?;

        let mut cfg: Config = settings
            .try_deserialize()
            .context("Failed to parse configuration")?;
        cfg.validate()?;

        Ok(cfg)
    }

    /// Check ranges and normalise the preferred country code
    pub fn validate(&mut self) -> Result<()> {
        for (name, limit) in [
            ("geocode_limit", self.geocode_limit),
            ("resolve_limit", self.resolve_limit),
        ] {
            if !(1..=MAX_GEOCODE_LIMIT).contains(&limit) {
                anyhow::bail!("{name} must be between 1 and {MAX_GEOCODE_LIMIT}, got {limit}");
            }
        }

        if self.timeout_seconds == 0 {
            anyhow::bail!("timeout_seconds must be greater than zero");
        }

        if let Some(country) = self.preferred_country.take() {
            let code = normalize_country_code(&country)
                .with_context(|| format!("Invalid preferred_country '{country}'"))?;
            self.preferred_country = Some(code);
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_open_meteo() {
        let cfg = Config::default();
        assert_eq!(cfg.default_units, UnitSystem::Metric);
        assert_eq!(cfg.geocode_limit, 5);
        assert_eq!(cfg.resolve_limit, 10);
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
        assert!(cfg.geocoding_url.starts_with("https://geocoding-api.open-meteo.com"));
        assert!(cfg.preferred_country.is_none());
    }

    #[test]
    fn validate_normalises_preferred_country() {
        let mut cfg = Config {
            preferred_country: Some("uk".to_string()),
            ..Config::default()
        };
        cfg.validate().unwrap();
        assert_eq!(cfg.preferred_country.as_deref(), Some("GB"));
    }

    #[test]
    fn validate_rejects_unknown_country() {
        let mut cfg = Config {
            preferred_country: Some("Germany".to_string()),
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_limits_and_timeout() {
        let mut cfg = Config {
            geocode_limit: 0,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());

        let mut cfg = Config {
            resolve_limit: 101,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());

        let mut cfg = Config {
            timeout_seconds: 0,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_values_fall_back_to_defaults() {
        let cfg: Config = serde_json::from_value(serde_json::json!({
            "default_units": "imperial",
            "preferred_country": "US"
        }))
        .unwrap();
        assert_eq!(cfg.default_units, UnitSystem::Imperial);
        assert_eq!(cfg.geocode_limit, 5);
        assert_eq!(cfg.forecast_url, "https://api.open-meteo.com/v1/forecast");
    }
}
