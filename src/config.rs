//! Environment configuration
//!
//! Values come from the process environment (optionally seeded from `.env`).
//! Every key has a named default so the agent runs with no configuration.

use crate::error::OrchestrationError;
use crate::Result;
use std::env;
use std::time::Duration;

pub const DEFAULT_COUNTRY_API: &str = "https://restcountries.com/v3.1";
pub const DEFAULT_WEATHER_API: &str = "https://api.open-meteo.com/v1";
pub const DEFAULT_HOLIDAY_API: &str = "https://date.nager.at/api/v3";
pub const DEFAULT_EXCHANGE_API: &str = "https://api.frankfurter.app";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PORT: u16 = 8002;

/// Base URLs of the four data providers
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointConfig {
    pub countries: String,
    pub weather: String,
    pub holidays: String,
    pub rates: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            countries: DEFAULT_COUNTRY_API.to_string(),
            weather: DEFAULT_WEATHER_API.to_string(),
            holidays: DEFAULT_HOLIDAY_API.to_string(),
            rates: DEFAULT_EXCHANGE_API.to_string(),
        }
    }
}

/// Currency pair used when the caller leaves one side unspecified
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyDefaults {
    pub from: String,
    pub to: String,
}

impl Default for CurrencyDefaults {
    fn default() -> Self {
        Self {
            from: "USD".to_string(),
            to: "KRW".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    pub endpoints: EndpointConfig,
    /// Upper bound for every external call
    pub request_timeout: Duration,
    pub currency: CurrencyDefaults,
    /// Extra `(country, model)` rows layered over the built-in model table
    pub weather_model_overrides: Vec<(String, String)>,
    pub port: u16,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            endpoints: EndpointConfig::default(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            currency: CurrencyDefaults::default(),
            weather_model_overrides: Vec::new(),
            port: DEFAULT_PORT,
        }
    }
}

impl AgentConfig {
    /// Load `.env` (if present) and read the process environment
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let endpoints = EndpointConfig {
            countries: get("COUNTRY_API_BASE_URL")
                .map(normalize_base_url)
                .unwrap_or(defaults.endpoints.countries),
            weather: get("WEATHER_API_BASE_URL")
                .map(normalize_base_url)
                .unwrap_or(defaults.endpoints.weather),
            holidays: get("HOLIDAY_API_BASE_URL")
                .map(normalize_base_url)
                .unwrap_or(defaults.endpoints.holidays),
            rates: get("EXCHANGE_API_BASE_URL")
                .map(normalize_base_url)
                .unwrap_or(defaults.endpoints.rates),
        };

        let request_timeout = match get("HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    OrchestrationError::Config(format!(
                        "HTTP_TIMEOUT_SECS must be a positive integer, got '{}'",
                        raw
                    ))
                })?;
                if secs == 0 {
                    return Err(OrchestrationError::Config(
                        "HTTP_TIMEOUT_SECS must be greater than zero".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => defaults.request_timeout,
        };

        let currency = CurrencyDefaults {
            from: get("DEFAULT_CURRENCY_FROM")
                .map(|c| c.to_uppercase())
                .unwrap_or(defaults.currency.from),
            to: get("DEFAULT_CURRENCY_TO")
                .map(|c| c.to_uppercase())
                .unwrap_or(defaults.currency.to),
        };

        let weather_model_overrides = match get("WEATHER_MODEL_OVERRIDES") {
            Some(raw) => parse_overrides(&raw)?,
            None => Vec::new(),
        };

        let port = match get("PORT").or_else(|| get("API_PORT")) {
            Some(raw) => raw.parse().map_err(|_| {
                OrchestrationError::Config(format!("PORT must be a valid port, got '{}'", raw))
            })?,
            None => defaults.port,
        };

        Ok(Self {
            endpoints,
            request_timeout,
            currency,
            weather_model_overrides,
            port,
        })
    }
}

fn normalize_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// `TR=ecmwf_ifs025, BR=gfs_seamless`
fn parse_overrides(raw: &str) -> Result<Vec<(String, String)>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (key, model) = entry.split_once('=').ok_or_else(|| {
                OrchestrationError::Config(format!(
                    "WEATHER_MODEL_OVERRIDES entry '{}' is not KEY=model",
                    entry
                ))
            })?;
            let (key, model) = (key.trim(), model.trim());
            if key.is_empty() || model.is_empty() {
                return Err(OrchestrationError::Config(format!(
                    "WEATHER_MODEL_OVERRIDES entry '{}' has an empty side",
                    entry
                )));
            }
            Ok((key.to_string(), model.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = AgentConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AgentConfig::default());
        assert_eq!(config.currency.from, "USD");
        assert_eq!(config.currency.to, "KRW");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides_are_read() {
        let config = AgentConfig::from_lookup(lookup(&[
            ("COUNTRY_API_BASE_URL", "http://localhost:9000/v3.1/"),
            ("HTTP_TIMEOUT_SECS", "5"),
            ("DEFAULT_CURRENCY_FROM", "eur"),
            ("WEATHER_MODEL_OVERRIDES", "TR=ecmwf_ifs025, BR = gfs_seamless"),
            ("API_PORT", "9090"),
        ]))
        .unwrap();

        assert_eq!(config.endpoints.countries, "http://localhost:9000/v3.1");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.currency.from, "EUR");
        assert_eq!(config.currency.to, "KRW");
        assert_eq!(
            config.weather_model_overrides,
            vec![
                ("TR".to_string(), "ecmwf_ifs025".to_string()),
                ("BR".to_string(), "gfs_seamless".to_string()),
            ]
        );
        assert_eq!(config.port, 9090);
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let timeout = AgentConfig::from_lookup(lookup(&[("HTTP_TIMEOUT_SECS", "soon")]));
        assert!(matches!(timeout, Err(OrchestrationError::Config(_))));

        let zero = AgentConfig::from_lookup(lookup(&[("HTTP_TIMEOUT_SECS", "0")]));
        assert!(matches!(zero, Err(OrchestrationError::Config(_))));

        let overrides =
            AgentConfig::from_lookup(lookup(&[("WEATHER_MODEL_OVERRIDES", "TR")]));
        assert!(matches!(overrides, Err(OrchestrationError::Config(_))));
    }
}
