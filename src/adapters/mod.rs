//! External data adapters
//!
//! One adapter per upstream API. Each performs a single request, validates
//! the response, extracts a fixed subset of fields and returns either a
//! normalized model or a typed error. Untyped JSON never leaves this module.

use crate::config::AgentConfig;
use crate::error::OrchestrationError;
use crate::models::{CountryProfile, CurrencyDate, HolidayLookup, RateSnapshot, WeatherSummary};
use crate::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Url};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub mod clock;
pub mod countries;
pub mod holidays;
pub mod rates;
pub mod weather;

pub use clock::{FixedClock, SystemClock};
pub use countries::RestCountriesClient;
pub use holidays::NagerDateClient;
pub use rates::FrankfurterClient;
pub use weather::OpenMeteoClient;

/// Country registry lookup by free-text name
#[async_trait]
pub trait CountryApi: Send + Sync {
    async fn country_info(&self, country_name: &str) -> Result<CountryProfile>;
}

/// Daily max/min temperature forecast for a point
#[async_trait]
pub trait WeatherApi: Send + Sync {
    async fn forecast(&self, latitude: f64, longitude: f64, model: &str)
        -> Result<WeatherSummary>;
}

/// Public holiday calendar for one country and year
#[async_trait]
pub trait HolidayApi: Send + Sync {
    async fn public_holidays(&self, year: i32, country_code: &str) -> Result<HolidayLookup>;
}

/// Currency rate fixings
#[async_trait]
pub trait RateApi: Send + Sync {
    async fn exchange_rate(
        &self,
        currency_from: &str,
        currency_to: &str,
        currency_date: CurrencyDate,
    ) -> Result<RateSnapshot>;
}

/// Source of the current UTC calendar date
pub trait Clock: Send + Sync {
    fn current_date(&self) -> Result<NaiveDate>;
}

/// The full set of adapters an agent process talks to
#[derive(Clone)]
pub struct DataSources {
    pub countries: Arc<dyn CountryApi>,
    pub weather: Arc<dyn WeatherApi>,
    pub holidays: Arc<dyn HolidayApi>,
    pub rates: Arc<dyn RateApi>,
    pub clock: Arc<dyn Clock>,
}

impl DataSources {
    /// HTTP-backed adapters pointed at the configured providers
    pub fn http(config: &AgentConfig) -> Result<Self> {
        let timeout = config.request_timeout;
        let endpoints = &config.endpoints;

        Ok(Self {
            countries: Arc::new(RestCountriesClient::new(&endpoints.countries, timeout)?),
            weather: Arc::new(OpenMeteoClient::new(&endpoints.weather, timeout)?),
            holidays: Arc::new(NagerDateClient::new(&endpoints.holidays, timeout)?),
            rates: Arc::new(FrankfurterClient::new(&endpoints.rates, timeout)?),
            clock: Arc::new(SystemClock),
        })
    }
}

/// Status and body of one upstream response
#[derive(Debug, Clone)]
pub(crate) struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn has_content(&self) -> bool {
        self.status != 204 && !self.body.trim().is_empty()
    }
}

/// Shared pooled client with a per-request timeout
#[derive(Clone)]
pub(crate) struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(timeout)
            .build()
            .map_err(|e| {
                OrchestrationError::Internal(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Append path segments to the base URL, percent-encoding each one
    pub fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            OrchestrationError::Config(format!("Invalid base URL '{}': {}", self.base_url, e))
        })?;

        {
            let mut path = url.path_segments_mut().map_err(|_| {
                OrchestrationError::Config(format!(
                    "Base URL '{}' cannot carry a path",
                    self.base_url
                ))
            })?;
            path.pop_if_empty().extend(segments);
        }

        Ok(url)
    }

    pub async fn get(&self, segments: &[&str], query: &[(&str, String)]) -> Result<RawResponse> {
        let url = self.url(segments)?;
        debug!(url = %url, "Upstream GET");

        let response = self
            .client
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "Upstream request failed");
                OrchestrationError::from(e)
            })?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(url = %url, status, bytes = body.len(), "Upstream response");

        Ok(RawResponse { status, body })
    }
}

/// Short excerpt of an upstream body for error messages
pub(crate) fn body_excerpt(body: &str) -> String {
    const LIMIT: usize = 200;
    let trimmed = body.trim();
    if trimmed.chars().count() <= LIMIT {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(LIMIT).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_segments_are_encoded() {
        let client =
            ApiClient::new("https://restcountries.com/v3.1/", Duration::from_secs(5)).unwrap();
        let url = client.url(&["name", "South Korea"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://restcountries.com/v3.1/name/South%20Korea"
        );
    }

    #[test]
    fn test_url_without_base_path() {
        let client = ApiClient::new("https://api.frankfurter.app", Duration::from_secs(5)).unwrap();
        let url = client.url(&["2025-10-15"]).unwrap();
        assert_eq!(url.as_str(), "https://api.frankfurter.app/2025-10-15");
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let client = ApiClient::new("not a url", Duration::from_secs(5)).unwrap();
        assert!(matches!(
            client.url(&["name"]),
            Err(OrchestrationError::Config(_))
        ));
    }

    #[test]
    fn test_raw_response_content() {
        let empty = RawResponse {
            status: 204,
            body: String::new(),
        };
        assert!(empty.is_success());
        assert!(!empty.has_content());
    }

    #[test]
    fn test_body_excerpt_truncates() {
        let long = "x".repeat(500);
        let excerpt = body_excerpt(&long);
        assert!(excerpt.chars().count() <= 201);
    }
}
