//! Core data models for the travel agent
//!
//! Everything here is a request-scoped value: built from one adapter call or
//! one orchestration run and never mutated afterwards.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{ErrorKind, OrchestrationError};

/// Number of daily entries requested from the forecast provider
pub const FORECAST_DAYS: usize = 7;

/// Sentinel rendered for absent optional country facts
pub const NOT_AVAILABLE: &str = "N/A";

//
// ================= Country =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountryProfile {
    pub name: String,
    pub capital: Option<String>,
    pub population: u64,
    pub languages: Vec<String>,
    pub flag: FlagImages,
    pub map_links: MapLinks,
    pub capital_coordinates: Coordinates,
    pub country_code: Option<String>,
    pub region: Option<String>,
    pub subregion: Option<String>,
    pub currencies: Vec<CurrencyInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlagImages {
    pub emoji: String,
    pub png_url: Option<String>,
    pub svg_url: Option<String>,
    pub alt_text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MapLinks {
    pub google: Option<String>,
    pub open_street_map: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Coordinates {
    /// Both halves are required for a forecast lookup
    pub fn point(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrencyInfo {
    pub code: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
}

impl CountryProfile {
    pub fn capital_or_na(&self) -> &str {
        self.capital.as_deref().unwrap_or(NOT_AVAILABLE)
    }
}

//
// ================= Weather =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyTemperature {
    pub date: NaiveDate,
    pub temp_max_c: f64,
    pub temp_min_c: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeatherSummary {
    pub model: String,
    pub days: Vec<DailyTemperature>,
}

//
// ================= Holidays =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Holiday {
    pub date: NaiveDate,
    pub local_name: String,
    pub english_name: String,
}

/// An empty calendar is a valid answer, not a failure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HolidayLookup {
    Found { holidays: Vec<Holiday> },
    NoneFound { message: String },
}

//
// ================= Exchange =================
//

/// Date parameter of the rate provider: a calendar day or the most recent fixing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CurrencyDate {
    Latest,
    On(NaiveDate),
}

pub const LATEST_TOKEN: &str = "latest";

impl fmt::Display for CurrencyDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurrencyDate::Latest => write!(f, "{}", LATEST_TOKEN),
            CurrencyDate::On(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl FromStr for CurrencyDate {
    type Err = OrchestrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(LATEST_TOKEN) {
            return Ok(CurrencyDate::Latest);
        }
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(CurrencyDate::On)
            .map_err(|_| {
                OrchestrationError::InvalidParameter(format!(
                    "'{}' is not a YYYY-MM-DD date or '{}'",
                    trimmed, LATEST_TOKEN
                ))
            })
    }
}

impl TryFrom<String> for CurrencyDate {
    type Error = OrchestrationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyDate> for String {
    fn from(value: CurrencyDate) -> Self {
        value.to_string()
    }
}

/// Normalized rate provider payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateSnapshot {
    pub amount: f64,
    pub base: String,
    pub date: NaiveDate,
    pub rates: BTreeMap<String, f64>,
}

/// `rate` is the amount of `target` equivalent to one unit of `base`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExchangeQuote {
    pub base: String,
    pub target: String,
    pub date: CurrencyDate,
    pub rate: f64,
}

impl ExchangeQuote {
    pub fn summary(&self) -> String {
        format!(
            "On {}, the exchange rate was 1 {} = {} {}.",
            self.date, self.base, self.rate, self.target
        )
    }
}

//
// ================= Steps & Partial Results =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StepKind {
    #[serde(rename = "get_country_info")]
    CountryInfo,
    #[serde(rename = "get_weather_forecast")]
    WeatherForecast,
    #[serde(rename = "get_public_holidays")]
    PublicHolidays,
    #[serde(rename = "get_current_date")]
    CurrentDate,
    #[serde(rename = "get_exchange_rate")]
    ExchangeRate,
}

impl StepKind {
    pub fn tool_name(&self) -> &'static str {
        match self {
            StepKind::CountryInfo => "get_country_info",
            StepKind::WeatherForecast => "get_weather_forecast",
            StepKind::PublicHolidays => "get_public_holidays",
            StepKind::CurrentDate => "get_current_date",
            StepKind::ExchangeRate => "get_exchange_rate",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StepKind::CountryInfo => "Country information",
            StepKind::WeatherForecast => "Weather forecast",
            StepKind::PublicHolidays => "Public holidays",
            StepKind::CurrentDate => "Current date",
            StepKind::ExchangeRate => "Exchange rate",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tool_name())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepFailure {
    pub step: StepKind,
    pub kind: ErrorKind,
    pub message: String,
}

impl StepFailure {
    pub fn new(step: StepKind, error: &OrchestrationError) -> Self {
        Self {
            step,
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    /// Human-readable fragment naming the failed capability and the reason
    pub fn fragment(&self) -> String {
        format!(
            "{} unavailable ({} failed): {}",
            self.step.label(),
            self.step.tool_name(),
            self.message
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkippedStep {
    pub step: StepKind,
    pub reason: String,
}

/// Partial-failure return shape of the country flow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountryReport {
    pub profile: CountryProfile,
    pub weather: Option<WeatherSummary>,
    pub holidays: Option<HolidayLookup>,
    pub succeeded: Vec<StepKind>,
    pub failed: Vec<StepFailure>,
    pub skipped: Vec<SkippedStep>,
}

impl CountryReport {
    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty()
    }
}

//
// ================= Final Response =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Country,
    Exchange,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Complete,
    Partial,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    pub request_id: Uuid,
    pub route: Route,
    pub status: ResponseStatus,
    pub answer: String,
    pub country: Option<CountryReport>,
    pub exchange: Option<ExchangeQuote>,
    pub error: Option<StepFailure>,
    pub trace: Vec<String>,
}

//
// ================= Tool I/O =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInput {
    pub tool_name: String,
    #[serde(default)]
    pub parameters: serde_json::Value,
}

/// Successful tool result; failures travel as `OrchestrationError`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub data: serde_json::Value,
}

impl ToolOutput {
    pub fn new(data: serde_json::Value) -> Self {
        Self { data }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub observation_id: Uuid,
    pub tool_name: String,
    pub tool_input: serde_json::Value,
    pub tool_output: serde_json::Value,
    pub execution_time_ms: u64,
    pub created_at: DateTime<Utc>,
    pub status: ExecutionStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Failed,
    Skipped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_date_parsing() {
        assert_eq!("latest".parse::<CurrencyDate>().unwrap(), CurrencyDate::Latest);
        assert_eq!(
            "2023-01-15".parse::<CurrencyDate>().unwrap(),
            CurrencyDate::On(NaiveDate::from_ymd_opt(2023, 1, 15).unwrap())
        );
        assert!(matches!(
            "15/01/2023".parse::<CurrencyDate>(),
            Err(OrchestrationError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_currency_date_serializes_as_string() {
        let date = CurrencyDate::On(NaiveDate::from_ymd_opt(2025, 10, 15).unwrap());
        assert_eq!(serde_json::to_string(&date).unwrap(), "\"2025-10-15\"");
        assert_eq!(
            serde_json::to_string(&CurrencyDate::Latest).unwrap(),
            "\"latest\""
        );
    }

    #[test]
    fn test_quote_summary_format() {
        let quote = ExchangeQuote {
            base: "USD".into(),
            target: "KRW".into(),
            date: CurrencyDate::On(NaiveDate::from_ymd_opt(2025, 10, 15).unwrap()),
            rate: 1350.2,
        };
        assert_eq!(
            quote.summary(),
            "On 2025-10-15, the exchange rate was 1 USD = 1350.2 KRW."
        );
    }

    #[test]
    fn test_coordinates_point_requires_both() {
        let full = Coordinates {
            latitude: Some(48.87),
            longitude: Some(2.33),
        };
        assert_eq!(full.point(), Some((48.87, 2.33)));

        let half = Coordinates {
            latitude: Some(48.87),
            longitude: None,
        };
        assert_eq!(half.point(), None);
    }

    #[test]
    fn test_step_failure_fragment_names_capability() {
        let failure = StepFailure::new(
            StepKind::WeatherForecast,
            &OrchestrationError::upstream(None, "request timed out"),
        );
        let fragment = failure.fragment();
        assert!(fragment.contains("Weather forecast"));
        assert!(fragment.contains("get_weather_forecast"));
        assert!(fragment.contains("request timed out"));
    }

    #[test]
    fn test_step_kind_serializes_as_tool_name() {
        let json = serde_json::to_string(&StepKind::PublicHolidays).unwrap();
        assert_eq!(json, "\"get_public_holidays\"");
    }
}
