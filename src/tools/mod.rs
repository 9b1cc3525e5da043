//! Tool trait and registry
//!
//! Tools are the named capabilities an external reasoning engine can invoke.
//! Each one validates its JSON parameters and forwards to one adapter.

use crate::adapters::{Clock, CountryApi, DataSources, HolidayApi, RateApi, WeatherApi};
use crate::config::CurrencyDefaults;
use crate::error::OrchestrationError;
use crate::models::{CurrencyDate, StepKind, ToolInput, ToolOutput};
use crate::weather_models::WeatherModelTable;
use crate::Result;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Tools the country agent may call
pub const COUNTRY_AGENT_TOOLS: &[&str] = &[
    "get_country_info",
    "get_public_holidays",
    "get_weather_forecast",
    "get_current_date",
];

/// Tools the exchange agent may call
pub const EXCHANGE_AGENT_TOOLS: &[&str] = &["get_current_date", "get_exchange_rate"];

/// Trait for a single tool
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    async fn execute(&self, input: &ToolInput) -> Result<ToolOutput>;
}

/// Tool registry for looking up and executing tools
#[derive(Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Registered tool names, sorted
    pub fn list(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    pub fn describe(&self) -> Vec<(&'static str, &'static str)> {
        self.tools
            .values()
            .map(|tool| (tool.name(), tool.description()))
            .collect()
    }

    /// A registry restricted to the named tools
    pub fn filtered(&self, names: &[&str]) -> Self {
        Self {
            tools: self
                .tools
                .iter()
                .filter(|(name, _)| names.contains(&name.as_str()))
                .map(|(name, tool)| (name.clone(), Arc::clone(tool)))
                .collect(),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_parameters<T: DeserializeOwned>(input: &ToolInput) -> Result<T> {
    let parameters = if input.parameters.is_null() {
        json!({})
    } else {
        input.parameters.clone()
    };

    if !parameters.is_object() {
        return Err(OrchestrationError::InvalidToolInput(
            "tool_input must be a JSON object".to_string(),
        ));
    }

    serde_json::from_value(parameters).map_err(|e| {
        OrchestrationError::InvalidToolInput(format!("{}: {}", input.tool_name, e))
    })
}

fn to_output<T: serde::Serialize>(value: &T) -> Result<ToolOutput> {
    serde_json::to_value(value)
        .map(ToolOutput::new)
        .map_err(|e| OrchestrationError::Internal(format!("Failed to encode tool output: {}", e)))
}

//
// ================= get_country_info =================
//

pub struct CountryInfoTool {
    api: Arc<dyn CountryApi>,
}

#[derive(Deserialize)]
struct CountryInfoParams {
    country_name: String,
}

#[async_trait::async_trait]
impl Tool for CountryInfoTool {
    fn name(&self) -> &'static str {
        StepKind::CountryInfo.tool_name()
    }

    fn description(&self) -> &'static str {
        "Fetch capital, population, languages, flag, maps and capital coordinates for a country name"
    }

    async fn execute(&self, input: &ToolInput) -> Result<ToolOutput> {
        let params: CountryInfoParams = parse_parameters(input)?;
        let profile = self.api.country_info(&params.country_name).await?;
        to_output(&profile)
    }
}

//
// ================= get_weather_forecast =================
//

pub struct WeatherForecastTool {
    api: Arc<dyn WeatherApi>,
    models: Arc<WeatherModelTable>,
}

#[derive(Deserialize)]
struct WeatherParams {
    latitude: f64,
    longitude: f64,
    model: Option<String>,
}

#[async_trait::async_trait]
impl Tool for WeatherForecastTool {
    fn name(&self) -> &'static str {
        StepKind::WeatherForecast.tool_name()
    }

    fn description(&self) -> &'static str {
        "Daily maximum and minimum temperatures for the next 7 days; latitude and longitude are required"
    }

    async fn execute(&self, input: &ToolInput) -> Result<ToolOutput> {
        let params: WeatherParams = parse_parameters(input)?;
        let model = params
            .model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.models.fallback().to_string());

        let summary = self
            .api
            .forecast(params.latitude, params.longitude, &model)
            .await?;
        to_output(&summary)
    }
}

//
// ================= get_public_holidays =================
//

pub struct PublicHolidaysTool {
    api: Arc<dyn HolidayApi>,
}

#[derive(Deserialize)]
struct HolidayParams {
    year: i32,
    country_code: String,
}

#[async_trait::async_trait]
impl Tool for PublicHolidaysTool {
    fn name(&self) -> &'static str {
        StepKind::PublicHolidays.tool_name()
    }

    fn description(&self) -> &'static str {
        "Public holidays (local and English names) for a year and two-letter country code"
    }

    async fn execute(&self, input: &ToolInput) -> Result<ToolOutput> {
        let params: HolidayParams = parse_parameters(input)?;
        let lookup = self
            .api
            .public_holidays(params.year, &params.country_code)
            .await?;
        to_output(&lookup)
    }
}

//
// ================= get_current_date =================
//

pub struct CurrentDateTool {
    clock: Arc<dyn Clock>,
}

#[async_trait::async_trait]
impl Tool for CurrentDateTool {
    fn name(&self) -> &'static str {
        StepKind::CurrentDate.tool_name()
    }

    fn description(&self) -> &'static str {
        "Current UTC calendar date as YYYY-MM-DD"
    }

    async fn execute(&self, _input: &ToolInput) -> Result<ToolOutput> {
        let today = self.clock.current_date()?;
        Ok(ToolOutput::new(json!({
            "current_date": today.format("%Y-%m-%d").to_string(),
        })))
    }
}

//
// ================= get_exchange_rate =================
//

pub struct ExchangeRateTool {
    api: Arc<dyn RateApi>,
    defaults: CurrencyDefaults,
}

#[derive(Deserialize)]
struct RateParams {
    currency_from: Option<String>,
    currency_to: Option<String>,
    currency_date: Option<String>,
}

#[async_trait::async_trait]
impl Tool for ExchangeRateTool {
    fn name(&self) -> &'static str {
        StepKind::ExchangeRate.tool_name()
    }

    fn description(&self) -> &'static str {
        "Exchange rate between two ISO 4217 currencies on a YYYY-MM-DD date or 'latest'"
    }

    async fn execute(&self, input: &ToolInput) -> Result<ToolOutput> {
        let params: RateParams = parse_parameters(input)?;
        let from = params
            .currency_from
            .unwrap_or_else(|| self.defaults.from.clone());
        let to = params
            .currency_to
            .unwrap_or_else(|| self.defaults.to.clone());
        let date = match params.currency_date {
            Some(raw) => raw.parse::<CurrencyDate>()?,
            None => CurrencyDate::Latest,
        };

        let snapshot = self.api.exchange_rate(&from, &to, date).await?;
        to_output(&snapshot)
    }
}

/// Registry exposing every adapter as a tool
pub fn create_default_registry(
    sources: &DataSources,
    models: Arc<WeatherModelTable>,
    defaults: CurrencyDefaults,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(Arc::new(CountryInfoTool {
        api: Arc::clone(&sources.countries),
    }));
    registry.register(Arc::new(WeatherForecastTool {
        api: Arc::clone(&sources.weather),
        models,
    }));
    registry.register(Arc::new(PublicHolidaysTool {
        api: Arc::clone(&sources.holidays),
    }));
    registry.register(Arc::new(CurrentDateTool {
        clock: Arc::clone(&sources.clock),
    }));
    registry.register(Arc::new(ExchangeRateTool {
        api: Arc::clone(&sources.rates),
        defaults,
    }));

    registry
}
