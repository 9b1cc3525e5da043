//! Forecast adapter (Open-Meteo)

use super::{body_excerpt, ApiClient, RawResponse, WeatherApi};
use crate::error::OrchestrationError;
use crate::models::{DailyTemperature, WeatherSummary, FORECAST_DAYS};
use crate::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

const DAILY_VARIABLES: &str = "temperature_2m_max,temperature_2m_min";

pub struct OpenMeteoClient {
    api: ApiClient,
}

impl OpenMeteoClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(base_url, timeout)?,
        })
    }
}

#[async_trait]
impl WeatherApi for OpenMeteoClient {
    async fn forecast(
        &self,
        latitude: f64,
        longitude: f64,
        model: &str,
    ) -> Result<WeatherSummary> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(OrchestrationError::InvalidParameter(format!(
                "coordinates out of range: lat={}, lon={}",
                latitude, longitude
            )));
        }

        let query = [
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("daily", DAILY_VARIABLES.to_string()),
            ("models", model.to_string()),
            ("forecast_days", FORECAST_DAYS.to_string()),
        ];

        let response = self.api.get(&["forecast"], &query).await?;
        let summary = parse_forecast_response(&response, model)?;

        info!(
            latitude,
            longitude,
            model = %model,
            days = summary.days.len(),
            "Forecast fetched"
        );

        Ok(summary)
    }
}

pub(crate) fn parse_forecast_response(response: &RawResponse, model: &str) -> Result<WeatherSummary> {
    if !response.is_success() {
        let reason = serde_json::from_str::<ProviderError>(&response.body)
            .ok()
            .and_then(|e| e.reason)
            .unwrap_or_else(|| body_excerpt(&response.body));
        return Err(OrchestrationError::upstream(
            Some(response.status),
            format!("forecast provider returned HTTP {}: {}", response.status, reason),
        ));
    }

    if !response.has_content() {
        return Err(OrchestrationError::upstream(
            Some(response.status),
            "no response received from the forecast provider",
        ));
    }

    let forecast: ForecastResponse = serde_json::from_str(&response.body)?;

    let daily = forecast.daily.ok_or_else(|| {
        OrchestrationError::upstream(None, "daily data is missing in the forecast response")
    })?;

    let maxima = daily.temperature_max.ok_or_else(|| {
        OrchestrationError::upstream(None, "daily temperature_2m_max series is missing")
    })?;
    let minima = daily.temperature_min.ok_or_else(|| {
        OrchestrationError::upstream(None, "daily temperature_2m_min series is missing")
    })?;

    if maxima.len() != daily.time.len() || minima.len() != daily.time.len() {
        return Err(OrchestrationError::upstream(
            None,
            format!(
                "daily series lengths disagree: {} dates, {} maxima, {} minima",
                daily.time.len(),
                maxima.len(),
                minima.len()
            ),
        ));
    }

    let mut days = Vec::with_capacity(daily.time.len());

    for ((time, max), min) in daily.time.iter().zip(maxima).zip(minima) {
        let date = NaiveDate::parse_from_str(time, "%Y-%m-%d").map_err(|_| {
            OrchestrationError::upstream(None, format!("unparsable forecast date '{}'", time))
        })?;

        let (temp_max_c, temp_min_c) = match (max, min) {
            (Some(max), Some(min)) => (max, min),
            _ => {
                return Err(OrchestrationError::upstream(
                    None,
                    format!("forecast for {} has no temperature values", time),
                ))
            }
        };

        days.push(DailyTemperature {
            date,
            temp_max_c,
            temp_min_c,
        });
    }

    days.sort_by_key(|d| d.date);

    if days.len() != FORECAST_DAYS {
        return Err(OrchestrationError::upstream(
            None,
            format!(
                "expected {} forecast days, provider returned {}",
                FORECAST_DAYS,
                days.len()
            ),
        ));
    }

    Ok(WeatherSummary {
        model: model.to_string(),
        days,
    })
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: Option<DailySeries>,
}

#[derive(Debug, Deserialize)]
struct DailySeries {
    time: Vec<String>,
    #[serde(rename = "temperature_2m_max")]
    temperature_max: Option<Vec<Option<f64>>>,
    #[serde(rename = "temperature_2m_min")]
    temperature_min: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    reason: Option<String>,
}
