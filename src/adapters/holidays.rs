//! Public holiday adapter (Nager.Date v3)

use super::{body_excerpt, ApiClient, HolidayApi, RawResponse};
use crate::error::OrchestrationError;
use crate::models::{Holiday, HolidayLookup};
use crate::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

pub struct NagerDateClient {
    api: ApiClient,
}

impl NagerDateClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(base_url, timeout)?,
        })
    }
}

#[async_trait]
impl HolidayApi for NagerDateClient {
    async fn public_holidays(&self, year: i32, country_code: &str) -> Result<HolidayLookup> {
        let code = normalize_country_code(country_code)?;
        let year_segment = year.to_string();

        let response = self
            .api
            .get(&["PublicHolidays", &year_segment, &code], &[])
            .await?;
        let lookup = parse_holiday_response(&response, year, &code)?;

        if let HolidayLookup::Found { holidays } = &lookup {
            info!(year, code = %code, count = holidays.len(), "Public holidays fetched");
        }

        Ok(lookup)
    }
}

/// ISO 3166-1 alpha-2, upper-cased
pub(crate) fn normalize_country_code(code: &str) -> Result<String> {
    let code = code.trim().to_uppercase();
    if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code)
    } else {
        Err(OrchestrationError::InvalidParameter(format!(
            "'{}' is not a two-letter country code",
            code
        )))
    }
}

pub(crate) fn parse_holiday_response(
    response: &RawResponse,
    year: i32,
    country_code: &str,
) -> Result<HolidayLookup> {
    if response.status == 404 {
        return Err(OrchestrationError::InvalidParameter(format!(
            "Invalid country code or unsupported year/country combination: '{}' in {}",
            country_code, year
        )));
    }

    if !response.is_success() {
        return Err(OrchestrationError::upstream(
            Some(response.status),
            format!(
                "HTTP {}: could not retrieve holidays: {}",
                response.status,
                body_excerpt(&response.body)
            ),
        ));
    }

    let raw: Vec<RawHoliday> = if response.has_content() {
        serde_json::from_str(&response.body)?
    } else {
        Vec::new()
    };

    if raw.is_empty() {
        return Ok(HolidayLookup::NoneFound {
            message: format!(
                "No public holidays found for country code '{}' in {}.",
                country_code, year
            ),
        });
    }

    let holidays = raw
        .into_iter()
        .map(|h| Holiday {
            date: h.date,
            local_name: h.local_name,
            english_name: h.name,
        })
        .collect();

    Ok(HolidayLookup::Found { holidays })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHoliday {
    date: NaiveDate,
    local_name: String,
    name: String,
}
