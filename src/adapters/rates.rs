//! Currency rate adapter (Frankfurter)

use super::{body_excerpt, ApiClient, RateApi, RawResponse};
use crate::error::OrchestrationError;
use crate::models::{CurrencyDate, RateSnapshot};
use crate::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

pub struct FrankfurterClient {
    api: ApiClient,
}

impl FrankfurterClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(base_url, timeout)?,
        })
    }
}

#[async_trait]
impl RateApi for FrankfurterClient {
    async fn exchange_rate(
        &self,
        currency_from: &str,
        currency_to: &str,
        currency_date: CurrencyDate,
    ) -> Result<RateSnapshot> {
        let from = normalize_currency_code(currency_from)?;
        let to = normalize_currency_code(currency_to)?;
        let date_segment = currency_date.to_string();

        let response = self
            .api
            .get(&[&date_segment], &[("from", from.clone()), ("to", to.clone())])
            .await?;
        let snapshot = parse_rate_response(&response)?;

        info!(
            from = %from,
            to = %to,
            requested = %date_segment,
            date = %snapshot.date,
            "Exchange rate fetched"
        );

        Ok(snapshot)
    }
}

/// ISO 4217, upper-cased
pub(crate) fn normalize_currency_code(code: &str) -> Result<String> {
    let code = code.trim().to_uppercase();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code)
    } else {
        Err(OrchestrationError::InvalidParameter(format!(
            "'{}' is not a three-letter currency code",
            code
        )))
    }
}

pub(crate) fn parse_rate_response(response: &RawResponse) -> Result<RateSnapshot> {
    if !response.is_success() {
        return Err(OrchestrationError::upstream(
            Some(response.status),
            format!(
                "rate provider returned HTTP {}: {}",
                response.status,
                body_excerpt(&response.body)
            ),
        ));
    }

    Ok(serde_json::from_str(&response.body)?)
}
