//! Country registry adapter (REST Countries v3.1)

use super::{body_excerpt, ApiClient, CountryApi, RawResponse};
use crate::error::OrchestrationError;
use crate::models::{Coordinates, CountryProfile, CurrencyInfo, FlagImages, MapLinks, NOT_AVAILABLE};
use crate::Result;
use async_trait::async_trait;
use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;
use tracing::info;

pub struct RestCountriesClient {
    api: ApiClient,
}

impl RestCountriesClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(base_url, timeout)?,
        })
    }
}

#[async_trait]
impl CountryApi for RestCountriesClient {
    async fn country_info(&self, country_name: &str) -> Result<CountryProfile> {
        let name = country_name.trim();
        if name.is_empty() {
            return Err(OrchestrationError::InvalidParameter(
                "country name must not be empty".to_string(),
            ));
        }

        let response = self.api.get(&["name", name], &[]).await?;
        let profile = parse_country_response(&response, name)?;

        info!(
            query = %name,
            country = %profile.name,
            code = ?profile.country_code,
            "Country profile fetched"
        );

        Ok(profile)
    }
}

pub(crate) fn parse_country_response(
    response: &RawResponse,
    country_name: &str,
) -> Result<CountryProfile> {
    if response.status == 404 {
        return Err(OrchestrationError::NotFound(country_name.to_string()));
    }

    if !response.is_success() {
        return Err(OrchestrationError::upstream(
            Some(response.status),
            format!(
                "HTTP {}: could not retrieve data for '{}': {}",
                response.status,
                country_name,
                body_excerpt(&response.body)
            ),
        ));
    }

    if !response.has_content() {
        return Err(OrchestrationError::NotFound(country_name.to_string()));
    }

    let countries: Vec<RawCountry> = serde_json::from_str(&response.body)?;

    // Ambiguous names resolve to the registry's first match
    let first = countries
        .into_iter()
        .next()
        .ok_or_else(|| OrchestrationError::NotFound(country_name.to_string()))?;

    Ok(first.into_profile(country_name))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCountry {
    name: Option<RawName>,
    capital: Option<Vec<String>>,
    population: Option<u64>,
    languages: Option<OrderedEntries<String>>,
    flag: Option<String>,
    flags: Option<RawFlags>,
    maps: Option<RawMaps>,
    capital_info: Option<RawCapitalInfo>,
    cca2: Option<String>,
    region: Option<String>,
    subregion: Option<String>,
    currencies: Option<OrderedEntries<RawCurrency>>,
}

#[derive(Debug, Deserialize)]
struct RawName {
    common: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFlags {
    png: Option<String>,
    svg: Option<String>,
    alt: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMaps {
    google_maps: Option<String>,
    open_street_maps: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCapitalInfo {
    latlng: Option<Vec<f64>>,
}

/// JSON object decoded as key/value pairs in payload order
#[derive(Debug)]
struct OrderedEntries<V>(Vec<(String, V)>);

impl<V> Default for OrderedEntries<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<'de, V: DeserializeOwned> Deserialize<'de> for OrderedEntries<V> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V: DeserializeOwned> Visitor<'de> for EntriesVisitor<V> {
            type Value = OrderedEntries<V>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a JSON object")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, V>()? {
                    entries.push(entry);
                }
                Ok(OrderedEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

#[derive(Debug, Deserialize)]
struct RawCurrency {
    name: Option<String>,
    symbol: Option<String>,
}

impl RawCountry {
    fn into_profile(self, queried_name: &str) -> CountryProfile {
        let name = self
            .name
            .and_then(|n| n.common)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| queried_name.to_string());

        let capital = self
            .capital
            .and_then(|capitals| capitals.into_iter().next())
            .filter(|c| !c.trim().is_empty());

        let latlng = self
            .capital_info
            .and_then(|info| info.latlng)
            .unwrap_or_default();
        let capital_coordinates = match latlng.as_slice() {
            [lat, lon, ..] => Coordinates {
                latitude: Some(*lat),
                longitude: Some(*lon),
            },
            _ => Coordinates::default(),
        };

        let flags = self.flags;
        let flag = FlagImages {
            emoji: self.flag.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            png_url: flags.as_ref().and_then(|f| f.png.clone()),
            svg_url: flags.as_ref().and_then(|f| f.svg.clone()),
            alt_text: flags.and_then(|f| f.alt),
        };

        let map_links = self
            .maps
            .map(|m| MapLinks {
                google: m.google_maps,
                open_street_map: m.open_street_maps,
            })
            .unwrap_or_default();

        let country_code = self
            .cca2
            .map(|code| code.trim().to_uppercase())
            .filter(|code| code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()));

        let currencies = self
            .currencies
            .unwrap_or_default()
            .0
            .into_iter()
            .map(|(code, currency)| CurrencyInfo {
                code,
                name: currency.name,
                symbol: currency.symbol,
            })
            .collect();

        CountryProfile {
            name,
            capital,
            population: self.population.unwrap_or(0),
            languages: self
                .languages
                .unwrap_or_default()
                .0
                .into_iter()
                .map(|(_, language)| language)
                .collect(),
            flag,
            map_links,
            capital_coordinates,
            country_code,
            region: self.region,
            subregion: self.subregion,
            currencies,
        }
    }
}
