//! In-memory adapters for orchestrator tests

use crate::adapters::{Clock, CountryApi, DataSources, HolidayApi, RateApi, WeatherApi};
use crate::error::OrchestrationError;
use crate::models::{
    Coordinates, CountryProfile, CurrencyDate, CurrencyInfo, DailyTemperature, FlagImages,
    Holiday, HolidayLookup, MapLinks, RateSnapshot, WeatherSummary, FORECAST_DAYS,
};
use crate::Result;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 15).unwrap()
}

pub fn profile(
    name: &str,
    capital: &str,
    code: &str,
    region: &str,
    point: Option<(f64, f64)>,
) -> CountryProfile {
    CountryProfile {
        name: name.to_string(),
        capital: Some(capital.to_string()),
        population: 68_000_000,
        languages: vec!["French".to_string()],
        flag: FlagImages {
            emoji: "🏳".to_string(),
            png_url: Some(format!("https://flagcdn.com/w320/{}.png", code.to_lowercase())),
            svg_url: None,
            alt_text: None,
        },
        map_links: MapLinks {
            google: Some(format!("https://goo.gl/maps/{}", code)),
            open_street_map: None,
        },
        capital_coordinates: Coordinates {
            latitude: point.map(|p| p.0),
            longitude: point.map(|p| p.1),
        },
        country_code: Some(code.to_string()),
        region: Some(region.to_string()),
        subregion: None,
        currencies: vec![CurrencyInfo {
            code: "EUR".to_string(),
            name: Some("Euro".to_string()),
            symbol: Some("€".to_string()),
        }],
    }
}

pub fn week_forecast(model: &str) -> WeatherSummary {
    WeatherSummary {
        model: model.to_string(),
        days: (0..FORECAST_DAYS as i64)
            .map(|i| DailyTemperature {
                date: today() + Duration::days(i),
                temp_max_c: 20.0 + i as f64,
                temp_min_c: 10.0 + i as f64,
            })
            .collect(),
    }
}

#[derive(Default)]
pub struct CallLog {
    pub country: AtomicUsize,
    pub weather: AtomicUsize,
    pub holidays: AtomicUsize,
    pub rates: AtomicUsize,
    pub clock: AtomicUsize,
    pub weather_models: Mutex<Vec<String>>,
    pub holiday_requests: Mutex<Vec<(i32, String)>>,
    pub rate_requests: Mutex<Vec<(String, String, CurrencyDate)>>,
}

impl CallLog {
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// Configurable fake adapters sharing one call log
pub struct FakeSources {
    pub profiles: Vec<CountryProfile>,
    pub country_error: Option<OrchestrationError>,
    pub weather_error: Option<OrchestrationError>,
    pub holidays: Result<HolidayLookup>,
    pub rates: HashMap<(String, String), f64>,
    pub rate_error: Option<OrchestrationError>,
    pub today: Result<NaiveDate>,
    pub log: Arc<CallLog>,
}

impl Default for FakeSources {
    fn default() -> Self {
        let mut turkey = profile("Turkey", "Ankara", "TR", "Asia", Some((39.93, 32.86)));
        turkey.languages = vec!["Turkish".to_string()];
        turkey.subregion = Some("Western Asia".to_string());

        let mut rates = HashMap::new();
        rates.insert(("USD".to_string(), "KRW".to_string()), 1350.2);
        rates.insert(("EUR".to_string(), "TRY".to_string()), 18.0);
        rates.insert(("USD".to_string(), "JPY".to_string()), 149.5);

        Self {
            profiles: vec![
                profile("France", "Paris", "FR", "Europe", Some((48.87, 2.33))),
                turkey,
            ],
            country_error: None,
            weather_error: None,
            holidays: Ok(HolidayLookup::Found {
                holidays: vec![
                    Holiday {
                        date: NaiveDate::from_ymd_opt(2025, 4, 23).unwrap(),
                        local_name: "Ulusal Egemenlik ve Çocuk Bayramı".to_string(),
                        english_name: "National Sovereignty and Children's Day".to_string(),
                    },
                    Holiday {
                        date: NaiveDate::from_ymd_opt(2025, 10, 29).unwrap(),
                        local_name: "Cumhuriyet Bayramı".to_string(),
                        english_name: "Republic Day".to_string(),
                    },
                ],
            }),
            rates,
            rate_error: None,
            today: Ok(today()),
            log: Arc::new(CallLog::default()),
        }
    }
}

impl FakeSources {
    pub fn sources(&self) -> DataSources {
        let shared = Arc::new(FakeAdapters {
            profiles: self.profiles.clone(),
            country_error: self.country_error.clone(),
            weather_error: self.weather_error.clone(),
            holidays: self.holidays.clone(),
            rates: self.rates.clone(),
            rate_error: self.rate_error.clone(),
            today: self.today.clone(),
            log: Arc::clone(&self.log),
        });

        DataSources {
            countries: shared.clone(),
            weather: shared.clone(),
            holidays: shared.clone(),
            rates: shared.clone(),
            clock: shared,
        }
    }

    pub fn into_sources(self) -> DataSources {
        self.sources()
    }
}

struct FakeAdapters {
    profiles: Vec<CountryProfile>,
    country_error: Option<OrchestrationError>,
    weather_error: Option<OrchestrationError>,
    holidays: Result<HolidayLookup>,
    rates: HashMap<(String, String), f64>,
    rate_error: Option<OrchestrationError>,
    today: Result<NaiveDate>,
    log: Arc<CallLog>,
}

#[async_trait]
impl CountryApi for FakeAdapters {
    async fn country_info(&self, country_name: &str) -> Result<CountryProfile> {
        self.log.country.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = &self.country_error {
            return Err(e.clone());
        }
        self.profiles
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(country_name.trim()))
            .cloned()
            .ok_or_else(|| OrchestrationError::NotFound(country_name.to_string()))
    }
}

#[async_trait]
impl WeatherApi for FakeAdapters {
    async fn forecast(&self, _latitude: f64, _longitude: f64, model: &str) -> Result<WeatherSummary> {
        self.log.weather.fetch_add(1, Ordering::SeqCst);
        self.log.weather_models.lock().unwrap().push(model.to_string());
        match &self.weather_error {
            Some(e) => Err(e.clone()),
            None => Ok(week_forecast(model)),
        }
    }
}

#[async_trait]
impl HolidayApi for FakeAdapters {
    async fn public_holidays(&self, year: i32, country_code: &str) -> Result<HolidayLookup> {
        self.log.holidays.fetch_add(1, Ordering::SeqCst);
        self.log
            .holiday_requests
            .lock()
            .unwrap()
            .push((year, country_code.to_string()));
        self.holidays.clone()
    }
}

#[async_trait]
impl RateApi for FakeAdapters {
    async fn exchange_rate(
        &self,
        currency_from: &str,
        currency_to: &str,
        currency_date: CurrencyDate,
    ) -> Result<RateSnapshot> {
        self.log.rates.fetch_add(1, Ordering::SeqCst);
        self.log.rate_requests.lock().unwrap().push((
            currency_from.to_string(),
            currency_to.to_string(),
            currency_date,
        ));
        if let Some(e) = &self.rate_error {
            return Err(e.clone());
        }

        let from = currency_from.to_uppercase();
        let to = currency_to.to_uppercase();
        let mut rates = BTreeMap::new();
        if let Some(rate) = self.rates.get(&(from.clone(), to.clone())) {
            rates.insert(to, *rate);
        }

        Ok(RateSnapshot {
            amount: 1.0,
            base: from,
            date: match currency_date {
                CurrencyDate::On(date) => date,
                CurrencyDate::Latest => today(),
            },
            rates,
        })
    }
}

impl Clock for FakeAdapters {
    fn current_date(&self) -> Result<NaiveDate> {
        self.log.clock.fetch_add(1, Ordering::SeqCst);
        self.today.clone()
    }
}
