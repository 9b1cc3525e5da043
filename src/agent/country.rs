//! Country orchestrator
//!
//! CLASSIFY → FETCH_COUNTRY → FETCH_DETAILS → ASSEMBLE → DONE
//!
//! Currency questions are handed to the exchange orchestrator at CLASSIFY.
//! Only the country lookup is mandatory; weather and holidays degrade to
//! per-step failures inside the report.

use super::exchange::{ExchangeOrchestrator, ExchangeRequest, ExchangeRun};
use crate::adapters::{Clock, CountryApi, DataSources, HolidayApi, WeatherApi};
use crate::classifier::{QueryClassifier, QueryDomain};
use crate::config::CurrencyDefaults;
use crate::error::OrchestrationError;
use crate::models::{
    CountryProfile, CountryReport, HolidayLookup, SkippedStep, StepFailure, StepKind,
    WeatherSummary, NOT_AVAILABLE,
};
use crate::weather_models::WeatherModelTable;
use crate::Result;
use chrono::Datelike;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const COUNTRY_AGENT_NAME: &str = "country_agent";
pub const COUNTRY_AGENT_DESCRIPTION: &str = "An agent that provides information about the country";

/// A country question and what was extracted from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryQuery {
    pub text: String,
    pub country: String,
    pub wants_holidays: bool,
}

impl CountryQuery {
    pub fn from_text(text: &str) -> Self {
        Self {
            text: text.trim().to_string(),
            country: QueryClassifier::country_name(text),
            wants_holidays: QueryClassifier::wants_holidays(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CountryState {
    Classify,
    FetchCountry,
    FetchDetails {
        profile: CountryProfile,
    },
    Assemble {
        profile: CountryProfile,
        weather: Option<Result<WeatherSummary>>,
        holidays: Option<Result<HolidayLookup>>,
        skipped: Vec<SkippedStep>,
    },
    Delegated(ExchangeRun),
    Done(CountryReport),
    Failed {
        step: StepKind,
        error: OrchestrationError,
    },
}

impl CountryState {
    pub fn label(&self) -> &'static str {
        match self {
            CountryState::Classify => "CLASSIFY",
            CountryState::FetchCountry => "FETCH_COUNTRY",
            CountryState::FetchDetails { .. } => "FETCH_DETAILS",
            CountryState::Assemble { .. } => "ASSEMBLE",
            CountryState::Delegated(_) => "DELEGATED",
            CountryState::Done(_) => "DONE",
            CountryState::Failed { .. } => "FAILED",
        }
    }

    pub fn into_outcome(self) -> std::result::Result<CountryOutcome, Self> {
        match self {
            CountryState::Done(report) => Ok(CountryOutcome::Report(report)),
            CountryState::Delegated(run) => Ok(CountryOutcome::Delegated(run)),
            CountryState::Failed { step, error } => Ok(CountryOutcome::Failed { step, error }),
            pending => Err(pending),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CountryOutcome {
    Report(CountryReport),
    Delegated(ExchangeRun),
    Failed { step: StepKind, error: OrchestrationError },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryRun {
    pub outcome: CountryOutcome,
    pub trace: Vec<String>,
}

#[derive(Clone)]
pub struct CountryOrchestrator {
    countries: Arc<dyn CountryApi>,
    weather: Arc<dyn WeatherApi>,
    holidays: Arc<dyn HolidayApi>,
    clock: Arc<dyn Clock>,
    models: Arc<WeatherModelTable>,
    exchange: ExchangeOrchestrator,
    currency: CurrencyDefaults,
}

impl CountryOrchestrator {
    pub fn new(
        sources: &DataSources,
        models: Arc<WeatherModelTable>,
        currency: CurrencyDefaults,
    ) -> Self {
        Self {
            countries: Arc::clone(&sources.countries),
            weather: Arc::clone(&sources.weather),
            holidays: Arc::clone(&sources.holidays),
            clock: Arc::clone(&sources.clock),
            models,
            exchange: ExchangeOrchestrator::from_sources(sources),
            currency,
        }
    }

    /// Perform the work of one state and return the next one
    pub async fn advance(&self, query: &CountryQuery, state: CountryState) -> CountryState {
        match state {
            CountryState::Classify => self.classify(query).await,
            CountryState::FetchCountry => self.fetch_country(query).await,
            CountryState::FetchDetails { profile } => self.fetch_details(query, profile).await,
            CountryState::Assemble {
                profile,
                weather,
                holidays,
                skipped,
            } => CountryState::Done(assemble(profile, weather, holidays, skipped)),
            terminal => terminal,
        }
    }

    /// Drive the machine from CLASSIFY to a terminal state
    pub async fn run(&self, query: &CountryQuery) -> CountryRun {
        let mut trace = vec![format!("COUNTRY: '{}'", query.text)];
        let mut state = CountryState::Classify;

        loop {
            let from = state.label();
            state = match state.into_outcome() {
                Ok(outcome) => return CountryRun { outcome, trace },
                Err(pending) => self.advance(query, pending).await,
            };
            debug!(from, to = state.label(), "Country transition");
            trace.push(format!("{} -> {}", from, state.label()));

            if let CountryState::Delegated(exchange) = &state {
                trace.extend(exchange.trace.iter().cloned());
            }
        }
    }

    /// Exchange arguments for a currency question. When no target code is
    /// given but a country is named, that country's currency is the target.
    pub async fn exchange_request(&self, text: &str) -> ExchangeRequest {
        let mut mention = QueryClassifier::currency_mention(text);

        if mention.to.is_none() {
            if let Some(country) = QueryClassifier::named_country(text) {
                let base = mention
                    .from
                    .clone()
                    .unwrap_or_else(|| self.currency.from.clone());
                match self.countries.country_info(&country).await {
                    Ok(profile) => {
                        mention.to = profile
                            .currencies
                            .iter()
                            .map(|c| c.code.to_uppercase())
                            .find(|code| *code != base);
                        debug!(country = %profile.name, target = ?mention.to, "Target currency from country");
                    }
                    Err(e) => {
                        debug!(country = %country, error = %e, "No currency for named country");
                    }
                }
            }
        }

        ExchangeRequest::from_mention(&mention, &self.currency)
    }

    async fn classify(&self, query: &CountryQuery) -> CountryState {
        if QueryClassifier::classify(&query.text) == QueryDomain::Currency {
            let request = self.exchange_request(&query.text).await;
            info!(
                from = %request.currency_from,
                to = %request.currency_to,
                "Currency query delegated to exchange flow"
            );
            return CountryState::Delegated(self.exchange.run(&request).await);
        }
        CountryState::FetchCountry
    }

    async fn fetch_country(&self, query: &CountryQuery) -> CountryState {
        match self.countries.country_info(&query.country).await {
            Ok(profile) => {
                info!(
                    country = %profile.name,
                    code = profile.country_code.as_deref().unwrap_or(NOT_AVAILABLE),
                    "Country resolved"
                );
                CountryState::FetchDetails { profile }
            }
            Err(error) => {
                warn!(country = %query.country, error = %error, "Country lookup failed");
                CountryState::Failed {
                    step: StepKind::CountryInfo,
                    error,
                }
            }
        }
    }

    async fn fetch_details(&self, query: &CountryQuery, profile: CountryProfile) -> CountryState {
        let mut skipped = Vec::new();

        let holiday_code = if query.wants_holidays {
            if profile.country_code.is_none() {
                skipped.push(SkippedStep {
                    step: StepKind::PublicHolidays,
                    reason: format!("no country code is known for {}", profile.name),
                });
            }
            profile.country_code.clone()
        } else {
            None
        };

        let forecast_point = profile
            .capital_coordinates
            .point()
            .map(|(lat, lon)| (lat, lon, self.models.model_for(&profile).to_string()));

        let weather_step = async {
            match &forecast_point {
                Some((lat, lon, model)) => {
                    debug!(latitude = lat, longitude = lon, model = %model, "Fetching forecast");
                    Some(self.weather.forecast(*lat, *lon, model).await)
                }
                None => None,
            }
        };

        let holidays_step = async {
            match &holiday_code {
                Some(code) => Some(self.fetch_holidays(code).await),
                None => None,
            }
        };

        let (weather, holidays) = tokio::join!(weather_step, holidays_step);

        CountryState::Assemble {
            profile,
            weather,
            holidays,
            skipped,
        }
    }

    async fn fetch_holidays(&self, country_code: &str) -> Result<HolidayLookup> {
        let year = self
            .clock
            .current_date()
            .map_err(|e| OrchestrationError::Dependency(format!("current date unavailable: {}", e)))?
            .year();
        self.holidays.public_holidays(year, country_code).await
    }
}

fn assemble(
    profile: CountryProfile,
    weather: Option<Result<WeatherSummary>>,
    holidays: Option<Result<HolidayLookup>>,
    skipped: Vec<SkippedStep>,
) -> CountryReport {
    let mut succeeded = vec![StepKind::CountryInfo];
    let mut failed = Vec::new();

    let weather = settle(StepKind::WeatherForecast, weather, &mut succeeded, &mut failed);
    let holidays = settle(StepKind::PublicHolidays, holidays, &mut succeeded, &mut failed);

    CountryReport {
        profile,
        weather,
        holidays,
        succeeded,
        failed,
        skipped,
    }
}

fn settle<T>(
    step: StepKind,
    result: Option<Result<T>>,
    succeeded: &mut Vec<StepKind>,
    failed: &mut Vec<StepFailure>,
) -> Option<T> {
    match result? {
        Ok(value) => {
            succeeded.push(step);
            Some(value)
        }
        Err(e) => {
            warn!(step = %step, error = %e, "Optional step failed");
            failed.push(StepFailure::new(step, &e));
            None
        }
    }
}

/// Plain-text answer for a country report
pub fn render_country_report(report: &CountryReport) -> String {
    let profile = &report.profile;
    let mut out = String::new();

    out.push_str(&format!("{} {}\n", profile.flag.emoji, profile.name));
    out.push_str(&format!("Capital: {}\n", profile.capital_or_na()));
    out.push_str(&format!("Population: {}\n", profile.population));
    out.push_str(&format!(
        "Languages: {}\n",
        if profile.languages.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            profile.languages.join(", ")
        }
    ));
    if !profile.currencies.is_empty() {
        let currencies: Vec<String> = profile
            .currencies
            .iter()
            .map(|c| match &c.symbol {
                Some(symbol) => format!("{} ({})", c.code, symbol),
                None => c.code.clone(),
            })
            .collect();
        out.push_str(&format!("Currency: {}\n", currencies.join(", ")));
    }
    if let Some(png) = &profile.flag.png_url {
        out.push_str(&format!("Flag: {}\n", png));
    }
    if let Some(google) = &profile.map_links.google {
        out.push_str(&format!("Google Maps: {}\n", google));
    }
    if let Some(osm) = &profile.map_links.open_street_map {
        out.push_str(&format!("OpenStreetMap: {}\n", osm));
    }

    if let Some(weather) = &report.weather {
        out.push_str(&format!(
            "\n{}-day forecast for {} ({}):\n",
            weather.days.len(),
            profile.capital_or_na(),
            weather.model
        ));
        for day in &weather.days {
            out.push_str(&format!(
                "  {}: max {:.1}°C / min {:.1}°C\n",
                day.date, day.temp_max_c, day.temp_min_c
            ));
        }
    }

    match &report.holidays {
        Some(HolidayLookup::Found { holidays }) => {
            out.push_str(&format!("\nPublic holidays ({}):\n", holidays.len()));
            for holiday in holidays {
                out.push_str(&format!(
                    "  {}: {} ({})\n",
                    holiday.date, holiday.local_name, holiday.english_name
                ));
            }
        }
        Some(HolidayLookup::NoneFound { message }) => {
            out.push_str(&format!("\n{}\n", message));
        }
        None => {}
    }

    if !report.failed.is_empty() || !report.skipped.is_empty() {
        out.push('\n');
    }
    for failure in &report.failed {
        out.push_str(&format!("{}\n", failure.fragment()));
    }
    for skipped in &report.skipped {
        out.push_str(&format!("{} skipped: {}\n", skipped.step.label(), skipped.reason));
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::exchange::ExchangeOutcome;
    use crate::agent::testing::{profile, CallLog, FakeSources};
    use crate::models::{CurrencyInfo, FORECAST_DAYS};

    fn orchestrator(fakes: &FakeSources) -> CountryOrchestrator {
        CountryOrchestrator::new(
            &fakes.sources(),
            WeatherModelTable::shared(),
            CurrencyDefaults::default(),
        )
    }

    fn report(run: CountryRun) -> CountryReport {
        match run.outcome {
            CountryOutcome::Report(report) => report,
            other => panic!("expected a report, got {:?}", other),
        }
    }

    #[test]
    fn test_query_extraction() {
        let query = CountryQuery::from_text("Holidays in Turkey this year");
        assert_eq!(query.country, "Turkey");
        assert!(query.wants_holidays);
    }

    #[tokio::test]
    async fn test_capital_question_fetches_weather_not_holidays() {
        let fakes = FakeSources::default();
        let run = orchestrator(&fakes)
            .run(&CountryQuery::from_text("What's the capital of France?"))
            .await;
        let report = report(run);

        assert_eq!(report.profile.capital.as_deref(), Some("Paris"));
        assert_eq!(report.weather.as_ref().map(|w| w.days.len()), Some(FORECAST_DAYS));
        assert!(report.holidays.is_none());
        assert!(report.failed.is_empty());
        assert_eq!(
            report.succeeded,
            vec![StepKind::CountryInfo, StepKind::WeatherForecast]
        );
        assert_eq!(CallLog::count(&fakes.log.holidays), 0);
        assert_eq!(
            fakes.log.weather_models.lock().unwrap().as_slice(),
            ["meteofrance_seamless".to_string()]
        );

        let answer = render_country_report(&report);
        assert!(answer.contains("Capital: Paris"));
        assert!(answer.contains("Languages: French"));
        assert!(answer.contains("Currency: EUR (€)"));
        assert!(answer.contains("max 20.0°C / min 10.0°C"));
    }

    #[tokio::test]
    async fn test_holiday_question_uses_current_year() {
        let fakes = FakeSources::default();
        let run = orchestrator(&fakes)
            .run(&CountryQuery::from_text("Holidays in Turkey this year"))
            .await;
        let report = report(run);

        assert_eq!(
            fakes.log.holiday_requests.lock().unwrap().as_slice(),
            [(2025, "TR".to_string())]
        );
        assert!(matches!(report.holidays, Some(HolidayLookup::Found { .. })));
        assert!(report.succeeded.contains(&StepKind::PublicHolidays));

        let answer = render_country_report(&report);
        assert!(answer.contains("Cumhuriyet Bayramı (Republic Day)"));
        assert_eq!(
            fakes.log.weather_models.lock().unwrap().as_slice(),
            ["ecmwf_ifs025".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unknown_country_is_the_whole_answer() {
        let fakes = FakeSources::default();
        let run = orchestrator(&fakes)
            .run(&CountryQuery::from_text("Capital of Atlantis"))
            .await;

        assert_eq!(
            run.outcome,
            CountryOutcome::Failed {
                step: StepKind::CountryInfo,
                error: OrchestrationError::NotFound("Atlantis".into()),
            }
        );
        assert_eq!(CallLog::count(&fakes.log.weather), 0);
        assert_eq!(CallLog::count(&fakes.log.holidays), 0);
    }

    #[tokio::test]
    async fn test_weather_timeout_is_partial() {
        let fakes = FakeSources {
            weather_error: Some(OrchestrationError::upstream(None, "request timed out")),
            ..Default::default()
        };
        let run = orchestrator(&fakes)
            .run(&CountryQuery::from_text("Public holidays in Turkey"))
            .await;
        let report = report(run);

        assert!(report.is_partial());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].step, StepKind::WeatherForecast);
        assert!(report.weather.is_none());
        assert!(matches!(report.holidays, Some(HolidayLookup::Found { .. })));

        let answer = render_country_report(&report);
        assert!(answer.contains("Capital: Ankara"));
        assert!(answer.contains("Weather forecast unavailable (get_weather_forecast failed)"));
        assert!(answer.contains("Republic Day"));
    }

    #[tokio::test]
    async fn test_missing_coordinates_skip_weather_silently() {
        let fakes = FakeSources {
            profiles: vec![profile("Nauru", "Yaren", "NR", "Oceania", None)],
            ..Default::default()
        };
        let run = orchestrator(&fakes)
            .run(&CountryQuery::from_text("Tell me about Nauru"))
            .await;
        let report = report(run);

        assert_eq!(CallLog::count(&fakes.log.weather), 0);
        assert!(report.weather.is_none());
        assert!(report.failed.is_empty());
        assert!(report.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_holidays_without_code_are_noted() {
        let mut nameless = profile("Nauru", "Yaren", "NR", "Oceania", None);
        nameless.country_code = None;
        let fakes = FakeSources {
            profiles: vec![nameless],
            ..Default::default()
        };
        let run = orchestrator(&fakes)
            .run(&CountryQuery::from_text("Holidays in Nauru"))
            .await;
        let report = report(run);

        assert_eq!(CallLog::count(&fakes.log.holidays), 0);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].step, StepKind::PublicHolidays);
    }

    #[tokio::test]
    async fn test_holiday_clock_failure_is_partial() {
        let fakes = FakeSources {
            today: Err(OrchestrationError::Internal("clock unavailable".into())),
            ..Default::default()
        };
        let run = orchestrator(&fakes)
            .run(&CountryQuery::from_text("Holidays in Turkey"))
            .await;
        let report = report(run);

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].step, StepKind::PublicHolidays);
        assert!(report.weather.is_some());
    }

    #[tokio::test]
    async fn test_empty_holiday_calendar_is_reported() {
        let fakes = FakeSources {
            holidays: Ok(HolidayLookup::NoneFound {
                message: "No public holidays found for country code 'TR' in 2025.".into(),
            }),
            ..Default::default()
        };
        let run = orchestrator(&fakes)
            .run(&CountryQuery::from_text("Holidays in Turkey this year"))
            .await;
        let report = report(run);

        assert!(report.failed.is_empty());
        assert!(report.succeeded.contains(&StepKind::PublicHolidays));
        assert!(matches!(report.holidays, Some(HolidayLookup::NoneFound { .. })));

        let answer = render_country_report(&report);
        assert!(answer.contains("No public holidays found for country code 'TR' in 2025."));
        assert!(!answer.contains("Public holidays ("));
    }

    #[tokio::test]
    async fn test_named_country_supplies_target_currency() {
        let mut japan = profile("Japan", "Tokyo", "JP", "Asia", Some((35.68, 139.75)));
        japan.currencies = vec![CurrencyInfo {
            code: "JPY".into(),
            name: Some("Japanese yen".into()),
            symbol: Some("¥".into()),
        }];
        let fakes = FakeSources {
            profiles: vec![japan],
            ..Default::default()
        };
        let orchestrator = orchestrator(&fakes);

        let request = orchestrator
            .exchange_request("What is the currency of Japan?")
            .await;
        assert_eq!(request, ExchangeRequest::new("USD", "JPY", None));

        let unknown = orchestrator
            .exchange_request("What is the currency of Atlantis?")
            .await;
        assert_eq!(unknown, ExchangeRequest::new("USD", "KRW", None));
    }

    #[tokio::test]
    async fn test_explicit_target_skips_country_lookup() {
        let fakes = FakeSources::default();
        let request = orchestrator(&fakes)
            .exchange_request("How much is 1 USD in EUR in France?")
            .await;
        assert_eq!(request, ExchangeRequest::new("USD", "EUR", None));
        assert_eq!(CallLog::count(&fakes.log.country), 0);
    }

    #[tokio::test]
    async fn test_currency_question_is_delegated() {
        let fakes = FakeSources::default();
        let run = orchestrator(&fakes)
            .run(&CountryQuery::from_text("Exchange rate USD to KRW today"))
            .await;

        match run.outcome {
            CountryOutcome::Delegated(exchange) => {
                assert!(matches!(exchange.outcome, ExchangeOutcome::Quote(_)));
            }
            other => panic!("expected delegation, got {:?}", other),
        }
        assert_eq!(CallLog::count(&fakes.log.country), 0);
        assert!(run.trace.iter().any(|t| t == "CLASSIFY -> DELEGATED"));
    }
}
