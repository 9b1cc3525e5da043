//! Top-level dispatcher
//!
//! Routes a query to the exchange or country orchestrator by subject matter
//! and turns the terminal state into an [`AgentResponse`]. Makes no tool
//! calls of its own.

use super::country::{render_country_report, CountryOrchestrator, CountryOutcome, CountryQuery};
use super::exchange::{ExchangeOrchestrator, ExchangeOutcome, ExchangeRequest, ExchangeRun};
use crate::adapters::DataSources;
use crate::classifier::{QueryClassifier, QueryDomain};
use crate::config::CurrencyDefaults;
use crate::error::OrchestrationError;
use crate::models::{AgentResponse, ResponseStatus, Route, StepFailure, StepKind};
use crate::weather_models::WeatherModelTable;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Clone)]
pub struct TravelAgent {
    country: CountryOrchestrator,
    exchange: ExchangeOrchestrator,
    currency: CurrencyDefaults,
}

impl TravelAgent {
    pub fn new(
        sources: &DataSources,
        models: Arc<WeatherModelTable>,
        currency: CurrencyDefaults,
    ) -> Self {
        Self {
            country: CountryOrchestrator::new(sources, models, currency.clone()),
            exchange: ExchangeOrchestrator::from_sources(sources),
            currency,
        }
    }

    pub fn currency_defaults(&self) -> &CurrencyDefaults {
        &self.currency
    }

    pub fn route(query: &str) -> Route {
        match QueryClassifier::classify(query) {
            QueryDomain::Currency => Route::Exchange,
            QueryDomain::Country => Route::Country,
        }
    }

    /// Answer a free-text query
    pub async fn handle(&self, query: &str) -> AgentResponse {
        let route = Self::route(query);
        info!(query = %query, route = ?route, "Dispatching query");

        match route {
            Route::Exchange => {
                let request = self.country.exchange_request(query).await;
                self.ask_exchange(&request).await
            }
            Route::Country => self.ask_country(query).await,
        }
    }

    /// Country capability only
    pub async fn ask_country(&self, query: &str) -> AgentResponse {
        let request_id = Uuid::new_v4();
        let run = self.country.run(&CountryQuery::from_text(query)).await;
        let trace = run.trace;

        let response = match run.outcome {
            CountryOutcome::Report(report) => AgentResponse {
                request_id,
                route: Route::Country,
                status: if report.is_partial() {
                    ResponseStatus::Partial
                } else {
                    ResponseStatus::Complete
                },
                answer: render_country_report(&report),
                country: Some(report),
                exchange: None,
                error: None,
                trace,
            },
            CountryOutcome::Delegated(exchange) => {
                exchange_response(request_id, exchange.outcome, trace)
            }
            CountryOutcome::Failed { step, error } => {
                failed_response(request_id, Route::Country, step, &error, trace)
            }
        };

        log_response(&response);
        response
    }

    /// Exchange capability only
    pub async fn ask_exchange(&self, request: &ExchangeRequest) -> AgentResponse {
        let ExchangeRun { outcome, trace } = self.exchange.run(request).await;
        let response = exchange_response(Uuid::new_v4(), outcome, trace);
        log_response(&response);
        response
    }
}

fn exchange_response(request_id: Uuid, outcome: ExchangeOutcome, trace: Vec<String>) -> AgentResponse {
    match outcome {
        ExchangeOutcome::Quote(quote) => AgentResponse {
            request_id,
            route: Route::Exchange,
            status: ResponseStatus::Complete,
            answer: quote.summary(),
            country: None,
            exchange: Some(quote),
            error: None,
            trace,
        },
        ExchangeOutcome::Failed { step, error } => {
            failed_response(request_id, Route::Exchange, step, &error, trace)
        }
    }
}

fn failed_response(
    request_id: Uuid,
    route: Route,
    step: StepKind,
    error: &OrchestrationError,
    trace: Vec<String>,
) -> AgentResponse {
    AgentResponse {
        request_id,
        route,
        status: ResponseStatus::Failed,
        answer: error.to_string(),
        country: None,
        exchange: None,
        error: Some(StepFailure::new(step, error)),
        trace,
    }
}

fn log_response(response: &AgentResponse) {
    info!(
        request_id = %response.request_id,
        route = ?response.route,
        status = ?response.status,
        "Query answered"
    );
}
