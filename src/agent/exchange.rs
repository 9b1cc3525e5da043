//! Exchange rate orchestrator
//!
//! RESOLVE_DATE → FETCH_RATE → DONE, or FAILED from either step.

use crate::adapters::{Clock, DataSources, RateApi};
use crate::classifier::CurrencyMention;
use crate::config::CurrencyDefaults;
use crate::error::OrchestrationError;
use crate::models::{CurrencyDate, ExchangeQuote, StepKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const EXCHANGE_AGENT_NAME: &str = "exchange_agent";
pub const EXCHANGE_AGENT_DESCRIPTION: &str =
    "An agent that provides currency exchange rates between two currencies";

/// Arguments of one exchange rate question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRequest {
    pub currency_from: String,
    pub currency_to: String,
    /// YYYY-MM-DD, `latest`, or unset for today
    pub currency_date: Option<String>,
}

impl ExchangeRequest {
    pub fn new(from: impl Into<String>, to: impl Into<String>, date: Option<String>) -> Self {
        Self {
            currency_from: from.into(),
            currency_to: to.into(),
            currency_date: date,
        }
    }

    /// Fill whatever the query left out from the configured defaults
    pub fn from_mention(mention: &CurrencyMention, defaults: &CurrencyDefaults) -> Self {
        Self {
            currency_from: mention
                .from
                .clone()
                .unwrap_or_else(|| defaults.from.clone()),
            currency_to: mention.to.clone().unwrap_or_else(|| defaults.to.clone()),
            currency_date: mention.date.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExchangeState {
    ResolveDate,
    FetchRate { date: NaiveDate },
    Done(ExchangeQuote),
    Failed { step: StepKind, error: OrchestrationError },
}

impl ExchangeState {
    pub fn label(&self) -> &'static str {
        match self {
            ExchangeState::ResolveDate => "RESOLVE_DATE",
            ExchangeState::FetchRate { .. } => "FETCH_RATE",
            ExchangeState::Done(_) => "DONE",
            ExchangeState::Failed { .. } => "FAILED",
        }
    }

    /// The outcome of a terminal state, or the state itself if work remains
    pub fn into_outcome(self) -> Result<ExchangeOutcome, Self> {
        match self {
            ExchangeState::Done(quote) => Ok(ExchangeOutcome::Quote(quote)),
            ExchangeState::Failed { step, error } => Ok(ExchangeOutcome::Failed { step, error }),
            pending => Err(pending),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExchangeOutcome {
    Quote(ExchangeQuote),
    Failed { step: StepKind, error: OrchestrationError },
}

/// Terminal outcome plus the transitions that led to it
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeRun {
    pub outcome: ExchangeOutcome,
    pub trace: Vec<String>,
}

#[derive(Clone)]
pub struct ExchangeOrchestrator {
    rates: Arc<dyn RateApi>,
    clock: Arc<dyn Clock>,
}

impl ExchangeOrchestrator {
    pub fn new(rates: Arc<dyn RateApi>, clock: Arc<dyn Clock>) -> Self {
        Self { rates, clock }
    }

    pub fn from_sources(sources: &DataSources) -> Self {
        Self::new(Arc::clone(&sources.rates), Arc::clone(&sources.clock))
    }

    /// Perform the work of one state and return the next one
    pub async fn advance(&self, request: &ExchangeRequest, state: ExchangeState) -> ExchangeState {
        match state {
            ExchangeState::ResolveDate => self.resolve_date(request),
            ExchangeState::FetchRate { date } => self.fetch_rate(request, date).await,
            terminal => terminal,
        }
    }

    /// Drive the machine from RESOLVE_DATE to a terminal state
    pub async fn run(&self, request: &ExchangeRequest) -> ExchangeRun {
        let mut trace = vec![format!(
            "EXCHANGE: {} -> {} ({})",
            request.currency_from,
            request.currency_to,
            request.currency_date.as_deref().unwrap_or("today")
        )];
        let mut state = ExchangeState::ResolveDate;

        loop {
            let from = state.label();
            state = match state.into_outcome() {
                Ok(outcome) => {
                    if let ExchangeOutcome::Quote(quote) = &outcome {
                        info!(
                            base = %quote.base,
                            target = %quote.target,
                            date = %quote.date,
                            rate = quote.rate,
                            "Exchange rate resolved"
                        );
                    }
                    return ExchangeRun { outcome, trace };
                }
                Err(pending) => self.advance(request, pending).await,
            };
            debug!(from, to = state.label(), "Exchange transition");
            trace.push(format!("{} -> {}", from, state.label()));
        }
    }

    fn resolve_date(&self, request: &ExchangeRequest) -> ExchangeState {
        let explicit = request
            .currency_date
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty());

        match explicit.map(str::parse::<CurrencyDate>) {
            Some(Ok(CurrencyDate::On(date))) => ExchangeState::FetchRate { date },
            Some(Ok(CurrencyDate::Latest)) | None => self.today(),
            Some(Err(e)) => {
                warn!(error = %e, "Rejected exchange date");
                ExchangeState::Failed {
                    step: StepKind::CurrentDate,
                    error: OrchestrationError::Dependency(format!("unusable currency date: {}", e)),
                }
            }
        }
    }

    fn today(&self) -> ExchangeState {
        match self.clock.current_date() {
            Ok(date) => ExchangeState::FetchRate { date },
            Err(e) => {
                warn!(error = %e, "Current date unavailable");
                ExchangeState::Failed {
                    step: StepKind::CurrentDate,
                    error: OrchestrationError::Dependency(format!("current date unavailable: {}", e)),
                }
            }
        }
    }

    async fn fetch_rate(&self, request: &ExchangeRequest, date: NaiveDate) -> ExchangeState {
        let snapshot = match self
            .rates
            .exchange_rate(
                &request.currency_from,
                &request.currency_to,
                CurrencyDate::On(date),
            )
            .await
        {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(error = %error, "Rate provider call failed");
                return ExchangeState::Failed {
                    step: StepKind::ExchangeRate,
                    error,
                };
            }
        };

        let target = request.currency_to.trim().to_uppercase();
        match snapshot.rates.get(&target) {
            Some(rate) => ExchangeState::Done(ExchangeQuote {
                base: snapshot.base,
                target,
                date: CurrencyDate::On(snapshot.date),
                rate: *rate,
            }),
            None => ExchangeState::Failed {
                step: StepKind::ExchangeRate,
                error: OrchestrationError::MissingField(format!("rates.{}", target)),
            },
        }
    }
}
