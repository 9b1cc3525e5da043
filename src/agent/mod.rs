//! Travel agent orchestration
//!
//! QUERY → ROUTE → (COUNTRY FSM | EXCHANGE FSM) → RESPONSE

pub mod country;
pub mod dispatcher;
pub mod exchange;

#[cfg(test)]
pub(crate) mod testing;

pub use country::{
    render_country_report, CountryOrchestrator, CountryOutcome, CountryQuery, CountryRun,
    CountryState, COUNTRY_AGENT_DESCRIPTION, COUNTRY_AGENT_NAME,
};
pub use dispatcher::TravelAgent;
pub use exchange::{
    ExchangeOrchestrator, ExchangeOutcome, ExchangeRequest, ExchangeRun, ExchangeState,
    EXCHANGE_AGENT_DESCRIPTION, EXCHANGE_AGENT_NAME,
};

use crate::tools::{COUNTRY_AGENT_TOOLS, EXCHANGE_AGENT_TOOLS};
use serde::Serialize;

/// Public description of one agent capability
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AgentCard {
    pub name: &'static str,
    pub description: &'static str,
    pub tools: &'static [&'static str],
}

pub fn agent_cards() -> Vec<AgentCard> {
    vec![
        AgentCard {
            name: COUNTRY_AGENT_NAME,
            description: COUNTRY_AGENT_DESCRIPTION,
            tools: COUNTRY_AGENT_TOOLS,
        },
        AgentCard {
            name: EXCHANGE_AGENT_NAME,
            description: EXCHANGE_AGENT_DESCRIPTION,
            tools: EXCHANGE_AGENT_TOOLS,
        },
    ]
}
