//! Travel Agent Orchestrator
//!
//! Answers travel questions by combining four public data providers:
//! - Country facts (REST Countries)
//! - 7-day temperature forecasts (Open-Meteo)
//! - Public holiday calendars (Nager.Date)
//! - Currency exchange rates (Frankfurter)
//!
//! QUERY → ROUTE → COUNTRY FSM | EXCHANGE FSM → RESPONSE

pub mod adapters;
pub mod agent;
pub mod api;
pub mod classifier;
pub mod config;
pub mod error;
pub mod execution;
pub mod models;
pub mod tools;
pub mod weather_models;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use classifier::{QueryClassifier, QueryDomain};
