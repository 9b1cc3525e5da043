use chrono::NaiveDate;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use travel_agent_orchestrator::{
    adapters::{DataSources, FixedClock},
    agent::TravelAgent,
    config::AgentConfig,
    weather_models::WeatherModelTable,
};

const USAGE: &str = "usage: travel-agent [--date YYYY-MM-DD] <query>";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let mut pinned_date: Option<NaiveDate> = None;
    let mut words = Vec::new();

    while let Some(arg) = args.next() {
        if arg == "--date" {
            let value = args.next().ok_or(USAGE)?;
            pinned_date = Some(NaiveDate::parse_from_str(&value, "%Y-%m-%d")?);
        } else {
            words.push(arg);
        }
    }

    let query = words.join(" ");
    if query.trim().is_empty() {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    }

    let config = AgentConfig::from_env()?;
    let mut sources = DataSources::http(&config)?;
    if let Some(date) = pinned_date {
        info!(date = %date, "Using pinned date");
        sources.clock = Arc::new(FixedClock(date));
    }

    let models = WeatherModelTable::with_overrides(&config.weather_model_overrides);
    let agent = TravelAgent::new(&sources, models, config.currency.clone());

    let response = agent.handle(&query).await;

    println!("{}", response.answer);
    info!(
        request_id = %response.request_id,
        status = ?response.status,
        steps = response.trace.len(),
        "Done"
    );

    Ok(())
}
