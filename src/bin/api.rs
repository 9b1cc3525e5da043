use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use travel_agent_orchestrator::{
    adapters::DataSources,
    agent::TravelAgent,
    api::start_server,
    config::AgentConfig,
    execution::ExecutionEngine,
    tools::create_default_registry,
    weather_models::WeatherModelTable,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load environment variables
    let config = AgentConfig::from_env()?;

    info!("🚀 Travel Agent Orchestrator - API Server");
    info!("📍 Port: {}", config.port);

    // Create components
    let sources = DataSources::http(&config)?;
    let models = WeatherModelTable::with_overrides(&config.weather_model_overrides);
    let agent = Arc::new(TravelAgent::new(
        &sources,
        Arc::clone(&models),
        config.currency.clone(),
    ));
    let registry = create_default_registry(&sources, models, config.currency.clone());
    let engine = Arc::new(ExecutionEngine::new(registry));

    info!("✅ Agents initialized");
    info!("📡 Starting API server...");

    // Start API server
    start_server(agent, engine, config.port).await?;

    Ok(())
}
