//! REST API Server for the Travel Agent
//!
//! Exposes the dispatcher, the two agent capabilities and the raw tools
//! over HTTP

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::agent::{agent_cards, ExchangeRequest, TravelAgent};
use crate::error::ErrorKind;
use crate::execution::ExecutionEngine;
use crate::models::{AgentResponse, ExecutionStatus, ResponseStatus, ToolInput};

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExchangeBody {
    pub currency_from: Option<String>,
    pub currency_to: Option<String>,
    pub currency_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ToolBody {
    #[serde(default)]
    pub parameters: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ToolDescription {
    name: &'static str,
    description: &'static str,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Error that still carries the structured result
    pub fn failure<T: Serialize>(message: String, data: T) -> Self {
        Self {
            data: serde_json::to_value(data).ok(),
            ..Self::error(message)
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub agent: Arc<TravelAgent>,
    pub tools: Arc<ExecutionEngine>,
}

fn status_for_kind(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound | ErrorKind::ToolNotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidParameter | ErrorKind::InvalidToolInput => StatusCode::BAD_REQUEST,
        ErrorKind::Upstream | ErrorKind::MissingField | ErrorKind::Dependency => {
            StatusCode::BAD_GATEWAY
        }
        ErrorKind::Internal | ErrorKind::Config => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn respond(response: AgentResponse) -> (StatusCode, Json<ApiResponse>) {
    if response.status != ResponseStatus::Failed {
        return (StatusCode::OK, Json(ApiResponse::success(response)));
    }

    let status = response
        .error
        .as_ref()
        .map(|e| status_for_kind(e.kind))
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let message = response.answer.clone();
    (status, Json(ApiResponse::failure(message, response)))
}

fn missing_query() -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::error("Query must not be empty".into())),
    )
}

/// =============================
/// Health & Discovery
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn agent_card() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "travel_agent",
        "description": "Country facts, weather, public holidays and exchange rates for travellers",
        "agents": agent_cards(),
    }))
}

/// =============================
/// Query Endpoints
/// =============================

async fn query_handler(
    State(state): State<ApiState>,
    Json(req): Json<QueryRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    if req.query.trim().is_empty() {
        return missing_query();
    }
    info!(query = %req.query, "Received query");
    respond(state.agent.handle(&req.query).await)
}

async fn chat_handler(
    State(state): State<ApiState>,
    Json(req): Json<ChatRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    let Some(user_msg) = req.messages.iter().rev().find(|m| m.role == "user") else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("No user message found".into())),
        );
    };
    if user_msg.content.trim().is_empty() {
        return missing_query();
    }
    info!(query = %user_msg.content, turns = req.messages.len(), "Received chat turn");
    respond(state.agent.handle(&user_msg.content).await)
}

async fn country_handler(
    State(state): State<ApiState>,
    Json(req): Json<QueryRequest>,
) -> (StatusCode, Json<ApiResponse>) {
    if req.query.trim().is_empty() {
        return missing_query();
    }
    respond(state.agent.ask_country(&req.query).await)
}

async fn exchange_handler(
    State(state): State<ApiState>,
    Json(req): Json<ExchangeBody>,
) -> (StatusCode, Json<ApiResponse>) {
    let defaults = state.agent.currency_defaults();
    let request = ExchangeRequest::new(
        req.currency_from.unwrap_or_else(|| defaults.from.clone()),
        req.currency_to.unwrap_or_else(|| defaults.to.clone()),
        req.currency_date,
    );
    respond(state.agent.ask_exchange(&request).await)
}

/// =============================
/// Tool Endpoints
/// =============================

async fn list_tools(State(state): State<ApiState>) -> Json<ApiResponse> {
    let tools: Vec<ToolDescription> = state
        .tools
        .registry()
        .describe()
        .into_iter()
        .map(|(name, description)| ToolDescription { name, description })
        .collect();
    Json(ApiResponse::success(tools))
}

async fn run_tool(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    Json(req): Json<ToolBody>,
) -> (StatusCode, Json<ApiResponse>) {
    let directive = ToolInput {
        tool_name: name,
        parameters: req.parameters,
    };
    let observation = state.tools.execute(&directive).await;

    if observation.status == ExecutionStatus::Success {
        return (StatusCode::OK, Json(ApiResponse::success(observation)));
    }

    let status = observation
        .tool_output
        .get("kind")
        .cloned()
        .and_then(|kind| serde_json::from_value::<ErrorKind>(kind).ok())
        .map(status_for_kind)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let message = observation
        .tool_output
        .get("error")
        .and_then(|e| e.as_str())
        .unwrap_or("tool execution failed")
        .to_string();

    (status, Json(ApiResponse::failure(message, observation)))
}

/// =============================
/// Router
/// =============================

pub fn create_router(agent: Arc<TravelAgent>, tools: Arc<ExecutionEngine>) -> Router {
    let state = ApiState { agent, tools };

    Router::new()
        .route("/health", get(health))
        .route("/.well-known/agent.json", get(agent_card))
        .route("/api/query", post(query_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/agents/country", post(country_handler))
        .route("/api/agents/exchange", post(exchange_handler))
        .route("/api/tools", get(list_tools))
        .route("/api/tools/:name", post(run_tool))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    agent: Arc<TravelAgent>,
    tools: Arc<ExecutionEngine>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(agent, tools);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
