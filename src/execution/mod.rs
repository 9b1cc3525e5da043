//! Execution engine for tool directives
//!
//! An external reasoning engine decides which tool to call; this is where the
//! call actually happens. Tool errors never escape: every directive yields
//! one observation.

use crate::models::{ExecutionStatus, Observation, ToolInput};
use crate::tools::ToolRegistry;
use crate::error::OrchestrationError;
use chrono::Utc;
use serde_json::json;
use std::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

/// Executes tool directives against a registry
#[derive(Clone)]
pub struct ExecutionEngine {
    tool_registry: ToolRegistry,
}

impl ExecutionEngine {
    pub fn new(tool_registry: ToolRegistry) -> Self {
        Self { tool_registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.tool_registry
    }

    /// Execute a single directive
    pub async fn execute(&self, directive: &ToolInput) -> Observation {
        let start = Instant::now();

        let (status, tool_output) = match self.tool_registry.get(&directive.tool_name) {
            Some(tool) => match tool.execute(directive).await {
                Ok(output) => (ExecutionStatus::Success, output.data),
                Err(e) => {
                    warn!(
                        tool_name = %directive.tool_name,
                        error = %e,
                        "Tool execution failed"
                    );
                    (ExecutionStatus::Failed, error_payload(&e))
                }
            },
            None => {
                warn!(tool_name = %directive.tool_name, "Tool not registered");
                let e = OrchestrationError::ToolNotFound(directive.tool_name.clone());
                (ExecutionStatus::Skipped, error_payload(&e))
            }
        };

        let execution_time_ms = start.elapsed().as_millis() as u64;

        debug!(
            tool_name = %directive.tool_name,
            status = ?status,
            execution_time_ms,
            "Directive executed"
        );

        Observation {
            observation_id: Uuid::new_v4(),
            tool_name: directive.tool_name.clone(),
            tool_input: directive.parameters.clone(),
            tool_output,
            execution_time_ms,
            created_at: Utc::now(),
            status,
        }
    }
}

fn error_payload(e: &OrchestrationError) -> serde_json::Value {
    json!({
        "error": e.to_string(),
        "kind": e.kind(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::testing::FakeSources;
    use crate::config::CurrencyDefaults;
    use crate::tools::{create_default_registry, EXCHANGE_AGENT_TOOLS};
    use crate::weather_models::WeatherModelTable;

    fn engine(sources: FakeSources) -> ExecutionEngine {
        let registry = create_default_registry(
            &sources.into_sources(),
            WeatherModelTable::shared(),
            CurrencyDefaults::default(),
        );
        ExecutionEngine::new(registry)
    }

    fn directive(tool: &str, parameters: serde_json::Value) -> ToolInput {
        ToolInput {
            tool_name: tool.to_string(),
            parameters,
        }
    }

    #[tokio::test]
    async fn test_successful_directive() {
        let engine = engine(FakeSources::default());
        let observation = engine
            .execute(&directive("get_country_info", json!({"country_name": "France"})))
            .await;

        assert_eq!(observation.status, ExecutionStatus::Success);
        assert_eq!(observation.tool_output["capital"], "Paris");
        assert_eq!(observation.tool_input["country_name"], "France");
    }

    #[tokio::test]
    async fn test_failed_directive_carries_kind() {
        let engine = engine(FakeSources::default());
        let observation = engine
            .execute(&directive("get_country_info", json!({"country_name": "Atlantis"})))
            .await;

        assert_eq!(observation.status, ExecutionStatus::Failed);
        assert_eq!(observation.tool_output["kind"], "not_found");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_skipped() {
        let engine = engine(FakeSources::default());
        let observation = engine.execute(&directive("book_flight", json!({}))).await;

        assert_eq!(observation.status, ExecutionStatus::Skipped);
        assert_eq!(observation.tool_output["kind"], "tool_not_found");
    }

    #[tokio::test]
    async fn test_filtered_registry_hides_other_agent_tools() {
        let base = engine(FakeSources::default());
        let exchange_only = ExecutionEngine::new(base.registry().filtered(EXCHANGE_AGENT_TOOLS));

        let observation = exchange_only
            .execute(&directive("get_country_info", json!({"country_name": "France"})))
            .await;
        assert_eq!(observation.status, ExecutionStatus::Skipped);
    }
}
