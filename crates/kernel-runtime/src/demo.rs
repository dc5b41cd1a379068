//! Sample services and capability definitions.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;

use ck_02_lifecycle_container::{ServiceError, ServiceInstance};
use shared_types::{
    CapabilityDefinition, Contract, HealthStatus, McpToolContract, RestApiContract, SemanticMapping,
};

/// In-process service with a configurable init delay and health.
pub struct DemoService {
    init_delay: Duration,
    health: Mutex<HealthStatus>,
}

impl DemoService {
    pub fn new() -> Arc<Self> {
        Self::with_init_delay(Duration::ZERO)
    }

    pub fn with_init_delay(init_delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            init_delay,
            health: Mutex::new(HealthStatus::Healthy),
        })
    }

    /// Status returned by the next health check.
    pub fn set_health(&self, status: HealthStatus) {
        *self.health.lock() = status;
    }
}

#[async_trait]
impl ServiceInstance for DemoService {
    async fn initialize(&self) -> Result<(), ServiceError> {
        if !self.init_delay.is_zero() {
            tokio::time::sleep(self.init_delay).await;
        }
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), ServiceError> {
        Ok(())
    }

    async fn health_check(&self) -> HealthStatus {
        self.health.lock().clone()
    }
}

/// `content/parse_file`, owned by `content_service`, exposed over REST.
pub fn parse_file(version: &str) -> CapabilityDefinition {
    CapabilityDefinition::new("content", "parse_file", "content_service", "FileParser")
        .with_version(version)
        .with_description("Parse an uploaded file into structured content")
        .with_contract(Contract::RestApi(RestApiContract {
            endpoint: "/content/parse".to_string(),
            method: "POST".to_string(),
            handler: "parse_file".to_string(),
        }))
        .with_semantic_mapping(SemanticMapping {
            domain_capability: "content.parse_file".to_string(),
            semantic_api: "/api/v1/content-pillar/parse-file".to_string(),
            user_journey: None,
        })
}

/// `journey/plan_journey`, owned by `journey_service`, exposed as a tool.
pub fn plan_journey() -> CapabilityDefinition {
    CapabilityDefinition::new("journey", "plan_journey", "journey_service", "JourneyPlanner")
        .with_description("Plan a user journey from parsed content")
        .with_contract(Contract::McpTool(McpToolContract {
            tool_name: "plan_journey".to_string(),
            description: "Plan a user journey".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": { "goal": { "type": "string" } },
                "required": ["goal"]
            }),
        }))
}
