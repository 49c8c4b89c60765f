// ABOUTME: Executor for API integration tasks: external calls and webhooks
// ABOUTME: Dispatches on the `action` field of the node's task configuration

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;

use crate::executor::{
    ExecutionError, Executor, ExecutorDescriptor, ExecutorState, TaskPayload,
};

/// Executor specialized in API integrations and external service calls.
///
/// The transport itself is simulated; a production deployment would plug in
/// an HTTP client behind the same `execute` contract.
pub struct ApiWorker {
    descriptor: ExecutorDescriptor,
    state: ExecutorState,
}

impl ApiWorker {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            descriptor: ExecutorDescriptor::new(
                id,
                "API Integration Worker",
                vec![
                    "api_call".to_string(),
                    "webhook".to_string(),
                    "external_service".to_string(),
                ],
            ),
            state: ExecutorState::new(),
        }
    }

    fn make_api_call(&self, config: &Value) -> Value {
        json!({
            "action": "api_call",
            "endpoint": config.get("endpoint").cloned().unwrap_or(Value::Null),
            "method": config
                .get("method")
                .and_then(Value::as_str)
                .unwrap_or("GET"),
            "status_code": 200,
            "success": true,
        })
    }

    fn send_webhook(&self, config: &Value) -> Value {
        json!({
            "action": "webhook",
            "url": config.get("webhook_url").cloned().unwrap_or(Value::Null),
            "delivered": true,
            "timestamp": Utc::now().to_rfc3339(),
        })
    }
}

#[async_trait]
impl Executor for ApiWorker {
    fn descriptor(&self) -> &ExecutorDescriptor {
        &self.descriptor
    }

    fn state(&self) -> &ExecutorState {
        &self.state
    }

    async fn execute(&self, payload: TaskPayload) -> Result<Value, ExecutionError> {
        let action = payload
            .config
            .get("action")
            .and_then(Value::as_str)
            .ok_or_else(|| ExecutionError::InvalidPayload {
                message: "missing 'action' in task config".to_string(),
            })?;

        debug!(executor_id = %self.descriptor.id, action, "running api task");

        match action {
            "api_call" => Ok(self.make_api_call(&payload.config)),
            "webhook" => Ok(self.send_webhook(&payload.config)),
            other => Err(ExecutionError::UnsupportedAction {
                action: other.to_string(),
            }),
        }
    }
}
