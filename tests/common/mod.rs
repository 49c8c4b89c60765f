// ABOUTME: Common utilities and helpers for integration tests
// ABOUTME: Provides a configurable stub executor and orchestrator builders

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use shepherd::engine::SchedulerConfig;
use shepherd::executor::ExecutorState;
use shepherd::{ExecutionError, Executor, ExecutorDescriptor, Orchestrator, TaskPayload};

/// Shared log of node ids in completion order, for ordering assertions.
pub type ExecutionLog = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> ExecutionLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn log_entries(log: &ExecutionLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

enum Behavior {
    Echo,
    Fail(String),
    Delay(Duration),
}

/// Test executor with one capability and scripted behavior: echo the payload,
/// fail with a message, or sleep before succeeding.
pub struct StubWorker {
    descriptor: ExecutorDescriptor,
    state: ExecutorState,
    behavior: Behavior,
    log: Option<ExecutionLog>,
}

impl StubWorker {
    pub fn new(id: &str, capability: &str) -> Self {
        Self {
            descriptor: ExecutorDescriptor::new(
                id,
                format!("stub worker {}", id),
                vec![capability.to_string()],
            ),
            state: ExecutorState::new(),
            behavior: Behavior::Echo,
            log: None,
        }
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.behavior = Behavior::Fail(message.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.behavior = Behavior::Delay(delay);
        self
    }

    pub fn with_log(mut self, log: ExecutionLog) -> Self {
        self.log = Some(log);
        self
    }

    fn echo(&self, payload: &TaskPayload) -> Value {
        json!({
            "config": payload.config,
            "initial_inputs": payload.initial_inputs,
            "dependency_results": serde_json::to_value(&payload.dependency_results).unwrap(),
        })
    }
}

#[async_trait]
impl Executor for StubWorker {
    fn descriptor(&self) -> &ExecutorDescriptor {
        &self.descriptor
    }

    fn state(&self) -> &ExecutorState {
        &self.state
    }

    async fn execute(&self, payload: TaskPayload) -> Result<Value, ExecutionError> {
        let output = match &self.behavior {
            Behavior::Echo => self.echo(&payload),
            Behavior::Fail(message) => {
                return Err(ExecutionError::TaskFailed {
                    message: message.clone(),
                })
            }
            Behavior::Delay(delay) => {
                sleep(*delay).await;
                self.echo(&payload)
            }
        };

        if let (Some(log), Some(node_id)) = (&self.log, self.state.current_task()) {
            log.lock().unwrap().push(node_id);
        }

        Ok(output)
    }
}

/// Install a log subscriber once so RUST_LOG surfaces engine logs in tests.
pub fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Orchestrator tuned so stall detection resolves quickly in tests.
pub fn fast_orchestrator() -> Orchestrator {
    init_tracing();
    Orchestrator::with_config(SchedulerConfig {
        pass_delay: Duration::from_millis(10),
        stall_pass_limit: 2,
    })
}
