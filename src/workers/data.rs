// ABOUTME: Executor for data processing tasks over JSON arrays
// ABOUTME: Supports filter, transform, and aggregate operations

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::executor::{
    ExecutionError, Executor, ExecutorDescriptor, ExecutorState, TaskPayload,
};

/// Executor specialized in data processing and analysis.
///
/// Operates on the `data` array of the task configuration; the operation is
/// selected by the `operation` field.
pub struct DataWorker {
    descriptor: ExecutorDescriptor,
    state: ExecutorState,
}

impl DataWorker {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            descriptor: ExecutorDescriptor::new(
                id,
                "Data Processing Worker",
                vec![
                    "data_processing".to_string(),
                    "data_analysis".to_string(),
                    "data_transformation".to_string(),
                ],
            ),
            state: ExecutorState::new(),
        }
    }

    /// Keep items whose `field` equals the configured value.
    fn filter(&self, data: &[Value], config: &Value) -> Result<Value, ExecutionError> {
        let field = required_str(config, "field")?;
        let expected = config.get("equals").cloned().unwrap_or(Value::Null);

        let output: Vec<Value> = data
            .iter()
            .filter(|item| item.get(field) == Some(&expected))
            .cloned()
            .collect();

        Ok(json!({
            "operation": "filter",
            "input_count": data.len(),
            "output_count": output.len(),
            "data": output,
        }))
    }

    /// Project each item down to the configured `pick` fields.
    fn transform(&self, data: &[Value], config: &Value) -> Result<Value, ExecutionError> {
        let pick = config
            .get("pick")
            .and_then(Value::as_array)
            .ok_or_else(|| ExecutionError::InvalidPayload {
                message: "transform requires a 'pick' array of field names".to_string(),
            })?;

        let fields: Vec<&str> = pick.iter().filter_map(Value::as_str).collect();
        let output: Vec<Value> = data
            .iter()
            .map(|item| {
                let mut projected = Map::new();
                for field in &fields {
                    if let Some(value) = item.get(*field) {
                        projected.insert((*field).to_string(), value.clone());
                    }
                }
                Value::Object(projected)
            })
            .collect();

        Ok(json!({
            "operation": "transform",
            "transformed_count": output.len(),
            "data": output,
        }))
    }

    /// Compute count/sum/avg over a numeric `field` across all items.
    fn aggregate(&self, data: &[Value], config: &Value) -> Result<Value, ExecutionError> {
        let func = config
            .get("func")
            .and_then(Value::as_str)
            .unwrap_or("count");

        let result = match func {
            "count" => json!(data.len()),
            "sum" | "avg" => {
                let field = required_str(config, "field")?;
                let values: Vec<f64> = data
                    .iter()
                    .filter_map(|item| item.get(field).and_then(Value::as_f64))
                    .collect();
                let sum: f64 = values.iter().sum();
                if func == "sum" {
                    json!(sum)
                } else if values.is_empty() {
                    Value::Null
                } else {
                    json!(sum / values.len() as f64)
                }
            }
            other => {
                return Err(ExecutionError::UnsupportedAction {
                    action: format!("aggregate func '{}'", other),
                })
            }
        };

        Ok(json!({
            "operation": "aggregate",
            "func": func,
            "result": result,
        }))
    }
}

fn required_str<'a>(config: &'a Value, key: &str) -> Result<&'a str, ExecutionError> {
    config
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ExecutionError::InvalidPayload {
            message: format!("missing '{}' in task config", key),
        })
}

#[async_trait]
impl Executor for DataWorker {
    fn descriptor(&self) -> &ExecutorDescriptor {
        &self.descriptor
    }

    fn state(&self) -> &ExecutorState {
        &self.state
    }

    async fn execute(&self, payload: TaskPayload) -> Result<Value, ExecutionError> {
        let operation = payload
            .config
            .get("operation")
            .and_then(Value::as_str)
            .ok_or_else(|| ExecutionError::InvalidPayload {
                message: "missing 'operation' in task config".to_string(),
            })?;

        let data = payload
            .config
            .get("data")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        debug!(
            executor_id = %self.descriptor.id,
            operation,
            items = data.len(),
            "running data task"
        );

        match operation {
            "filter" => self.filter(&data, &payload.config),
            "transform" => self.transform(&data, &payload.config),
            "aggregate" => self.aggregate(&data, &payload.config),
            other => Err(ExecutionError::UnsupportedAction {
                action: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_data() -> Value {
        json!([
            {"name": "a", "region": "us", "amount": 10.0},
            {"name": "b", "region": "eu", "amount": 5.0},
            {"name": "c", "region": "us", "amount": 7.0},
        ])
    }

    #[tokio::test]
    async fn test_filter_operation() {
        let worker = DataWorker::new("data-1");
        let payload = TaskPayload::new(
            json!({
                "operation": "filter",
                "data": sample_data(),
                "field": "region",
                "equals": "us",
            }),
            json!({}),
        );

        let result = worker.execute(payload).await.unwrap();
        assert_eq!(result["input_count"], 3);
        assert_eq!(result["output_count"], 2);
        assert_eq!(result["data"][0]["name"], "a");
        assert_eq!(result["data"][1]["name"], "c");
    }

    #[tokio::test]
    async fn test_transform_operation() {
        let worker = DataWorker::new("data-1");
        let payload = TaskPayload::new(
            json!({
                "operation": "transform",
                "data": sample_data(),
                "pick": ["name"],
            }),
            json!({}),
        );

        let result = worker.execute(payload).await.unwrap();
        assert_eq!(result["transformed_count"], 3);
        assert_eq!(result["data"][0], json!({"name": "a"}));
    }

    #[tokio::test]
    async fn test_aggregate_operations() {
        let worker = DataWorker::new("data-1");

        let sum = worker
            .execute(TaskPayload::new(
                json!({"operation": "aggregate", "data": sample_data(), "func": "sum", "field": "amount"}),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(sum["result"], 22.0);

        let count = worker
            .execute(TaskPayload::new(
                json!({"operation": "aggregate", "data": sample_data()}),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(count["result"], 3);
    }

    #[tokio::test]
    async fn test_unknown_operation_fails() {
        let worker = DataWorker::new("data-1");
        let payload = TaskPayload::new(json!({"operation": "shuffle"}), json!({}));
        let err = worker.execute(payload).await.unwrap_err();
        assert!(matches!(err, ExecutionError::UnsupportedAction { .. }));
    }
}
