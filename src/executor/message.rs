// ABOUTME: Inter-executor message types for lifecycle notifications
// ABOUTME: Defines TaskMessage and its kind tag, immutable once constructed

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub const PRIORITY_HIGHEST: u8 = 1;
pub const PRIORITY_LOWEST: u8 = 10;
pub const DEFAULT_PRIORITY: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Task,
    Result,
}

/// A message passed between executors. Used for lifecycle notification,
/// not for scheduling. Priority is informational (1 = highest), not a
/// delivery-order guarantee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskMessage {
    pub message_id: Uuid,
    pub sender_id: String,
    pub recipient_id: String,
    pub content: Value,
    pub kind: MessageKind,
    pub sent_at: DateTime<Utc>,
    pub priority: u8,
}

impl TaskMessage {
    pub fn new(
        sender_id: impl Into<String>,
        recipient_id: impl Into<String>,
        content: Value,
        kind: MessageKind,
    ) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            sender_id: sender_id.into(),
            recipient_id: recipient_id.into(),
            content,
            kind,
            sent_at: Utc::now(),
            priority: DEFAULT_PRIORITY,
        }
    }

    pub fn task(
        sender_id: impl Into<String>,
        recipient_id: impl Into<String>,
        content: Value,
    ) -> Self {
        Self::new(sender_id, recipient_id, content, MessageKind::Task)
    }

    pub fn result(
        sender_id: impl Into<String>,
        recipient_id: impl Into<String>,
        content: Value,
    ) -> Self {
        Self::new(sender_id, recipient_id, content, MessageKind::Result)
    }

    /// Build a `Result`-kind response addressed back to the sender.
    pub fn reply(&self, content: Value) -> Self {
        Self::result(self.recipient_id.clone(), self.sender_id.clone(), content)
    }

    /// Set the priority, clamped to the valid 1..=10 range.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority.clamp(PRIORITY_HIGHEST, PRIORITY_LOWEST);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_defaults() {
        let msg = TaskMessage::task("sender", "recipient", json!({"action": "ping"}));

        assert_eq!(msg.sender_id, "sender");
        assert_eq!(msg.recipient_id, "recipient");
        assert_eq!(msg.kind, MessageKind::Task);
        assert_eq!(msg.priority, DEFAULT_PRIORITY);
    }

    #[test]
    fn test_priority_clamping() {
        let high = TaskMessage::task("a", "b", json!({})).with_priority(0);
        assert_eq!(high.priority, 1);

        let low = TaskMessage::task("a", "b", json!({})).with_priority(200);
        assert_eq!(low.priority, 10);

        let mid = TaskMessage::task("a", "b", json!({})).with_priority(7);
        assert_eq!(mid.priority, 7);
    }

    #[test]
    fn test_reply_addresses_sender() {
        let msg = TaskMessage::task("orchestrator", "worker-1", json!({"step": 1}));
        let reply = msg.reply(json!({"status": "done"}));

        assert_eq!(reply.sender_id, "worker-1");
        assert_eq!(reply.recipient_id, "orchestrator");
        assert_eq!(reply.kind, MessageKind::Result);
        assert_ne!(reply.message_id, msg.message_id);
    }
}
