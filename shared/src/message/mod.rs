//! Message bus message types
//!
//! Shared between brew-server and downstream consumers (machine
//! controllers). Payloads travel as JSON bytes keyed by topic.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod payload;
pub use payload::*;

/// Topic carrying machine instructions for confirmed orders
pub const MACHINE_QUEUE: &str = "machine_queue";

/// Topic carrying results reported by the machines
pub const MACHINE_RESULT: &str = "machine_result";

/// Bus message envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusMessage {
    /// Used for message tracing
    pub request_id: Uuid,
    pub topic: String,
    pub payload: Vec<u8>,
    pub published_at: i64,
}

impl BusMessage {
    pub fn new(topic: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            topic: topic.into(),
            payload,
            published_at: crate::util::now_millis(),
        }
    }

    /// Build a message with a JSON-encoded payload
    pub fn json<T: Serialize>(topic: impl Into<String>, data: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(topic, serde_json::to_vec(data)?))
    }

    /// Decode the JSON payload
    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }

    pub fn is_topic(&self, topic: &str) -> bool {
        self.topic == topic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_message_carries_topic_and_payload() {
        let result = MachineResult {
            order_id: 42,
            activity_id: Some("MK_1_42".into()),
            status: MachineOutcome::Done,
            message: None,
        };
        let msg = BusMessage::json(MACHINE_RESULT, &result).unwrap();
        assert!(msg.is_topic(MACHINE_RESULT));
        assert!(!msg.is_topic(MACHINE_QUEUE));

        let decoded: MachineResult = msg.parse_payload().unwrap();
        assert_eq!(decoded, result);
    }

    #[test]
    fn test_parse_payload_rejects_wrong_shape() {
        let msg = BusMessage::new(MACHINE_RESULT, b"not json".to_vec());
        assert!(msg.parse_payload::<MachineResult>().is_err());
    }
}
