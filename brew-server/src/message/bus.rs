//! Message bus core

use async_trait::async_trait;
use serde::Serialize;
use shared::message::BusMessage;
use tokio::sync::broadcast;

use super::transport::{MemoryTransport, Transport};
use crate::utils::{AppError, ErrorCode};

/// Configuration for the broadcast channel
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Capacity of the broadcast channel (default: 1024)
    pub channel_capacity: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
        }
    }
}

/// Message bus - topic-tagged broadcast between server components
///
/// Cloning is cheap; all clones share the same channel.
#[derive(Debug, Clone)]
pub struct MessageBus {
    tx: broadcast::Sender<BusMessage>,
    pub(crate) config: TransportConfig,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::from_config(TransportConfig::default())
    }

    pub fn from_config(config: TransportConfig) -> Self {
        let (tx, _) = broadcast::channel(config.channel_capacity.max(1));
        Self { tx, config }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_config(TransportConfig {
            channel_capacity: capacity,
        })
    }

    /// Publish a message to all subscribers
    ///
    /// Fails with `PublishFailed` when nobody is subscribed.
    pub async fn publish(&self, msg: BusMessage) -> Result<(), AppError> {
        let topic = msg.topic.clone();
        let receivers = self.tx.send(msg).map_err(|_| {
            AppError::with_message(
                ErrorCode::PublishFailed,
                format!("No subscribers for topic {topic}"),
            )
        })?;
        tracing::trace!(topic = %topic, receivers, "Bus message published");
        Ok(())
    }

    /// Encode `data` as JSON and publish it on `topic`
    pub async fn publish_json<T: Serialize>(&self, topic: &str, data: &T) -> Result<(), AppError> {
        let msg = BusMessage::json(topic, data).map_err(|e| {
            AppError::with_message(ErrorCode::PublishFailed, format!("Encode failed: {e}"))
        })?;
        self.publish(msg).await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.tx.subscribe()
    }

    /// In-process transport handle (subscribes immediately)
    pub fn memory_transport(&self) -> MemoryTransport {
        MemoryTransport::new(&self.tx)
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.config.channel_capacity
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MessageBus {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), AppError> {
        MessageBus::publish(self, BusMessage::new(topic, payload)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::message::{MACHINE_QUEUE, MACHINE_RESULT};

    #[tokio::test]
    async fn test_publish_without_subscribers_fails() {
        let bus = MessageBus::with_capacity(8);
        let err = bus
            .publish(BusMessage::new(MACHINE_QUEUE, vec![]))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PublishFailed);
    }

    #[tokio::test]
    async fn test_every_subscriber_receives_each_message() {
        let bus = MessageBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        Transport::publish(&bus, MACHINE_RESULT, b"{}".to_vec())
            .await
            .unwrap();

        assert_eq!(a.recv().await.unwrap().topic, MACHINE_RESULT);
        assert_eq!(b.recv().await.unwrap().topic, MACHINE_RESULT);
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[tokio::test]
    async fn test_publish_json() {
        let bus = MessageBus::new();
        let mut rx = bus.subscribe();
        bus.publish_json(MACHINE_QUEUE, &vec!["a", "b"]).await.unwrap();
        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.parse_payload::<Vec<String>>().unwrap(), vec!["a", "b"]);
    }
}
