//! Memory transport (same-process communication)

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use shared::message::BusMessage;
use tokio::sync::Mutex;
use tokio::sync::broadcast;

use super::Transport;
use crate::utils::{AppError, ErrorCode};

/// In-process transport over the bus's broadcast channel
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    rx: Arc<Mutex<broadcast::Receiver<BusMessage>>>,
    tx: broadcast::Sender<BusMessage>,
}

impl MemoryTransport {
    pub fn new(tx: &broadcast::Sender<BusMessage>) -> Self {
        Self {
            rx: Arc::new(Mutex::new(tx.subscribe())),
            tx: tx.clone(),
        }
    }

    /// Next message on any topic
    pub async fn read_message(&self) -> Result<BusMessage, AppError> {
        let mut rx = self.rx.lock().await;
        loop {
            match rx.recv().await {
                Ok(msg) => return Ok(msg),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Memory transport lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(AppError::internal("Message bus closed"));
                }
            }
        }
    }

    /// Next message on `topic`, skipping others
    pub async fn read_topic(&self, topic: &str) -> Result<BusMessage, AppError> {
        loop {
            let msg = self.read_message().await?;
            if msg.is_topic(topic) {
                return Ok(msg);
            }
        }
    }

    /// Drain every message on `topic` that arrives within `wait`
    pub async fn drain_topic(&self, topic: &str, wait: Duration) -> Vec<BusMessage> {
        let mut out = Vec::new();
        while let Ok(Ok(msg)) = tokio::time::timeout(wait, self.read_topic(topic)).await {
            out.push(msg);
        }
        out
    }

    pub async fn write_message(&self, msg: &BusMessage) -> Result<(), AppError> {
        self.tx.send(msg.clone()).map_err(|_| {
            AppError::with_message(ErrorCode::PublishFailed, "No subscribers on message bus")
        })?;
        Ok(())
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), AppError> {
        self.write_message(&BusMessage::new(topic, payload)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageBus;
    use shared::message::{MACHINE_QUEUE, MACHINE_RESULT};

    #[tokio::test]
    async fn test_read_topic_skips_other_topics() {
        let bus = MessageBus::new();
        let transport = bus.memory_transport();

        bus.publish(BusMessage::new(MACHINE_RESULT, vec![1])).await.unwrap();
        bus.publish(BusMessage::new(MACHINE_QUEUE, vec![2])).await.unwrap();

        let msg = transport.read_topic(MACHINE_QUEUE).await.unwrap();
        assert_eq!(msg.payload, vec![2]);
    }

    #[tokio::test]
    async fn test_drain_topic_collects_until_quiet() {
        let bus = MessageBus::new();
        let transport = bus.memory_transport();
        for i in 0..3u8 {
            bus.publish(BusMessage::new(MACHINE_QUEUE, vec![i])).await.unwrap();
        }
        let msgs = transport
            .drain_topic(MACHINE_QUEUE, Duration::from_millis(50))
            .await;
        assert_eq!(msgs.len(), 3);
    }

    #[tokio::test]
    async fn test_transport_publish_reaches_bus_subscribers() {
        let bus = MessageBus::new();
        let mut rx = bus.subscribe();
        let transport = bus.memory_transport();
        Transport::publish(&transport, MACHINE_RESULT, b"x".to_vec())
            .await
            .unwrap();
        assert_eq!(rx.recv().await.unwrap().payload, b"x".to_vec());
    }
}
