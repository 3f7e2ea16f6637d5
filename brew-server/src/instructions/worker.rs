//! `machine_result` consumer
//!
//! The first `done` result for an order completes it (CONFIRMED → DONE).
//! Results carry no unit index, so a multi-unit order is marked done as soon
//! as any unit reports; the later units' results find it DONE and are
//! ignored. Other outcomes are logged only.

use shared::message::{BusMessage, MACHINE_RESULT, MachineOutcome, MachineResult};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::message::MessageBus;
use crate::orders::{OrderError, OrdersManager};
use shared::models::OrderStatus;

/// Run until `shutdown` is cancelled
///
/// Subscribes immediately so no result published after the call is lost.
pub async fn run_machine_result_worker(
    bus: MessageBus,
    orders: OrdersManager,
    shutdown: CancellationToken,
) {
    let mut rx = bus.subscribe();
    tracing::info!("Machine result worker started");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("Machine result worker stopping");
                break;
            }
            received = rx.recv() => match received {
                Ok(msg) if msg.is_topic(MACHINE_RESULT) => handle_result(&orders, &msg).await,
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Machine result worker lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::warn!("Message bus closed; machine result worker exiting");
                    break;
                }
            }
        }
    }
}

async fn handle_result(orders: &OrdersManager, msg: &BusMessage) {
    let result: MachineResult = match msg.parse_payload() {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!(request_id = %msg.request_id, error = %e, "Malformed machine result");
            return;
        }
    };

    match result.status {
        MachineOutcome::Done => match orders.complete(result.order_id).await {
            Ok(_) => tracing::info!(order_id = result.order_id, "Order completed by machine"),
            // one result arrives per unit; later ones find the order done
            Err(OrderError::InvalidState {
                actual: OrderStatus::Done,
                ..
            }) => tracing::debug!(order_id = result.order_id, "Order already completed"),
            Err(e) => tracing::warn!(
                order_id = result.order_id,
                error = %e,
                "Machine reported done but order could not be completed"
            ),
        },
        MachineOutcome::InProgress => {
            tracing::debug!(order_id = result.order_id, activity_id = ?result.activity_id, "Machine in progress");
        }
        MachineOutcome::Failed => {
            tracing::error!(
                order_id = result.order_id,
                activity_id = ?result.activity_id,
                message = ?result.message,
                "Machine reported failure"
            );
        }
    }
}
