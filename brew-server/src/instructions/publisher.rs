//! Instruction publisher

use std::collections::HashMap;
use std::sync::Arc;

use shared::message::MACHINE_QUEUE;
use shared::models::{DrinkProcedure, Machine, Order};

use super::builder::build_instruction;
use super::directory::Directory;
use crate::message::Transport;

/// Outcome of publishing one order's instructions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Messages handed to the transport
    pub published: usize,
    /// Units with no procedure (or no usable steps)
    pub skipped: usize,
    /// Units whose publish failed
    pub failed: usize,
}

impl PublishReport {
    pub fn is_complete(&self) -> bool {
        self.skipped == 0 && self.failed == 0
    }
}

/// Emits one instruction per confirmed drink unit
#[derive(Debug, Clone)]
pub struct InstructionPublisher {
    directory: Arc<dyn Directory>,
    transport: Arc<dyn Transport>,
}

impl InstructionPublisher {
    pub fn new(directory: Arc<dyn Directory>, transport: Arc<dyn Transport>) -> Self {
        Self {
            directory,
            transport,
        }
    }

    pub fn directory(&self) -> &Arc<dyn Directory> {
        &self.directory
    }

    /// Publish instructions for every unit of every line
    ///
    /// Never fails: lookup and publish errors are logged and counted.
    pub async fn publish_order(&self, order: &Order) -> PublishReport {
        let mut report = PublishReport::default();
        let mut machines: HashMap<String, Machine> = HashMap::new();

        for line in &order.lines {
            let units = line.quantity.max(0) as usize;
            let Some(procedure) = self.procedure_for(line.drink_id).await else {
                report.skipped += units;
                continue;
            };
            self.load_machines(&procedure, &mut machines).await;

            let instruction = build_instruction(order.id, &line.drink_name, &procedure, &machines);
            if instruction.actions.is_empty() {
                tracing::warn!(
                    order_id = order.id,
                    drink_id = line.drink_id,
                    "Procedure has no usable steps; drink skipped"
                );
                report.skipped += units;
                continue;
            }
            let payload = match serde_json::to_vec(&instruction) {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::error!(order_id = order.id, error = %e, "Failed to encode instruction");
                    report.failed += units;
                    continue;
                }
            };

            for _ in 0..units {
                match self.transport.publish(MACHINE_QUEUE, payload.clone()).await {
                    Ok(()) => report.published += 1,
                    Err(e) => {
                        tracing::error!(
                            order_id = order.id,
                            activity_id = %instruction.activity_id,
                            error = %e,
                            "Failed to publish machine instruction"
                        );
                        report.failed += 1;
                    }
                }
            }
        }

        tracing::info!(
            order_id = order.id,
            published = report.published,
            skipped = report.skipped,
            failed = report.failed,
            "Machine instructions published"
        );
        report
    }

    async fn procedure_for(&self, drink_id: i64) -> Option<DrinkProcedure> {
        match self.directory.find_procedure_by_drink(drink_id).await {
            Ok(Some(procedure)) => Some(procedure),
            Ok(None) => {
                tracing::warn!(drink_id, "No preparation procedure for drink; skipped");
                None
            }
            Err(e) => {
                tracing::error!(drink_id, error = %e, "Procedure lookup failed");
                None
            }
        }
    }

    async fn load_machines(&self, procedure: &DrinkProcedure, cache: &mut HashMap<String, Machine>) {
        for step in &procedure.steps {
            if cache.contains_key(&step.machine) {
                continue;
            }
            match self.directory.find_machine(&step.machine).await {
                Ok(Some(machine)) => {
                    cache.insert(step.machine.clone(), machine);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(machine = %step.machine, error = %e, "Machine lookup failed");
                }
            }
        }
    }
}
