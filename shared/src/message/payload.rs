use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ==================== Machine instructions ====================

/// A single machine-directed step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineAction {
    /// `<action>_<ingredient with spaces replaced by underscores>`
    pub action_id: String,
    pub machine: String,
    pub mode: String,
    pub parameters: BTreeMap<String, f64>,
    /// 1-based position among the emitted actions
    pub sequence: u32,
}

/// "Make this drink" instruction, one per drink unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineInstruction {
    /// `MK_<drinkId>_<orderId>`
    pub activity_id: String,
    pub name: String,
    pub description: String,
    pub actions: Vec<MachineAction>,
}

impl MachineInstruction {
    pub fn activity_id(drink_id: i64, order_id: i64) -> String {
        format!("MK_{drink_id}_{order_id}")
    }
}

// ==================== Machine results ====================

/// Outcome reported by a machine controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineOutcome {
    InProgress,
    Done,
    Failed,
}

impl fmt::Display for MachineOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InProgress => write!(f, "in_progress"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Result message consumed from the `machine_result` topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineResult {
    pub order_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_id: Option<String>,
    pub status: MachineOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_id() {
        assert_eq!(MachineInstruction::activity_id(3, 99), "MK_3_99");
    }

    #[test]
    fn test_result_deserializes_minimal() {
        let r: MachineResult = serde_json::from_str(r#"{"order_id":7,"status":"done"}"#).unwrap();
        assert_eq!(r.order_id, 7);
        assert_eq!(r.status, MachineOutcome::Done);
        assert!(r.activity_id.is_none());
    }
}
