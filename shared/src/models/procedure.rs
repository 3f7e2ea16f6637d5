//! Preparation procedures and machines (document-oriented)
//!
//! These documents drive the machine instructions emitted after an order is
//! confirmed. They never take part in stock math; the relational recipe is
//! the source of truth for ingredient consumption.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Procedure id for a drink
pub fn procedure_id(drink_id: i64) -> String {
    format!("recipe_{drink_id}")
}

/// One step of a drink's physical preparation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeStep {
    /// Ingredient name as used on the machine side
    pub ingredient: String,
    /// Machine name
    pub machine: String,
    /// Action (machine mode) to run
    pub action: String,
    /// Named numeric parameters for the action
    #[serde(default)]
    pub parameters: BTreeMap<String, f64>,
}

/// A drink's ordered preparation procedure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DrinkProcedure {
    pub id: String,
    pub drink_id: i64,
    pub drink_name: String,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub steps: Vec<RecipeStep>,
    pub updated_at: i64,
}

/// Create/replace procedure payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcedureCreate {
    pub steps: Vec<RecipeStep>,
}

/// A machine mode with the parameter names it requires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineMode {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<String>,
}

/// Machine document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Machine {
    pub name: String,
    /// Ingredient this machine dispenses
    pub ingredient: String,
    #[serde(default)]
    #[cfg_attr(feature = "db", sqlx(json))]
    pub modes: Vec<MachineMode>,
}

impl Machine {
    pub fn mode(&self, name: &str) -> Option<&MachineMode> {
        self.modes.iter().find(|m| m.name == name)
    }
}

/// Differences between a drink's relational recipe and its procedure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcedureDrift {
    pub drink_id: i64,
    /// Recipe ingredients with no procedure step
    pub missing_steps: Vec<String>,
    /// Procedure step ingredients absent from the recipe
    pub unknown_ingredients: Vec<String>,
}

impl ProcedureDrift {
    pub fn is_clean(&self) -> bool {
        self.missing_steps.is_empty() && self.unknown_ingredients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_procedure_id() {
        assert_eq!(procedure_id(7), "recipe_7");
    }

    #[test]
    fn test_step_parameters_default_empty() {
        let step: RecipeStep =
            serde_json::from_str(r#"{"ingredient":"Milk","machine":"Steamer","action":"froth"}"#)
                .unwrap();
        assert!(step.parameters.is_empty());
    }

    #[test]
    fn test_machine_mode_lookup() {
        let machine = Machine {
            name: "Grinder".into(),
            ingredient: "Coffee Beans".into(),
            modes: vec![MachineMode {
                name: "grind".into(),
                parameters: vec!["grams".into()],
            }],
        };
        assert!(machine.mode("grind").is_some());
        assert!(machine.mode("brew").is_none());
    }
}
