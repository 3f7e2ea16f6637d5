//! Procedure → instruction expansion

use std::collections::HashMap;

use shared::message::{MachineAction, MachineInstruction};
use shared::models::{DrinkProcedure, Machine};

/// `<action>_<ingredient>` with spaces in the ingredient replaced by `_`
pub fn action_id(action: &str, ingredient: &str) -> String {
    format!("{action}_{}", ingredient.replace(' ', "_"))
}

/// Build the instruction for one unit of a drink
///
/// Steps whose machine is not in `machines` are skipped; sequence numbers
/// count emitted actions only.
pub fn build_instruction(
    order_id: i64,
    drink_name: &str,
    procedure: &DrinkProcedure,
    machines: &HashMap<String, Machine>,
) -> MachineInstruction {
    let mut actions = Vec::with_capacity(procedure.steps.len());
    for step in &procedure.steps {
        let Some(machine) = machines.get(&step.machine) else {
            tracing::warn!(
                drink_id = procedure.drink_id,
                machine = %step.machine,
                "Unknown machine in procedure; step skipped"
            );
            continue;
        };
        if machine.mode(&step.action).is_none() {
            tracing::warn!(
                machine = %machine.name,
                mode = %step.action,
                "Machine does not declare this mode"
            );
        }
        actions.push(MachineAction {
            action_id: action_id(&step.action, &step.ingredient),
            machine: machine.name.clone(),
            mode: step.action.clone(),
            parameters: step.parameters.clone(),
            sequence: actions.len() as u32 + 1,
        });
    }

    MachineInstruction {
        activity_id: MachineInstruction::activity_id(procedure.drink_id, order_id),
        name: format!("Make {drink_name}"),
        description: format!("Make {drink_name} follow recipe."),
        actions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{MachineMode, RecipeStep};
    use std::collections::BTreeMap;

    fn step(ingredient: &str, machine: &str, action: &str, params: &[(&str, f64)]) -> RecipeStep {
        RecipeStep {
            ingredient: ingredient.into(),
            machine: machine.into(),
            action: action.into(),
            parameters: params
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn machine(name: &str, ingredient: &str, mode: &str) -> (String, Machine) {
        (
            name.to_string(),
            Machine {
                name: name.into(),
                ingredient: ingredient.into(),
                modes: vec![MachineMode {
                    name: mode.into(),
                    parameters: vec!["amount".into()],
                }],
            },
        )
    }

    fn latte() -> DrinkProcedure {
        DrinkProcedure {
            id: "recipe_3".into(),
            drink_id: 3,
            drink_name: "Latte".into(),
            steps: vec![
                step("Coffee Beans", "Coffee Machine", "grind", &[("amount", 18.0)]),
                step("Milk", "Milk Machine", "steam", &[("amount", 150.0), ("temp", 65.0)]),
            ],
            updated_at: 0,
        }
    }

    #[test]
    fn test_builds_named_actions_in_sequence() {
        let machines: HashMap<_, _> = [
            machine("Coffee Machine", "Coffee Beans", "grind"),
            machine("Milk Machine", "Milk", "steam"),
        ]
        .into_iter()
        .collect();

        let instruction = build_instruction(42, "Latte", &latte(), &machines);
        assert_eq!(instruction.activity_id, "MK_3_42");
        assert_eq!(instruction.name, "Make Latte");
        assert_eq!(instruction.description, "Make Latte follow recipe.");
        assert_eq!(instruction.actions.len(), 2);

        let first = &instruction.actions[0];
        assert_eq!(first.action_id, "grind_Coffee_Beans");
        assert_eq!(first.machine, "Coffee Machine");
        assert_eq!(first.mode, "grind");
        assert_eq!(first.sequence, 1);
        assert_eq!(instruction.actions[1].sequence, 2);
        assert_eq!(instruction.actions[1].parameters["temp"], 65.0);
    }

    #[test]
    fn test_missing_machine_skips_step_and_keeps_sequence_dense() {
        let machines: HashMap<_, _> = [machine("Milk Machine", "Milk", "steam")]
            .into_iter()
            .collect();
        let instruction = build_instruction(1, "Latte", &latte(), &machines);
        assert_eq!(instruction.actions.len(), 1);
        assert_eq!(instruction.actions[0].action_id, "steam_Milk");
        assert_eq!(instruction.actions[0].sequence, 1);
    }
}
