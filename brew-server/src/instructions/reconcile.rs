//! Recipe / procedure drift check
//!
//! The relational recipe decides stock consumption; the procedure decides
//! what the machines do. Nothing keeps them in sync, so admins get a drift
//! report whenever either side changes.

use std::collections::BTreeSet;

use shared::models::{DrinkProcedure, ProcedureDrift, RecipeEntry};
use sqlx::SqlitePool;

use super::directory::Directory;
use crate::db::repository::{RepoResult, recipe};

/// Compare recipe ingredient names with procedure step ingredients
/// (case-insensitive). A missing procedure reports every recipe ingredient.
pub fn reconcile(
    drink_id: i64,
    entries: &[RecipeEntry],
    procedure: Option<&DrinkProcedure>,
) -> ProcedureDrift {
    let recipe_names: BTreeSet<String> =
        entries.iter().map(|r| r.ingredient_name.to_lowercase()).collect();
    let step_names: BTreeSet<String> = procedure
        .map(|p| p.steps.iter().map(|s| s.ingredient.to_lowercase()).collect())
        .unwrap_or_default();

    let mut missing_steps: Vec<String> = entries
        .iter()
        .filter(|r| !step_names.contains(&r.ingredient_name.to_lowercase()))
        .map(|r| r.ingredient_name.clone())
        .collect();
    missing_steps.dedup();

    let mut unknown_ingredients: Vec<String> = Vec::new();
    if let Some(procedure) = procedure {
        for step in &procedure.steps {
            if !recipe_names.contains(&step.ingredient.to_lowercase())
                && !unknown_ingredients.contains(&step.ingredient)
            {
                unknown_ingredients.push(step.ingredient.clone());
            }
        }
    }

    ProcedureDrift {
        drink_id,
        missing_steps,
        unknown_ingredients,
    }
}

/// Drift report for one drink; logs a warning when not clean
pub async fn reconcile_procedure(
    pool: &SqlitePool,
    directory: &dyn Directory,
    drink_id: i64,
) -> RepoResult<ProcedureDrift> {
    let entries = recipe::find_by_drink(pool, drink_id).await?;
    let procedure = directory.find_procedure_by_drink(drink_id).await?;
    let drift = reconcile(drink_id, &entries, procedure.as_ref());
    if !drift.is_clean() {
        tracing::warn!(
            drink_id,
            missing_steps = ?drift.missing_steps,
            unknown_ingredients = ?drift.unknown_ingredients,
            "Recipe and preparation procedure disagree"
        );
    }
    Ok(drift)
}

/// Check every stored procedure; returns the drinks that drifted
pub async fn check_all_procedures(
    pool: &SqlitePool,
    directory: &dyn Directory,
) -> RepoResult<Vec<ProcedureDrift>> {
    let mut drifted = Vec::new();
    for procedure in directory.list_procedures().await? {
        let drift = reconcile_procedure(pool, directory, procedure.drink_id).await?;
        if !drift.is_clean() {
            drifted.push(drift);
        }
    }
    Ok(drifted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::RecipeStep;

    fn entry(name: &str) -> RecipeEntry {
        RecipeEntry {
            id: 1,
            drink_id: 1,
            ingredient_id: 1,
            ingredient_name: name.into(),
            quantity: 1,
        }
    }

    fn procedure(ingredients: &[&str]) -> DrinkProcedure {
        DrinkProcedure {
            id: "recipe_1".into(),
            drink_id: 1,
            drink_name: "Latte".into(),
            steps: ingredients
                .iter()
                .map(|i| RecipeStep {
                    ingredient: i.to_string(),
                    machine: "M".into(),
                    action: "pour".into(),
                    parameters: Default::default(),
                })
                .collect(),
            updated_at: 0,
        }
    }

    #[test]
    fn test_matching_sides_are_clean() {
        let drift = reconcile(1, &[entry("Milk"), entry("Coffee Beans")], Some(&procedure(&["milk", "Coffee Beans"])));
        assert!(drift.is_clean());
    }

    #[test]
    fn test_reports_both_directions() {
        let drift = reconcile(1, &[entry("Milk"), entry("Sugar")], Some(&procedure(&["Milk", "Water"])));
        assert_eq!(drift.missing_steps, vec!["Sugar"]);
        assert_eq!(drift.unknown_ingredients, vec!["Water"]);
    }

    #[test]
    fn test_missing_procedure_reports_every_recipe_ingredient() {
        let drift = reconcile(1, &[entry("Milk")], None);
        assert_eq!(drift.missing_steps, vec!["Milk"]);
        assert!(drift.unknown_ingredients.is_empty());
    }
}
