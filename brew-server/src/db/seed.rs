//! Demo catalog
//!
//! Loaded on startup when `SEED_DEMO_DATA=true` and the catalog is empty.

use super::repository::{self, RepoResult};
use shared::models::{
    CategoryCreate, DrinkCreate, IngredientCreate, Machine, MachineMode, RecipeCreate, RecipeStep,
};
use sqlx::SqlitePool;
use std::collections::{BTreeMap, HashMap};

const CATEGORIES: &[&str] = &["Coffee", "Tea"];

const INGREDIENTS: &[(&str, i64)] = &[
    ("Coffee Beans", 1000),
    ("Milk", 50),
    ("Sugar", 500),
    ("Tea Leaves", 300),
    ("Cocoa Powder", 200),
    ("Vanilla Syrup", 150),
    ("Ice", 150),
    ("Water", 150_000),
];

/// name, price, category, recipe rows `(ingredient, quantity per unit)`
const DRINKS: &[(&str, f64, &str, &[(&str, i64)])] = &[
    ("Espresso", 2.50, "Coffee", &[("Coffee Beans", 18), ("Water", 40)]),
    ("Latte", 3.50, "Coffee", &[("Coffee Beans", 18), ("Milk", 4), ("Water", 40)]),
    ("Green Tea", 2.00, "Tea", &[("Tea Leaves", 5), ("Water", 250)]),
    ("Milk Coffee", 2.00, "Coffee", &[("Coffee Beans", 15), ("Milk", 2), ("Sugar", 10)]),
];

/// machine, dispensed ingredient, mode, parameter names
const MACHINES: &[(&str, &str, &str, &[&str])] = &[
    ("Coffee Machine", "Coffee Beans", "brew", &["amount", "temperature"]),
    ("Milk Machine", "Milk", "pour", &["amount"]),
    ("Water Machine", "Water", "pour", &["amount", "temperature"]),
    ("Sugar Machine", "Sugar", "dispense", &["amount"]),
    ("Tea Machine", "Tea Leaves", "steep", &["amount", "duration"]),
];

fn machine_for(ingredient: &str) -> Option<(&'static str, &'static str, &'static [&'static str])> {
    MACHINES
        .iter()
        .find(|(_, ing, _, _)| *ing == ingredient)
        .map(|(name, _, mode, params)| (*name, *mode, *params))
}

/// Seed the demo catalog; returns `false` if drinks already exist
pub async fn seed_demo_data(pool: &SqlitePool) -> RepoResult<bool> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM drink")
        .fetch_one(pool)
        .await?;
    if existing > 0 {
        return Ok(false);
    }

    let mut category_ids = HashMap::new();
    for name in CATEGORIES {
        let category = repository::category::create(
            pool,
            CategoryCreate {
                name: name.to_string(),
            },
        )
        .await?;
        category_ids.insert(*name, category.id);
    }

    let mut ingredient_ids = HashMap::new();
    for (name, quantity) in INGREDIENTS {
        let ingredient = repository::ingredient::create(
            pool,
            IngredientCreate {
                name: name.to_string(),
                quantity: *quantity,
                price: 0.0,
            },
        )
        .await?;
        ingredient_ids.insert(*name, ingredient.id);
    }

    for (name, ingredient, mode, params) in MACHINES {
        repository::machine::upsert(
            pool,
            &Machine {
                name: name.to_string(),
                ingredient: ingredient.to_string(),
                modes: vec![MachineMode {
                    name: mode.to_string(),
                    parameters: params.iter().map(|p| p.to_string()).collect(),
                }],
            },
        )
        .await?;
    }

    for (name, price, category, recipe) in DRINKS {
        let drink = repository::drink::create(
            pool,
            DrinkCreate {
                name: name.to_string(),
                price: *price,
                category_id: category_ids.get(category).copied(),
                description: None,
                image_url: None,
                is_available: Some(true),
            },
        )
        .await?;

        let mut steps = Vec::new();
        for (ingredient, quantity) in recipe.iter() {
            if let Some(ingredient_id) = ingredient_ids.get(ingredient) {
                repository::recipe::create(
                    pool,
                    RecipeCreate {
                        drink_id: drink.id,
                        ingredient_id: *ingredient_id,
                        quantity: *quantity,
                    },
                )
                .await?;
            }
            if let Some((machine, mode, params)) = machine_for(ingredient) {
                let parameters: BTreeMap<String, f64> = params
                    .iter()
                    .map(|p| {
                        let value = if *p == "amount" { *quantity as f64 } else { 0.0 };
                        (p.to_string(), value)
                    })
                    .collect();
                steps.push(RecipeStep {
                    ingredient: ingredient.to_string(),
                    machine: machine.to_string(),
                    action: mode.to_string(),
                    parameters,
                });
            }
        }
        repository::procedure::upsert(pool, drink.id, &drink.name, &steps).await?;
    }

    tracing::info!(
        categories = CATEGORIES.len(),
        ingredients = INGREDIENTS.len(),
        drinks = DRINKS.len(),
        "Demo catalog seeded"
    );
    Ok(true)
}
