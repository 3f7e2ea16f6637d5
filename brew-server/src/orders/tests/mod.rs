use super::*;
use crate::cache::CacheService;
use crate::db::DbService;
use crate::db::repository::{drink, ingredient, machine, procedure, recipe};
use crate::instructions::{Directory, InstructionPublisher, SqliteDirectory};
use crate::message::{MemoryTransport, MessageBus, Transport};
use shared::models::{
    AddLineRequest, DrinkCreate, IngredientCreate, IngredientUpdate, LineUpdate, Machine, MachineMode,
    OrderQuery, RecipeCreate, RecipeStep, UpdateLineRequest,
};
use std::collections::BTreeMap;
use tempfile::TempDir;

mod test_cart;
mod test_concurrency;
mod test_instructions;

struct TestEnv {
    // keeps the database file alive
    _dir: TempDir,
    pool: SqlitePool,
    bus: MessageBus,
    manager: OrdersManager,
}

async fn setup() -> TestEnv {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("orders.db");
    let db = DbService::new(path.to_str().unwrap()).await.unwrap();

    let bus = MessageBus::new();
    let directory: Arc<dyn Directory> = Arc::new(SqliteDirectory::new(db.pool.clone()));
    let transport: Arc<dyn Transport> = Arc::new(bus.clone());
    let publisher = Arc::new(InstructionPublisher::new(directory, transport));
    let manager = OrdersManager::new(
        db.pool.clone(),
        CacheService::in_memory(std::time::Duration::from_secs(60)),
        publisher,
    );

    TestEnv {
        _dir: dir,
        pool: db.pool,
        bus,
        manager,
    }
}

fn alice() -> CurrentUser {
    CurrentUser::customer("alice")
}

fn bob() -> CurrentUser {
    CurrentUser::customer("bob")
}

fn staff() -> CurrentUser {
    CurrentUser::admin("barista")
}

async fn add_ingredient(pool: &SqlitePool, name: &str, quantity: i64) -> i64 {
    ingredient::create(
        pool,
        IngredientCreate {
            name: name.to_string(),
            quantity,
            price: 0.0,
        },
    )
    .await
    .unwrap()
    .id
}

async fn add_drink(pool: &SqlitePool, name: &str, price: f64) -> i64 {
    drink::create(
        pool,
        DrinkCreate {
            name: name.to_string(),
            price,
            category_id: None,
            description: None,
            image_url: None,
            is_available: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn add_recipe(pool: &SqlitePool, drink_id: i64, ingredient_id: i64, quantity: i64) {
    recipe::create(
        pool,
        RecipeCreate {
            drink_id,
            ingredient_id,
            quantity,
        },
    )
    .await
    .unwrap();
}

async fn stock(pool: &SqlitePool, ingredient_id: i64) -> i64 {
    ingredient::find_by_id(pool, ingredient_id)
        .await
        .unwrap()
        .unwrap()
        .quantity
}

async fn set_stock(pool: &SqlitePool, ingredient_id: i64, quantity: i64) {
    ingredient::update(
        pool,
        ingredient_id,
        IngredientUpdate {
            quantity: Some(quantity),
            ..Default::default()
        },
    )
    .await
    .unwrap();
}

fn add(drink_id: i64, quantity: i64) -> AddLineRequest {
    AddLineRequest {
        drink_id,
        quantity,
        note: None,
    }
}

fn set_quantity(quantity: i64) -> UpdateLineRequest {
    UpdateLineRequest {
        quantity,
        note: None,
    }
}

/// Milk 10, Coffee Beans 100; Latte = 4 Milk + 18 Coffee Beans at 3.50
struct LatteShop {
    milk: i64,
    beans: i64,
    latte: i64,
}

async fn latte_shop(pool: &SqlitePool) -> LatteShop {
    let milk = add_ingredient(pool, "Milk", 10).await;
    let beans = add_ingredient(pool, "Coffee Beans", 100).await;
    let latte = add_drink(pool, "Latte", 3.50).await;
    add_recipe(pool, latte, milk, 4).await;
    add_recipe(pool, latte, beans, 18).await;
    LatteShop { milk, beans, latte }
}

/// Two-step latte procedure on two declared machines
async fn latte_procedure(pool: &SqlitePool, latte: i64) {
    for (name, ingredient, mode) in [("Coffee Machine", "Coffee Beans", "brew"), ("Milk Machine", "Milk", "pour")] {
        machine::upsert(
            pool,
            &Machine {
                name: name.into(),
                ingredient: ingredient.into(),
                modes: vec![MachineMode {
                    name: mode.into(),
                    parameters: vec!["amount".into()],
                }],
            },
        )
        .await
        .unwrap();
    }
    let steps = vec![
        RecipeStep {
            ingredient: "Coffee Beans".into(),
            machine: "Coffee Machine".into(),
            action: "brew".into(),
            parameters: BTreeMap::from([("amount".to_string(), 18.0)]),
        },
        RecipeStep {
            ingredient: "Milk".into(),
            machine: "Milk Machine".into(),
            action: "pour".into(),
            parameters: BTreeMap::from([("amount".to_string(), 4.0)]),
        },
    ];
    procedure::upsert(pool, latte, "Latte", &steps).await.unwrap();
}

/// Subscribe before confirming so no instruction is missed
fn listen(bus: &MessageBus) -> MemoryTransport {
    bus.memory_transport()
}

/// Status straight from the database, bypassing the order cache
async fn status_of(pool: &SqlitePool, order_id: i64) -> OrderStatus {
    let mut conn = pool.acquire().await.unwrap();
    order::find_by_id(&mut conn, order_id).await.unwrap().unwrap().status
}
