//! Procedure / machine directory
//!
//! Document-style lookups feeding the instruction publisher. Backed by the
//! JSON columns of `drink_procedure` and `machine`.

use async_trait::async_trait;
use shared::models::{DrinkProcedure, Machine, ProcedureCreate};
use sqlx::SqlitePool;

use crate::db::repository::{RepoError, RepoResult, drink, machine, procedure};

#[async_trait]
pub trait Directory: Send + Sync + std::fmt::Debug {
    async fn find_procedure_by_drink(&self, drink_id: i64) -> RepoResult<Option<DrinkProcedure>>;

    async fn find_machine(&self, name: &str) -> RepoResult<Option<Machine>>;

    /// Create or replace the procedure of an existing drink
    async fn create_procedure(
        &self,
        drink_id: i64,
        procedure: ProcedureCreate,
    ) -> RepoResult<DrinkProcedure>;

    async fn list_procedures(&self) -> RepoResult<Vec<DrinkProcedure>>;

    async fn list_machines(&self) -> RepoResult<Vec<Machine>>;

    async fn upsert_machine(&self, machine: &Machine) -> RepoResult<()>;
}

/// SQLite-backed directory
#[derive(Debug, Clone)]
pub struct SqliteDirectory {
    pool: SqlitePool,
}

impl SqliteDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Directory for SqliteDirectory {
    async fn find_procedure_by_drink(&self, drink_id: i64) -> RepoResult<Option<DrinkProcedure>> {
        procedure::find_by_drink(&self.pool, drink_id).await
    }

    async fn find_machine(&self, name: &str) -> RepoResult<Option<Machine>> {
        machine::find_by_name(&self.pool, name).await
    }

    async fn create_procedure(
        &self,
        drink_id: i64,
        data: ProcedureCreate,
    ) -> RepoResult<DrinkProcedure> {
        if data.steps.is_empty() {
            return Err(RepoError::Validation("Procedure needs at least one step".into()));
        }
        for step in &data.steps {
            if step.ingredient.trim().is_empty()
                || step.machine.trim().is_empty()
                || step.action.trim().is_empty()
            {
                return Err(RepoError::Validation(
                    "Each step needs an ingredient, a machine and an action".into(),
                ));
            }
        }
        let drink = drink::find_by_id(&self.pool, drink_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Drink {drink_id} not found")))?;
        procedure::upsert(&self.pool, drink.id, &drink.name, &data.steps).await
    }

    async fn list_procedures(&self) -> RepoResult<Vec<DrinkProcedure>> {
        procedure::find_all(&self.pool).await
    }

    async fn list_machines(&self) -> RepoResult<Vec<Machine>> {
        machine::find_all(&self.pool).await
    }

    async fn upsert_machine(&self, data: &Machine) -> RepoResult<()> {
        if data.name.trim().is_empty() {
            return Err(RepoError::Validation("Machine name must not be empty".into()));
        }
        machine::upsert(&self.pool, data).await
    }
}
