//! Directory API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::api::repo_error;
use crate::core::ServerState;
use crate::instructions::{check_all_procedures, reconcile_procedure};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{DrinkProcedure, Machine, MachineMode, ProcedureCreate, ProcedureDrift};

#[derive(Debug, Deserialize)]
pub struct MachinePayload {
    pub ingredient: String,
    #[serde(default)]
    pub modes: Vec<MachineMode>,
}

fn procedure_not_found(drink_id: i64) -> AppError {
    AppError::with_message(
        ErrorCode::ProcedureNotFound,
        format!("No preparation procedure for drink {drink_id}"),
    )
}

/// GET /api/machines
pub async fn list_machines(State(state): State<ServerState>) -> AppResult<Json<Vec<Machine>>> {
    Ok(Json(state.directory.list_machines().await?))
}

/// GET /api/machines/:name
pub async fn get_machine(
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> AppResult<Json<Machine>> {
    let machine = state.directory.find_machine(&name).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::MachineNotFound, format!("Machine '{name}' not found"))
    })?;
    Ok(Json(machine))
}

/// PUT /api/machines/:name - create or replace
pub async fn upsert_machine(
    State(state): State<ServerState>,
    Path(name): Path<String>,
    Json(payload): Json<MachinePayload>,
) -> AppResult<Json<Machine>> {
    let machine = Machine {
        name: name.trim().to_string(),
        ingredient: payload.ingredient.trim().to_string(),
        modes: payload.modes,
    };
    state.directory.upsert_machine(&machine).await?;
    tracing::info!(machine = %machine.name, modes = machine.modes.len(), "Machine stored");
    Ok(Json(machine))
}

/// GET /api/procedures
pub async fn list_procedures(
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<DrinkProcedure>>> {
    Ok(Json(state.directory.list_procedures().await?))
}

/// GET /api/procedures/:drink_id
pub async fn get_procedure(
    State(state): State<ServerState>,
    Path(drink_id): Path<i64>,
) -> AppResult<Json<DrinkProcedure>> {
    let procedure = state
        .directory
        .find_procedure_by_drink(drink_id)
        .await?
        .ok_or_else(|| procedure_not_found(drink_id))?;
    Ok(Json(procedure))
}

/// POST /api/procedures/:drink_id - create or replace the drink's procedure
pub async fn create_procedure(
    State(state): State<ServerState>,
    Path(drink_id): Path<i64>,
    Json(payload): Json<ProcedureCreate>,
) -> AppResult<Json<DrinkProcedure>> {
    let procedure = state
        .directory
        .create_procedure(drink_id, payload)
        .await
        .map_err(|e| repo_error(e, ErrorCode::DrinkNotFound, ErrorCode::AlreadyExists))?;
    tracing::info!(
        drink_id,
        procedure_id = %procedure.id,
        steps = procedure.steps.len(),
        "Preparation procedure stored"
    );
    if let Err(e) = reconcile_procedure(state.pool(), state.directory.as_ref(), drink_id).await {
        tracing::warn!(drink_id, error = %e, "Procedure drift check failed");
    }
    Ok(Json(procedure))
}

/// GET /api/procedures/:drink_id/drift
pub async fn drink_drift(
    State(state): State<ServerState>,
    Path(drink_id): Path<i64>,
) -> AppResult<Json<ProcedureDrift>> {
    Ok(Json(
        reconcile_procedure(state.pool(), state.directory.as_ref(), drink_id).await?,
    ))
}

/// GET /api/procedures/drift - every procedure that disagrees with its recipe
pub async fn check_drift(State(state): State<ServerState>) -> AppResult<Json<Vec<ProcedureDrift>>> {
    Ok(Json(
        check_all_procedures(state.pool(), state.directory.as_ref()).await?,
    ))
}
