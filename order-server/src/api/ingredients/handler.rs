//! Ingredient API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::error::{ApiResponse, AppResult};
use shared::models::{
    Ingredient, IngredientCreate, IngredientListQuery, InventorySummary, StockAdjustment,
    StockUpdateResult,
};

use crate::core::ServerState;

/// GET /api/ingredients
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<IngredientListQuery>,
) -> AppResult<Json<Vec<Ingredient>>> {
    let ingredients = state.ledger.list_ingredients(&query).await?;
    Ok(Json(ingredients))
}

/// POST /api/ingredients
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<IngredientCreate>,
) -> AppResult<Json<Ingredient>> {
    let ingredient = state.ledger.create_ingredient(payload).await?;
    Ok(Json(ingredient))
}

/// GET /api/ingredients/summary
pub async fn summary(State(state): State<ServerState>) -> AppResult<Json<InventorySummary>> {
    let summary = state.ledger.inventory_summary().await?;
    Ok(Json(summary))
}

/// GET /api/ingredients/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Ingredient>> {
    let ingredient = state.ledger.get_ingredient(id).await?;
    Ok(Json(ingredient))
}

/// PUT /api/ingredients/:id/stock
pub async fn adjust_stock(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<StockAdjustment>,
) -> AppResult<Json<StockUpdateResult>> {
    let result = state.ledger.adjust_stock(id, payload).await?;
    Ok(Json(result))
}

/// DELETE /api/ingredients/:id - soft delete
pub async fn deactivate(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    state.ledger.deactivate_ingredient(id).await?;
    Ok(ApiResponse::ok())
}
