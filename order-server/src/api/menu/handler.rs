//! Menu API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{AvailabilityReport, MenuItem, MenuItemCreate};

use crate::core::{ServerState, ServiceError};

/// GET /api/menu - menu items with derived availability
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<MenuItem>>> {
    let items = state
        .menu_items
        .find_all()
        .await
        .map_err(ServiceError::from)?;
    Ok(Json(items))
}

/// GET /api/menu/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MenuItem>> {
    let item = state
        .menu_items
        .find_by_id(id)
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::MenuItemNotFound, format!("Menu item {id} not found"))
        })?;
    Ok(Json(item))
}

/// POST /api/menu - add a menu item; availability is derived right away
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<MenuItemCreate>,
) -> AppResult<Json<MenuItem>> {
    if !payload.price.is_finite() || payload.price < 0.0 {
        return Err(AppError::validation("Menu item price must be a non-negative number"));
    }
    let now = shared::util::now_millis();
    let item = state
        .menu_items
        .create(payload, now)
        .await
        .map_err(ServiceError::from)?;
    tracing::info!(menu_item_id = item.id, menu_item = %item.name, "Menu item created");

    state.ledger.refresh_availability().await;
    let item = state
        .menu_items
        .find_by_id(item.id)
        .await
        .map_err(ServiceError::from)?
        .unwrap_or(item);
    Ok(Json(item))
}

/// POST /api/menu/availability/recompute
pub async fn recompute(State(state): State<ServerState>) -> AppResult<Json<AvailabilityReport>> {
    let report = state.availability.recompute_all().await?;
    Ok(Json(report))
}
