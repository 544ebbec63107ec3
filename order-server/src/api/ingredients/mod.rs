//! Ingredient API

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/ingredients", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/summary", get(handler::summary))
        .route("/{id}", get(handler::get_by_id).delete(handler::deactivate))
        .route("/{id}/stock", put(handler::adjust_stock))
}
