//! Order API

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create).get(handler::list))
        .route("/track/{daily_number}", get(handler::track))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/payment", post(handler::submit_payment))
        .route("/{id}/status", put(handler::update_status))
}
