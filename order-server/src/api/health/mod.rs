//! Health check
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /health | GET | liveness plus a database ping |

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// ok | degraded
    status: &'static str,
    version: &'static str,
    database: bool,
    /// Connected real-time sessions
    subscribers: usize,
}

async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let database = sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&state.db.pool)
        .await
        .is_ok();

    Json(HealthResponse {
        status: if database { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database,
        subscribers: state.events.subscriber_count(),
    })
}
