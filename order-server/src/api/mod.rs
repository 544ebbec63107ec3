//! API routes
//!
//! - [`health`] - liveness
//! - [`orders`] - storefront and admin order endpoints
//! - [`ingredients`] - stock ledger endpoints
//! - [`menu`] - menu items and availability
//! - [`ws`] - real-time rooms

pub mod health;
pub mod ingredients;
pub mod menu;
pub mod orders;
pub mod ws;

use axum::Router;
use http::{HeaderName, HeaderValue};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// All routes, no middleware, no state
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(ingredients::router())
        .merge(menu::router())
        .merge(ws::router())
}

/// Fully configured application, used by the server and by tests
pub fn router(state: ServerState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    build_router()
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), XRequestId))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
