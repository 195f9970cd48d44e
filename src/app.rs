use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{health, parking, upload};
use crate::service::{DetectionRelay, ParkingService};

/// Shared handler state. Both halves are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub parking: ParkingService,
    pub relay: DetectionRelay,
}

impl AppState {
    pub fn new(parking: ParkingService, relay: DetectionRelay) -> Self {
        Self { parking, relay }
    }
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .merge(parking::router())
        .merge(upload::router(max_upload_bytes))
        .merge(health::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
