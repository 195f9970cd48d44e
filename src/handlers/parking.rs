use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde_json::json;

use crate::app::AppState;
use crate::error::AppError;
use crate::models::ParkRequest;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/park", post(park_car))
        .route("/find/{plate}", get(find_car))
        .route("/all-cars", get(all_cars))
        .route("/leave/{plate}", delete(leave_car))
}

async fn park_car(
    State(state): State<AppState>,
    payload: Result<Json<ParkRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let car = state.parking.park(request).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Car parked successfully",
        "data": car
    })))
}

async fn find_car(
    State(state): State<AppState>,
    Path(plate): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let car = state.parking.find(&plate).await?;

    Ok(Json(json!({
        "success": true,
        "data": car
    })))
}

async fn all_cars(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let cars = state.parking.list().await?;

    Ok(Json(json!({
        "success": true,
        "data": cars
    })))
}

async fn leave_car(
    State(state): State<AppState>,
    Path(plate): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let car = state.parking.leave(&plate).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Car removed successfully",
        "data": car
    })))
}
