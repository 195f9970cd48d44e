use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    response::Json,
    routing::post,
    Router,
};
use serde_json::json;

use crate::app::AppState;
use crate::error::AppError;
use crate::models::UploadCar;

pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/upload-car", post(upload_car))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

async fn upload_car(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let multipart = multipart.map_err(|e| AppError::Validation(e.body_text()))?;
    let upload = read_upload(multipart).await?;
    let detected = state.relay.relay(upload).await?;

    Ok(Json(json!({
        "success": true,
        "plate": detected.plate,
        "floor": detected.floor,
        "spot": detected.spot
    })))
}

async fn read_upload(mut multipart: Multipart) -> Result<UploadCar, AppError> {
    let mut upload = UploadCar::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        match name.as_str() {
            "image" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(e.body_text()))?;
                upload.image = Some(bytes.to_vec());
            }
            "floor" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(e.body_text()))?;
                let floor = text
                    .trim()
                    .parse::<i32>()
                    .map_err(|_| AppError::Validation(format!("Invalid floor: {}", text)))?;
                upload.floor = Some(floor);
            }
            "spot" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(e.body_text()))?;
                upload.spot = Some(text);
            }
            _ => {}
        }
    }

    Ok(upload)
}
