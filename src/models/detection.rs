use serde::{Deserialize, Serialize};
use validator::Validate;

/// Payload sent to the detection service's `/detect-plate` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionRequest {
    /// Base64-encoded image bytes.
    pub image: String,
    pub floor: i32,
    pub spot: String,
}

/// Reply from the detection service. Only `success` is guaranteed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionResponse {
    pub success: bool,
    pub plate: Option<String>,
    pub floor: Option<i32>,
    pub spot: Option<String>,
    pub error: Option<String>,
}

/// What `POST /upload-car` republishes on a successful detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectedCar {
    pub plate: String,
    pub floor: i32,
    pub spot: String,
}

/// Form fields of `POST /upload-car`, collected from the multipart stream.
#[derive(Debug, Clone, Default, Validate)]
pub struct UploadCar {
    #[validate(required, length(min = 1))]
    pub image: Option<Vec<u8>>,
    #[validate(required, range(min = 1))]
    pub floor: Option<i32>,
    #[validate(required, length(min = 1))]
    pub spot: Option<String>,
}
