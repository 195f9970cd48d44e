use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use validator::Validate;

use crate::constants::{API_NAME, MAX_SPOT_LEN};
use crate::error::AppError;
use crate::models::{
    check_width, normalize_plate, DetectedCar, DetectionRequest, DetectionResponse, UploadCar,
};

/// External plate-recognition collaborator. Treated as opaque: whatever it
/// reports is authoritative.
#[async_trait]
pub trait PlateDetector: Send + Sync {
    async fn detect(&self, request: &DetectionRequest) -> Result<DetectionResponse, AppError>;
}

/// Talks to the detection service's `POST /detect-plate` over HTTP.
pub struct HttpPlateDetector {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPlateDetector {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/detect-plate", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PlateDetector for HttpPlateDetector {
    async fn detect(&self, request: &DetectionRequest) -> Result<DetectionResponse, AppError> {
        let response = self.client.post(&self.endpoint).json(request).send().await?;
        let status = response.status();

        // "No plate" comes back as a 4xx with a success=false body, so only
        // server errors count as transport failures.
        let response = if status.is_server_error() {
            response.error_for_status()?
        } else {
            response
        };

        Ok(response.json::<DetectionResponse>().await?)
    }
}

/// Forwards uploaded snapshots to a [`PlateDetector`] and republishes the result.
#[derive(Clone)]
pub struct DetectionRelay {
    detector: Arc<dyn PlateDetector>,
}

impl DetectionRelay {
    pub fn new(detector: Arc<dyn PlateDetector>) -> Self {
        Self { detector }
    }

    pub async fn relay(&self, upload: UploadCar) -> Result<DetectedCar, AppError> {
        if upload.image.as_ref().map_or(true, |image| image.is_empty()) {
            return Err(AppError::Validation("No image uploaded".to_string()));
        }
        upload.validate()?;
        let (Some(image), Some(floor), Some(spot)) = (upload.image, upload.floor, upload.spot)
        else {
            return Err(AppError::Validation("Missing required fields".to_string()));
        };
        let spot = spot.trim().to_string();
        if spot.is_empty() {
            return Err(AppError::Validation("Missing required fields".to_string()));
        }
        check_width("spot", &spot, MAX_SPOT_LEN)?;

        tracing::info!(
            "{} Relaying {} byte image for floor {}, spot {}",
            API_NAME,
            image.len(),
            floor,
            spot
        );

        let request = DetectionRequest {
            image: STANDARD.encode(&image),
            floor,
            spot,
        };
        let response = self.detector.detect(&request).await?;

        match response {
            DetectionResponse {
                success: true,
                plate: Some(plate),
                floor,
                spot,
                ..
            } if !plate.trim().is_empty() => Ok(DetectedCar {
                plate: normalize_plate(&plate),
                floor: floor.unwrap_or(request.floor),
                spot: spot.unwrap_or(request.spot),
            }),
            DetectionResponse { error, .. } => {
                let reason = error.unwrap_or_else(|| "no plate in response".to_string());
                tracing::info!("{} No plate detected: {}", API_NAME, reason);
                Err(AppError::DetectionFailed(
                    "Could not detect license plate".to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct StubDetector {
        response: DetectionResponse,
        seen: Mutex<Vec<DetectionRequest>>,
    }

    impl StubDetector {
        fn new(response: DetectionResponse) -> Arc<Self> {
            Arc::new(Self {
                response,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl PlateDetector for StubDetector {
        async fn detect(&self, request: &DetectionRequest) -> Result<DetectionResponse, AppError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(self.response.clone())
        }
    }

    fn upload() -> UploadCar {
        UploadCar {
            image: Some(b"raw-jpeg".to_vec()),
            floor: Some(2),
            spot: Some("C4".to_string()),
        }
    }

    #[tokio::test]
    async fn relay_republishes_successful_detection() {
        let detector = StubDetector::new(DetectionResponse {
            success: true,
            plate: Some("ab12cde".to_string()),
            floor: Some(2),
            spot: Some("C4".to_string()),
            error: None,
        });
        let relay = DetectionRelay::new(detector.clone());

        let detected = relay.relay(upload()).await.unwrap();
        assert_eq!(
            detected,
            DetectedCar {
                plate: "AB12CDE".to_string(),
                floor: 2,
                spot: "C4".to_string()
            }
        );

        let seen = detector.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].image, STANDARD.encode(b"raw-jpeg"));
        assert_eq!(seen[0].floor, 2);
        assert_eq!(seen[0].spot, "C4");
    }

    #[tokio::test]
    async fn relay_maps_negative_detection_to_detection_failed() {
        let detector = StubDetector::new(DetectionResponse {
            success: false,
            error: Some("Could not detect plate".to_string()),
            ..Default::default()
        });
        let relay = DetectionRelay::new(detector);

        let err = relay.relay(upload()).await.unwrap_err();
        assert!(matches!(err, AppError::DetectionFailed(_)));
    }

    #[tokio::test]
    async fn relay_rejects_missing_image_without_calling_detector() {
        let detector = StubDetector::new(DetectionResponse::default());
        let relay = DetectionRelay::new(detector.clone());

        let err = relay
            .relay(UploadCar {
                image: None,
                ..upload()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref msg) if msg == "No image uploaded"));
        assert!(detector.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn endpoint_joins_base_url() {
        let detector =
            HttpPlateDetector::new("http://localhost:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(detector.endpoint(), "http://localhost:5000/detect-plate");
    }
}
