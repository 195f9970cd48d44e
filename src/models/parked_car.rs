use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use sqlx::FromRow;
use validator::Validate;

use crate::constants::{MAX_PLATE_LEN, MAX_SPOT_LEN};
use crate::error::AppError;

/// Canonical form of a licence plate: trimmed and uppercased.
///
/// Every operation that takes a plate runs it through here exactly once, at
/// the service boundary, so the store only ever sees canonical keys.
pub fn normalize_plate(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// One row of `parked_cars`.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ParkedCar {
    pub plate: String,
    pub floor: i32,
    pub spot: String,
    pub parked_at: DateTime<Utc>,
    // Lookups don't select the blob, so it must tolerate a missing column.
    #[sqlx(default)]
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "serialize_image")]
    pub image_data: Option<Vec<u8>>,
}

impl ParkedCar {
    /// Same row without the snapshot bytes, as returned by lookups.
    pub fn without_image(mut self) -> Self {
        self.image_data = None;
        self
    }
}

fn serialize_image<S>(image: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match image {
        Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
        None => serializer.serialize_none(),
    }
}

/// Rejects values wider than their `parked_cars` column. Run on the
/// normalized value: uppercasing can lengthen a string ("ß" -> "SS").
pub fn check_width(field: &str, value: &str, max_chars: usize) -> Result<(), AppError> {
    if value.chars().count() > max_chars {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, max_chars
        )));
    }
    Ok(())
}

/// A validated, normalized check-in ready for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewParkedCar {
    pub plate: String,
    pub floor: i32,
    pub spot: String,
    pub image_data: Option<Vec<u8>>,
}

/// Body of `POST /park`.
///
/// Every field is optional at the serde level so a missing field becomes a
/// validation error instead of a body rejection.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ParkRequest {
    #[validate(required, length(min = 1))]
    pub plate: Option<String>,
    #[validate(required, range(min = 1))]
    pub floor: Option<i32>,
    #[validate(required, length(min = 1))]
    pub spot: Option<String>,
    #[serde(rename = "imageData")]
    pub image_data: Option<String>,
}

impl ParkRequest {
    pub fn new(plate: &str, floor: i32, spot: &str) -> Self {
        Self {
            plate: Some(plate.to_string()),
            floor: Some(floor),
            spot: Some(spot.to_string()),
            image_data: None,
        }
    }

    pub fn into_new_car(self) -> Result<NewParkedCar, AppError> {
        self.validate()?;

        let (Some(plate), Some(floor), Some(spot)) = (self.plate, self.floor, self.spot) else {
            return Err(AppError::Validation("Missing required fields".to_string()));
        };

        let plate = normalize_plate(&plate);
        let spot = spot.trim().to_string();
        if plate.is_empty() || spot.is_empty() {
            return Err(AppError::Validation("Missing required fields".to_string()));
        }
        check_width("plate", &plate, MAX_PLATE_LEN)?;
        check_width("spot", &spot, MAX_SPOT_LEN)?;

        let image_data = match self.image_data.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(encoded) => Some(
                STANDARD
                    .decode(encoded)
                    .map_err(|e| AppError::Validation(format!("imageData is not valid base64: {}", e)))?,
            ),
        };

        Ok(NewParkedCar {
            plate,
            floor,
            spot,
            image_data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_plate_trims_and_uppercases() {
        assert_eq!(normalize_plate("  abc1234 "), "ABC1234");
        assert_eq!(normalize_plate("XYZ999"), "XYZ999");
    }

    #[test]
    fn into_new_car_normalizes_plate_and_spot() {
        let car = ParkRequest::new(" xyz999", 3, " B2 ").into_new_car().unwrap();
        assert_eq!(car.plate, "XYZ999");
        assert_eq!(car.floor, 3);
        assert_eq!(car.spot, "B2");
        assert_eq!(car.image_data, None);
    }

    #[test]
    fn into_new_car_rejects_missing_fields() {
        for request in [
            ParkRequest { plate: None, ..ParkRequest::new("A", 1, "A1") },
            ParkRequest { floor: None, ..ParkRequest::new("A", 1, "A1") },
            ParkRequest { spot: None, ..ParkRequest::new("A", 1, "A1") },
            ParkRequest::new("", 1, "A1"),
            ParkRequest::new("A", 1, ""),
            ParkRequest::new("   ", 1, "A1"),
            ParkRequest::new("A", 0, "A1"),
        ] {
            let err = request.clone().into_new_car().unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{:?} -> {:?}", request, err);
        }
    }

    #[test]
    fn into_new_car_enforces_column_widths() {
        let err = ParkRequest::new(&"A".repeat(21), 1, "A1").into_new_car().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let err = ParkRequest::new("ABC", 1, "SPOT-TOO-LONG").into_new_car().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn into_new_car_measures_width_after_normalizing() {
        // Each "ß" uppercases to "SS", doubling the stored width.
        let err = ParkRequest::new(&"ß".repeat(20), 1, "A1").into_new_car().unwrap_err();
        assert!(matches!(err, AppError::Validation(ref msg) if msg.contains("plate")));

        let padded_plate = format!("  {}  ", "A".repeat(20));
        let car = ParkRequest::new(&padded_plate, 1, "   B2        ").into_new_car().unwrap();
        assert_eq!(car.plate.len(), 20);
        assert_eq!(car.spot, "B2");
    }

    #[test]
    fn into_new_car_decodes_image() {
        let request = ParkRequest {
            image_data: Some(STANDARD.encode(b"jpeg")),
            ..ParkRequest::new("abc", 2, "C3")
        };
        assert_eq!(request.into_new_car().unwrap().image_data, Some(b"jpeg".to_vec()));

        let request = ParkRequest {
            image_data: Some("not base64!".to_string()),
            ..ParkRequest::new("abc", 2, "C3")
        };
        assert!(matches!(request.into_new_car(), Err(AppError::Validation(_))));
    }

    #[test]
    fn parked_car_serializes_image_only_when_present() {
        let car = ParkedCar {
            plate: "ABC".to_string(),
            floor: 1,
            spot: "A1".to_string(),
            parked_at: Utc::now(),
            image_data: Some(vec![1, 2, 3]),
        };
        let json = serde_json::to_value(&car).unwrap();
        assert_eq!(json["image_data"], "AQID");

        let json = serde_json::to_value(car.without_image()).unwrap();
        assert!(json.get("image_data").is_none());
        assert_eq!(json["plate"], "ABC");
    }
}
