use std::sync::Arc;

use crate::constants::API_NAME;
use crate::error::AppError;
use crate::models::{normalize_plate, ParkRequest, ParkedCar};
use crate::repository::ParkedCarStore;

/// Check-in, lookup and departure on top of an injected [`ParkedCarStore`].
#[derive(Clone)]
pub struct ParkingService {
    store: Arc<dyn ParkedCarStore>,
}

impl ParkingService {
    pub fn new(store: Arc<dyn ParkedCarStore>) -> Self {
        Self { store }
    }

    /// Validates the request and upserts the car, returning the stored row.
    ///
    /// Re-parking a plate that is already in the store overwrites it.
    pub async fn park(&self, request: ParkRequest) -> Result<ParkedCar, AppError> {
        let car = request.into_new_car()?;
        tracing::info!(
            "{} Parking car {} at floor {}, spot {}",
            API_NAME,
            car.plate,
            car.floor,
            car.spot
        );
        Ok(self.store.upsert(&car).await?)
    }

    pub async fn find(&self, plate: &str) -> Result<ParkedCar, AppError> {
        let plate = normalized_key(plate)?;
        tracing::info!("{} Looking up car {}", API_NAME, plate);
        self.store
            .find_by_plate(&plate)
            .await?
            .ok_or_else(|| car_not_found(&plate))
    }

    pub async fn list(&self) -> Result<Vec<ParkedCar>, AppError> {
        let cars = self.store.list_all().await?;
        tracing::debug!("{} Listing {} parked cars", API_NAME, cars.len());
        Ok(cars)
    }

    pub async fn leave(&self, plate: &str) -> Result<ParkedCar, AppError> {
        let plate = normalized_key(plate)?;
        tracing::info!("{} Removing car {}", API_NAME, plate);
        self.store
            .delete_by_plate(&plate)
            .await?
            .ok_or_else(|| car_not_found(&plate))
    }
}

fn normalized_key(plate: &str) -> Result<String, AppError> {
    let plate = normalize_plate(plate);
    if plate.is_empty() {
        return Err(AppError::Validation("Plate is required".to_string()));
    }
    Ok(plate)
}

fn car_not_found(plate: &str) -> AppError {
    AppError::NotFound(format!("Car not found: {}", plate))
}
