pub mod memory;
pub mod parked_car_repo;

pub use memory::InMemoryParkedCarStore;
pub use parked_car_repo::PgParkedCarStore;

use async_trait::async_trait;

use crate::models::{NewParkedCar, ParkedCar};

/// The record store behind the parking API.
///
/// Plates passed in are already normalized. Each method maps to a single
/// statement so atomicity comes from the backing engine.
#[async_trait]
pub trait ParkedCarStore: Send + Sync {
    /// Creates the backing table if it does not exist yet.
    async fn init_schema(&self) -> Result<(), sqlx::Error> {
        Ok(())
    }

    /// Inserts the car or overwrites the existing row for its plate,
    /// refreshing `parked_at`.
    async fn upsert(&self, car: &NewParkedCar) -> Result<ParkedCar, sqlx::Error>;

    async fn find_by_plate(&self, plate: &str) -> Result<Option<ParkedCar>, sqlx::Error>;

    /// All rows, most recently parked first.
    async fn list_all(&self) -> Result<Vec<ParkedCar>, sqlx::Error>;

    async fn delete_by_plate(&self, plate: &str) -> Result<Option<ParkedCar>, sqlx::Error>;
}
