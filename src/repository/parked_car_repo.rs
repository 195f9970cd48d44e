use async_trait::async_trait;
use sqlx::PgPool;

use super::ParkedCarStore;
use crate::models::{NewParkedCar, ParkedCar};

#[derive(Clone)]
pub struct PgParkedCarStore {
    pool: PgPool,
}

impl PgParkedCarStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ParkedCarStore for PgParkedCarStore {
    async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn upsert(&self, car: &NewParkedCar) -> Result<ParkedCar, sqlx::Error> {
        sqlx::query_as::<_, ParkedCar>(
            "INSERT INTO parked_cars (plate, floor, spot, parked_at, image_data)
             VALUES ($1, $2, $3, CURRENT_TIMESTAMP, $4)
             ON CONFLICT (plate)
             DO UPDATE SET floor = EXCLUDED.floor,
                           spot = EXCLUDED.spot,
                           parked_at = CURRENT_TIMESTAMP,
                           image_data = EXCLUDED.image_data
             RETURNING plate, floor, spot, parked_at, image_data",
        )
        .bind(&car.plate)
        .bind(car.floor)
        .bind(&car.spot)
        .bind(car.image_data.as_deref())
        .fetch_one(&self.pool)
        .await
    }

    async fn find_by_plate(&self, plate: &str) -> Result<Option<ParkedCar>, sqlx::Error> {
        sqlx::query_as::<_, ParkedCar>(
            "SELECT plate, floor, spot, parked_at FROM parked_cars WHERE plate = $1",
        )
        .bind(plate)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_all(&self) -> Result<Vec<ParkedCar>, sqlx::Error> {
        sqlx::query_as::<_, ParkedCar>(
            "SELECT plate, floor, spot, parked_at FROM parked_cars ORDER BY parked_at DESC",
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn delete_by_plate(&self, plate: &str) -> Result<Option<ParkedCar>, sqlx::Error> {
        sqlx::query_as::<_, ParkedCar>(
            "DELETE FROM parked_cars WHERE plate = $1
             RETURNING plate, floor, spot, parked_at, image_data",
        )
        .bind(plate)
        .fetch_optional(&self.pool)
        .await
    }
}
