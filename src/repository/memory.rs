use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::ParkedCarStore;
use crate::models::{NewParkedCar, ParkedCar};

/// Process-local store with the same upsert/order semantics as
/// [`super::PgParkedCarStore`]. Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryParkedCarStore {
    rows: Mutex<HashMap<String, Entry>>,
}

struct Entry {
    car: ParkedCar,
    // Tie-breaker for rows stamped within the same clock tick.
    seq: u64,
}

impl InMemoryParkedCarStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        // A poisoned map is still structurally valid; every write is a single insert/remove.
        self.rows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ParkedCarStore for InMemoryParkedCarStore {
    async fn upsert(&self, car: &NewParkedCar) -> Result<ParkedCar, sqlx::Error> {
        let mut rows = self.lock();
        let seq = rows.values().map(|e| e.seq).max().map_or(0, |max| max + 1);
        let row = ParkedCar {
            plate: car.plate.clone(),
            floor: car.floor,
            spot: car.spot.clone(),
            parked_at: Utc::now(),
            image_data: car.image_data.clone(),
        };
        rows.insert(car.plate.clone(), Entry { car: row.clone(), seq });
        Ok(row)
    }

    async fn find_by_plate(&self, plate: &str) -> Result<Option<ParkedCar>, sqlx::Error> {
        Ok(self
            .lock()
            .get(plate)
            .map(|entry| entry.car.clone().without_image()))
    }

    async fn list_all(&self) -> Result<Vec<ParkedCar>, sqlx::Error> {
        let rows = self.lock();
        let mut entries: Vec<&Entry> = rows.values().collect();
        entries.sort_by(|a, b| {
            b.car
                .parked_at
                .cmp(&a.car.parked_at)
                .then_with(|| b.seq.cmp(&a.seq))
        });
        Ok(entries
            .into_iter()
            .map(|entry| entry.car.clone().without_image())
            .collect())
    }

    async fn delete_by_plate(&self, plate: &str) -> Result<Option<ParkedCar>, sqlx::Error> {
        Ok(self.lock().remove(plate).map(|entry| entry.car))
    }
}
