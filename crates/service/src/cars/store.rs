use std::{collections::HashMap, path::Path, sync::Arc};

use async_trait::async_trait;
use tokio::{fs, sync::RwLock};
use tracing::{debug, info};

use super::domain::{Car, CarPatch};
use super::repository::CarRepository;
use crate::errors::ServiceError;
use crate::metrics::{CARS_INSERTED_TOTAL, NOT_FOUND_TOTAL};

pub const GET_MISS: &str = "Could not find car by Id";
pub const WRITE_MISS: &str = "Could not find car with given id";

/// Longest accepted `limit` string.
const MAX_LIMIT_CHARS: usize = 3;

#[derive(Default)]
struct Entries {
    cars: HashMap<u32, Car>,
    /// Keys in insertion order; updates keep their slot.
    order: Vec<u32>,
}

impl Entries {
    fn insert_new(&mut self, id: u32, car: Car) {
        if self.cars.insert(id, car).is_none() {
            self.order.push(id);
        }
    }

    fn remove(&mut self, id: u32) -> bool {
        if self.cars.remove(&id).is_none() {
            return false;
        }
        self.order.retain(|k| *k != id);
        true
    }
}

/// In-memory car store shared by every request.
///
/// Keys are allocated by a forward-only cursor: it starts at
/// `len + min_id_offset`, skips occupied slots, and always moves one past the
/// id it just assigned.
#[derive(Clone, Default)]
pub struct CarStore {
    inner: Arc<RwLock<Entries>>,
}

/// Parse the raw `limit` value: at most three characters, digits only.
pub fn parse_limit(raw: &str) -> Result<usize, ServiceError> {
    let raw = raw.trim();
    if raw.chars().count() > MAX_LIMIT_CHARS {
        return Err(ServiceError::validation(format!(
            "number must be at most {MAX_LIMIT_CHARS} characters"
        )));
    }
    raw.parse::<usize>()
        .map_err(|_| ServiceError::validation(format!("number must be a non-negative integer, got `{raw}`")))
}

impl CarStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Store pre-seeded with `cars` under ids `0..cars.len()`.
    pub async fn with_cars(cars: Vec<Car>) -> Result<Arc<Self>, ServiceError> {
        let store = Self::new();
        if !cars.is_empty() {
            store.insert_many(cars, 0).await?;
        }
        Ok(store)
    }

    /// Load a JSON array of cars from `path` and seed the store with it.
    pub async fn from_seed_file<P: AsRef<Path>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .await
            .map_err(|e| ServiceError::Seed(format!("cannot read {}: {e}", path.display())))?;
        let cars: Vec<Car> = serde_json::from_slice(&bytes)
            .map_err(|e| ServiceError::Seed(format!("invalid seed {}: {e}", path.display())))?;
        let count = cars.len();
        let store = Self::with_cars(cars).await?;
        info!(event = "store_seeded", path = %path.display(), count, "car store seeded");
        Ok(store)
    }

    pub async fn list(&self, limit: &str) -> Result<Vec<(u32, Car)>, ServiceError> {
        let limit = parse_limit(limit)?;
        let map = self.inner.read().await;
        Ok(map
            .order
            .iter()
            .take(limit)
            .filter_map(|id| map.cars.get(id).map(|car| (*id, car.clone())))
            .collect())
    }

    pub async fn get(&self, id: u32) -> Result<Car, ServiceError> {
        let map = self.inner.read().await;
        map.cars.get(&id).cloned().ok_or_else(|| {
            NOT_FOUND_TOTAL.inc();
            ServiceError::not_found(GET_MISS)
        })
    }

    pub async fn insert_many(&self, cars: Vec<Car>, min_id_offset: i64) -> Result<Vec<u32>, ServiceError> {
        if cars.is_empty() {
            return Err(ServiceError::validation("No cars to add"));
        }

        let mut map = self.inner.write().await;
        let start = (map.cars.len() as i64)
            .checked_add(min_id_offset)
            .ok_or_else(|| ServiceError::validation(format!("min_id {min_id_offset} is out of range")))?;
        let mut cursor = u32::try_from(start)
            .map_err(|_| ServiceError::validation(format!("min_id {min_id_offset} gives an invalid starting id {start}")))?;

        // Ids are planned before any write so a failing batch leaves the store untouched.
        // Assigned ids are all below the cursor, so only pre-existing keys can collide.
        let exhausted = || ServiceError::validation("car id space exhausted");
        let mut assigned = Vec::with_capacity(cars.len());
        for i in 0..cars.len() {
            while map.cars.contains_key(&cursor) {
                cursor = cursor.checked_add(1).ok_or_else(exhausted)?;
            }
            assigned.push(cursor);
            if i + 1 < cars.len() {
                // Moves past the assigned id even when the next slot is free.
                cursor = cursor.checked_add(1).ok_or_else(exhausted)?;
            }
        }
        for (id, car) in assigned.iter().copied().zip(cars) {
            map.insert_new(id, car);
        }
        drop(map);

        CARS_INSERTED_TOTAL.inc_by(assigned.len() as u64);
        debug!(event = "cars_inserted", ids = ?assigned, "cars inserted");
        Ok(assigned)
    }

    pub async fn update(&self, id: u32, patch: CarPatch) -> Result<Car, ServiceError> {
        let mut map = self.inner.write().await;
        let stored = map.cars.get_mut(&id).ok_or_else(|| {
            NOT_FOUND_TOTAL.inc();
            ServiceError::not_found(WRITE_MISS)
        })?;
        patch.apply(stored);
        let merged = stored.clone();
        drop(map);
        debug!(event = "car_updated", id, "car updated");
        Ok(merged)
    }

    pub async fn delete(&self, id: u32) -> Result<(), ServiceError> {
        let mut map = self.inner.write().await;
        if !map.remove(id) {
            NOT_FOUND_TOTAL.inc();
            return Err(ServiceError::not_found(WRITE_MISS));
        }
        drop(map);
        debug!(event = "car_deleted", id, "car deleted");
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.cars.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Ids in insertion order.
    pub async fn ids(&self) -> Vec<u32> {
        self.inner.read().await.order.clone()
    }
}

#[async_trait]
impl CarRepository for CarStore {
    async fn list(&self, limit: &str) -> Result<Vec<(u32, Car)>, ServiceError> { self.list(limit).await }
    async fn get(&self, id: u32) -> Result<Car, ServiceError> { self.get(id).await }
    async fn insert_many(&self, cars: Vec<Car>, min_id_offset: i64) -> Result<Vec<u32>, ServiceError> { self.insert_many(cars, min_id_offset).await }
    async fn update(&self, id: u32, patch: CarPatch) -> Result<Car, ServiceError> { self.update(id, patch).await }
    async fn delete(&self, id: u32) -> Result<(), ServiceError> { self.delete(id).await }
    async fn len(&self) -> usize { self.len().await }
}
