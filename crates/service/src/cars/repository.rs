use async_trait::async_trait;

use super::domain::{Car, CarPatch};
use crate::errors::ServiceError;

/// Trait abstraction over car storage so handlers depend on the seam, not the map.
#[async_trait]
pub trait CarRepository: Send + Sync {
    /// First `limit` entries in insertion order; `limit` is the raw query value.
    async fn list(&self, limit: &str) -> Result<Vec<(u32, Car)>, ServiceError>;
    async fn get(&self, id: u32) -> Result<Car, ServiceError>;
    /// Store every car under a freshly allocated id and return the ids in input order.
    async fn insert_many(&self, cars: Vec<Car>, min_id_offset: i64) -> Result<Vec<u32>, ServiceError>;
    async fn update(&self, id: u32, patch: CarPatch) -> Result<Car, ServiceError>;
    async fn delete(&self, id: u32) -> Result<(), ServiceError>;
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
