//! Service layer for the car inventory.
//! - `cars` holds the domain record, the partial update type and the in-memory store.
//! - Handlers talk to the store through the `CarRepository` trait.
//! - Errors are typed (`ServiceError`) and mapped to HTTP codes by the server crate.

pub mod errors;
pub mod cars;
pub mod metrics;
