//! Car records and their storage.

pub mod domain;
pub mod repository;
pub mod store;

pub use domain::{Car, CarPatch};
pub use repository::CarRepository;
pub use store::CarStore;
