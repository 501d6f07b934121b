use std::sync::Arc;

use service::cars::{CarRepository, CarStore};

use crate::views::{HtmlViews, ViewRenderer};

/// Shared handler state: the car repository and the view renderer.
#[derive(Clone)]
pub struct AppState {
    pub cars: Arc<dyn CarRepository>,
    pub views: Arc<dyn ViewRenderer>,
}

impl AppState {
    pub fn new(cars: Arc<dyn CarRepository>, views: Arc<dyn ViewRenderer>) -> Self {
        Self { cars, views }
    }

    /// In-memory store with the built-in HTML views.
    pub fn in_memory(store: Arc<CarStore>) -> Self {
        Self::new(store, Arc::new(HtmlViews))
    }
}
