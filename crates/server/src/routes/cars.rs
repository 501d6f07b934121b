use std::collections::BTreeMap;

use axum::{
    extract::{FromRequest, Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use service::{cars::{Car, CarPatch}, errors::ServiceError, metrics::record_request};
use tracing::info;

use crate::errors::JsonApiError;
use crate::routes::{is_form, pages, wants_html};
use crate::state::AppState;

/// Ids accepted by `GET /cars/:id` lie in `0..MAX_LOOKUP_ID`.
pub const MAX_LOOKUP_ID: u32 = 1000;
pub const DEFAULT_LIMIT: &str = "10";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub number: Option<String>,
}

impl ListQuery {
    pub fn limit(&self) -> &str {
        self.number.as_deref().unwrap_or(DEFAULT_LIMIT)
    }
}

/// `POST /cars` body: either `{"cars": [...], "min_id": n}` or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CreateCars {
    Batch {
        #[serde(alias = "body_cars")]
        cars: Vec<Car>,
        #[serde(default)]
        min_id: i64,
    },
    Cars(Vec<Car>),
}

impl CreateCars {
    fn into_parts(self) -> (Vec<Car>, i64) {
        match self {
            Self::Batch { cars, min_id } => (cars, min_id),
            Self::Cars(cars) => (cars, 0),
        }
    }
}

/// One `{"<id>": car}` object, the shape used by list and update responses.
fn keyed(id: u32, car: Car) -> BTreeMap<u32, Car> {
    BTreeMap::from([(id, car)])
}

pub fn check_lookup_id(id: u32) -> Result<u32, ServiceError> {
    if id >= MAX_LOOKUP_ID {
        return Err(ServiceError::validation(format!(
            "car id must be less than {MAX_LOOKUP_ID}"
        )));
    }
    Ok(id)
}

/// List cars; browsers get the rendered list page.
pub async fn list_cars(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(q): Query<ListQuery>,
) -> Result<Response, JsonApiError> {
    record_request("list");
    if wants_html(&headers) {
        return pages::render_list(&state, q.limit()).await;
    }
    let cars = state.cars.list(q.limit()).await?;
    let body: Vec<BTreeMap<u32, Car>> = cars.into_iter().map(|(id, car)| keyed(id, car)).collect();
    Ok(Json(body).into_response())
}

pub async fn get_car(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<u32>,
) -> Result<Response, JsonApiError> {
    record_request("get");
    if wants_html(&headers) {
        return pages::render_detail(&state, id).await;
    }
    let id = check_lookup_id(id)?;
    let car = state.cars.get(id).await?;
    Ok(Json(car).into_response())
}

/// Batch insert; form posts from the create page are handed to the page flow.
pub async fn create_cars(State(state): State<AppState>, req: Request) -> Response {
    record_request("create");
    if is_form(req.headers()) {
        return pages::submit_form(&state, req).await.into_response();
    }
    let Json(body) = match Json::<CreateCars>::from_request(req, &state).await {
        Ok(json) => json,
        Err(rejection) => return rejection.into_response(),
    };
    let (cars, min_id) = body.into_parts();
    match state.cars.insert_many(cars, min_id).await {
        Ok(ids) => {
            info!(event = "cars_created", count = ids.len(), "cars created");
            (StatusCode::CREATED, Json("Ok")).into_response()
        }
        Err(e) => JsonApiError::from(e).into_response(),
    }
}

pub async fn update_car(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Json(patch): Json<CarPatch>,
) -> Result<Json<BTreeMap<u32, Car>>, JsonApiError> {
    record_request("update");
    let merged = state.cars.update(id, patch).await?;
    Ok(Json(keyed(id, merged)))
}

pub async fn delete_car(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<&'static str>, JsonApiError> {
    record_request("delete");
    state.cars.delete(id).await?;
    info!(event = "car_deleted", id, "car deleted");
    Ok(Json("OK"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_body_accepts_both_shapes() {
        let car = json!({"make": "a", "model": "b", "year": "1", "price": 1, "engine": "e", "autonomous": false});
        let batch: CreateCars = serde_json::from_value(json!({"cars": [car.clone()], "min_id": 4})).unwrap();
        assert_eq!(batch.into_parts().1, 4);
        let alias: CreateCars = serde_json::from_value(json!({"body_cars": [car.clone()]})).unwrap();
        assert_eq!(alias.into_parts().1, 0);
        let bare: CreateCars = serde_json::from_value(json!([car])).unwrap();
        assert_eq!(bare.into_parts().0.len(), 1);
    }

    #[test]
    fn lookup_ids_are_bounded() {
        assert!(check_lookup_id(0).is_ok());
        assert!(check_lookup_id(999).is_ok());
        assert!(matches!(check_lookup_id(1000), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn keyed_serializes_id_as_object_key() {
        let car = Car {
            make: "a".into(),
            model: "b".into(),
            year: "1".into(),
            price: 1.0,
            engine: "e".into(),
            autonomous: false,
            sold: None,
        };
        let v = serde_json::to_value(keyed(3, car)).unwrap();
        assert_eq!(v["3"]["make"], "a");
    }
}
