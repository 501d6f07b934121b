//! HTML page handlers. JSON-vs-HTML selection happens in `routes::cars`.

use axum::{
    extract::{Form, FromRequest, Request, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::json;
use service::{cars::Car, errors::ServiceError};
use tracing::info;

use crate::errors::JsonApiError;
use crate::routes::cars::check_lookup_id;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    pub id: String,
}

/// Fields posted by the create page. Checkboxes are only sent when ticked.
#[derive(Debug, Deserialize)]
pub struct CarForm {
    pub make: String,
    pub model: String,
    pub year: String,
    pub price: String,
    pub engine: String,
    #[serde(default)]
    pub autonomous: Option<String>,
    #[serde(default)]
    pub sold: Option<String>,
}

impl CarForm {
    pub fn into_car(self) -> Result<Car, ServiceError> {
        let price = self
            .price
            .trim()
            .parse::<f64>()
            .map_err(|_| ServiceError::validation(format!("price must be a number, got `{}`", self.price)))?;
        let autonomous = matches!(
            self.autonomous.as_deref().map(str::trim),
            Some(v) if !v.eq_ignore_ascii_case("off") && !v.eq_ignore_ascii_case("false")
        );
        let sold: Vec<String> = self
            .sold
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        Ok(Car {
            make: self.make,
            model: self.model,
            year: self.year,
            price,
            engine: self.engine,
            autonomous,
            sold: if sold.is_empty() { None } else { Some(sold) },
        })
    }
}

pub async fn root() -> Redirect {
    Redirect::to("/cars")
}

pub async fn create_form(State(state): State<AppState>) -> Result<Html<String>, JsonApiError> {
    let html = state.views.render("create", &json!({"title": "Add a car"}))?;
    Ok(Html(html))
}

pub async fn search(Form(form): Form<SearchForm>) -> Result<Redirect, JsonApiError> {
    let id = form
        .id
        .trim()
        .parse::<u32>()
        .map_err(|_| ServiceError::validation(format!("car id must be a non-negative integer, got `{}`", form.id)))
        .and_then(check_lookup_id)?;
    Ok(Redirect::to(&format!("/cars/{id}")))
}

pub async fn render_list(state: &AppState, limit: &str) -> Result<Response, JsonApiError> {
    let cars = state.cars.list(limit).await?;
    let entries: Vec<_> = cars
        .into_iter()
        .map(|(id, car)| json!({"id": id, "car": car}))
        .collect();
    let html = state.views.render("list", &json!({"title": "Cars", "cars": entries}))?;
    Ok(Html(html).into_response())
}

/// Detail page; an unknown or out-of-range id still renders, with a 404 status.
pub async fn render_detail(state: &AppState, id: u32) -> Result<Response, JsonApiError> {
    let lookup = match check_lookup_id(id) {
        Ok(id) => state.cars.get(id).await,
        Err(_) => Err(ServiceError::not_found("car id out of range")),
    };
    let (status, car) = match lookup {
        Ok(car) => (StatusCode::OK, Some(car)),
        Err(ServiceError::NotFound(_)) => (StatusCode::NOT_FOUND, None),
        Err(e) => return Err(e.into()),
    };
    let ctx = json!({"title": format!("Car {id}"), "id": id, "car": car});
    let html = state.views.render("detail", &ctx)?;
    Ok((status, Html(html)).into_response())
}

/// Insert one car from the create form, then send the browser back to the list.
pub async fn submit_form(state: &AppState, req: Request) -> Result<Redirect, JsonApiError> {
    let Form(form) = Form::<CarForm>::from_request(req, state)
        .await
        .map_err(|r| JsonApiError::new(r.status(), "Invalid Form", Some(r.body_text())))?;
    let car = form.into_car()?;
    let ids = state.cars.insert_many(vec![car], 0).await?;
    info!(event = "car_created_from_form", ids = ?ids, "car created from form");
    Ok(Redirect::to("/cars"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(price: &str, autonomous: Option<&str>, sold: Option<&str>) -> CarForm {
        CarForm {
            make: "Mazda".into(),
            model: "3".into(),
            year: "2018".into(),
            price: price.into(),
            engine: "I4".into(),
            autonomous: autonomous.map(String::from),
            sold: sold.map(String::from),
        }
    }

    #[test]
    fn form_converts_checkbox_and_sold_list() {
        let car = form("15000", Some("on"), Some("2019-01-02, ,2020-03-04")).into_car().unwrap();
        assert_eq!(car.price, 15000.0);
        assert!(car.autonomous);
        assert_eq!(car.sold, Some(vec!["2019-01-02".to_string(), "2020-03-04".to_string()]));

        let car = form("1.5", None, Some("  ")).into_car().unwrap();
        assert!(!car.autonomous);
        assert_eq!(car.sold, None);
    }

    #[test]
    fn form_rejects_bad_price() {
        assert!(matches!(form("cheap", None, None).into_car(), Err(ServiceError::Validation(_))));
    }
}
