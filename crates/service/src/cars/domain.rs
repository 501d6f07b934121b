use serde::{Deserialize, Deserializer, Serialize};

/// A car record. Identity lives in the store key, not in the record.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Car {
    pub make: String,
    pub model: String,
    pub year: String,
    pub price: f64,
    pub engine: String,
    pub autonomous: bool,
    #[serde(default)]
    pub sold: Option<Vec<String>>,
}

/// Partial update: `None` means the field was not sent and keeps its stored value.
///
/// `sold` is doubly optional so an explicit `null` clears the history while an
/// omitted field leaves it untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CarPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autonomous: Option<bool>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub sold: Option<Option<Vec<String>>>,
}

/// Any value that reaches the deserializer was present in the payload, `null` included.
fn present<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

impl CarPatch {
    pub fn is_empty(&self) -> bool {
        *self == CarPatch::default()
    }

    /// Overwrite every field present in the patch, keep the rest.
    pub fn apply(self, car: &mut Car) {
        if let Some(make) = self.make { car.make = make; }
        if let Some(model) = self.model { car.model = model; }
        if let Some(year) = self.year { car.year = year; }
        if let Some(price) = self.price { car.price = price; }
        if let Some(engine) = self.engine { car.engine = engine; }
        if let Some(autonomous) = self.autonomous { car.autonomous = autonomous; }
        if let Some(sold) = self.sold { car.sold = sold; }
    }
}

#[cfg(test)]
pub(crate) fn corolla() -> Car {
    Car {
        make: "Toyota".into(),
        model: "Corolla".into(),
        year: "2020".into(),
        price: 20000.0,
        engine: "I4".into(),
        autonomous: false,
        sold: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn patch_distinguishes_null_from_missing() {
        let omitted: CarPatch = serde_json::from_value(json!({"price": 1.0})).unwrap();
        assert_eq!(omitted.sold, None);

        let cleared: CarPatch = serde_json::from_value(json!({"sold": null})).unwrap();
        assert_eq!(cleared.sold, Some(None));

        let set: CarPatch = serde_json::from_value(json!({"sold": ["2021-01-01"]})).unwrap();
        assert_eq!(set.sold, Some(Some(vec!["2021-01-01".to_string()])));
    }

    #[test]
    fn apply_only_touches_present_fields() {
        let mut car = corolla();
        car.sold = Some(vec!["2020-05-01".into()]);
        CarPatch { price: Some(21000.0), ..Default::default() }.apply(&mut car);
        assert_eq!(car.price, 21000.0);
        assert_eq!(car.make, "Toyota");
        assert_eq!(car.sold, Some(vec!["2020-05-01".to_string()]));

        CarPatch { sold: Some(None), ..Default::default() }.apply(&mut car);
        assert_eq!(car.sold, None);
    }

    #[test]
    fn car_without_sold_deserializes() {
        let car: Car = serde_json::from_value(json!({
            "make": "Tesla", "model": "3", "year": "2022",
            "price": 40000, "engine": "EV", "autonomous": true
        }))
        .unwrap();
        assert!(car.sold.is_none());
        assert!(car.autonomous);
    }

    #[test]
    fn empty_patch() {
        assert!(CarPatch::default().is_empty());
        assert!(!CarPatch { engine: Some("V8".into()), ..Default::default() }.is_empty());
    }
}
