//! Server-rendered HTML views.
//!
//! Handlers hand a view name and a JSON context to a [`ViewRenderer`]; the
//! built-in [`HtmlViews`] knows the `list`, `detail` and `create` pages.

use std::fmt::Write;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("unknown view: {0}")]
    UnknownView(String),
    #[error("missing context field `{0}`")]
    Context(&'static str),
}

/// Renders a named view with a context mapping into an HTML document.
pub trait ViewRenderer: Send + Sync {
    fn render(&self, view: &str, ctx: &Value) -> Result<String, ViewError>;
}

#[derive(Clone, Debug, Default)]
pub struct HtmlViews;

impl ViewRenderer for HtmlViews {
    fn render(&self, view: &str, ctx: &Value) -> Result<String, ViewError> {
        let title = ctx.get("title").and_then(Value::as_str).unwrap_or("Cars");
        let body = match view {
            "list" => list_body(ctx)?,
            "detail" => detail_body(ctx)?,
            "create" => create_body(),
            other => return Err(ViewError::UnknownView(other.to_string())),
        };
        Ok(layout(title, &body))
    }
}

/// Escape text for use in element content and quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    let title = escape(title);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
<nav>
<a href="/cars">Cars</a>
<a href="/create">Add car</a>
<form method="post" action="/search">
<input type="number" name="id" min="0" max="999" placeholder="Car id" required>
<button type="submit">Search</button>
</form>
</nav>
<main>
<h1>{title}</h1>
{body}
</main>
</body>
</html>
"#
    )
}

/// Plain text for a JSON scalar; strings unquoted, null empty.
fn text(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => escape(s),
        Some(other) => escape(&other.to_string()),
    }
}

fn sold_text(car: &Value) -> String {
    match car.get("sold").and_then(Value::as_array) {
        Some(dates) if !dates.is_empty() => dates
            .iter()
            .map(|d| text(Some(d)))
            .collect::<Vec<_>>()
            .join(", "),
        _ => "never".to_string(),
    }
}

fn yes_no(car: &Value, key: &str) -> &'static str {
    if car.get(key).and_then(Value::as_bool).unwrap_or(false) { "yes" } else { "no" }
}

fn list_body(ctx: &Value) -> Result<String, ViewError> {
    let cars = ctx.get("cars").and_then(Value::as_array).ok_or(ViewError::Context("cars"))?;
    if cars.is_empty() {
        return Ok("<p>No cars yet.</p>\n".to_string());
    }
    let mut out = String::from(
        "<table>\n<tr><th>Id</th><th>Make</th><th>Model</th><th>Year</th><th>Price</th></tr>\n",
    );
    for entry in cars {
        let id = text(entry.get("id"));
        let car = entry.get("car").ok_or(ViewError::Context("car"))?;
        let _ = writeln!(
            out,
            r#"<tr><td><a href="/cars/{id}">{id}</a></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
            text(car.get("make")),
            text(car.get("model")),
            text(car.get("year")),
            text(car.get("price")),
        );
    }
    out.push_str("</table>\n");
    Ok(out)
}

fn detail_body(ctx: &Value) -> Result<String, ViewError> {
    let id = text(Some(ctx.get("id").ok_or(ViewError::Context("id"))?));
    let car = match ctx.get("car") {
        Some(car) if car.is_object() => car,
        _ => return Ok(format!("<p>No car with id {id}.</p>\n")),
    };
    let mut out = String::from("<dl>\n");
    let rows = [
        ("Id", id.clone()),
        ("Make", text(car.get("make"))),
        ("Model", text(car.get("model"))),
        ("Year", text(car.get("year"))),
        ("Price", text(car.get("price"))),
        ("Engine", text(car.get("engine"))),
        ("Autonomous", yes_no(car, "autonomous").to_string()),
        ("Sold", sold_text(car)),
    ];
    for (label, value) in rows {
        let _ = writeln!(out, "<dt>{label}</dt><dd>{value}</dd>");
    }
    out.push_str("</dl>\n");
    Ok(out)
}

fn create_body() -> String {
    r#"<form method="post" action="/cars">
<label>Make <input name="make" required></label>
<label>Model <input name="model" required></label>
<label>Year <input name="year" required></label>
<label>Price <input name="price" type="number" step="any" required></label>
<label>Engine <input name="engine" required></label>
<label>Autonomous <input name="autonomous" type="checkbox"></label>
<label>Sold (comma separated) <input name="sold"></label>
<button type="submit">Add</button>
</form>
"#
    .to_string()
}
