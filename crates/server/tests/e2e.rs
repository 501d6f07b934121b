use std::net::SocketAddr;

use axum::Router;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::json;
use tokio::net::TcpListener;
use uuid::Uuid;

use configs::AppConfig;

struct TestApp {
    base_url: String,
}

async fn start_server(cfg: AppConfig) -> anyhow::Result<TestApp> {
    let app: Router = server::startup::build_app(&cfg).await?;
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url })
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("reqwest client")
}

#[tokio::test]
async fn e2e_seeded_store_and_crud() -> anyhow::Result<()> {
    let seed = std::env::temp_dir().join(format!("e2e_cars_{}.json", Uuid::new_v4()));
    tokio::fs::write(
        &seed,
        serde_json::to_vec(&json!([
            {"make": "Toyota", "model": "Corolla", "year": "2020", "price": 20000,
             "engine": "I4", "autonomous": false},
        ]))?,
    )
    .await?;

    let mut cfg = AppConfig::default();
    cfg.store.seed_path = Some(seed.to_string_lossy().into_owned());
    cfg.store.static_dir = "target/no-static".into();
    let app = start_server(cfg).await?;
    let c = client();

    let res = c.get(format!("{}/cars/0", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<serde_json::Value>().await?["make"], "Toyota");

    let res = c
        .post(format!("{}/cars", app.base_url))
        .json(&json!({"cars": [
            {"make": "Tesla", "model": "3", "year": "2022", "price": 40000,
             "engine": "EV", "autonomous": true, "sold": ["2023-02-01"]}
        ]}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);

    let res = c.put(format!("{}/cars/1", app.base_url)).json(&json!({"sold": null})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["1"]["sold"], serde_json::Value::Null);
    assert_eq!(body["1"]["make"], "Tesla");

    let res = c.get(format!("{}/cars?number=5", app.base_url)).send().await?;
    let list = res.json::<serde_json::Value>().await?;
    assert_eq!(list.as_array().map(Vec::len), Some(2));

    let res = c.get(format!("{}/", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::SEE_OTHER);

    let _ = tokio::fs::remove_file(&seed).await;
    Ok(())
}

#[tokio::test]
async fn e2e_missing_seed_file_fails_startup() {
    let mut cfg = AppConfig::default();
    cfg.store.seed_path = Some("/nonexistent/cars.json".into());
    assert!(start_server(cfg).await.is_err());
}
