use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use migration::MigratorTrait;
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use integrations::mock::{CannedAssistant, StaticGeocoder};
use integrations::ServiceDraft;
use server::routes::{self, ServerState};

fn cors() -> CorsLayer { CorsLayer::very_permissive() }

struct TestApp {
    base_url: String,
}

impl TestApp {
    fn url(&self, path: &str) -> String { format!("{}{}", self.base_url, path) }
}

fn draft() -> ServiceDraft {
    ServiceDraft {
        name: "Перукарня Оля".into(),
        category: "Послуги краси".into(),
        address: Some("вул. Шевченка, 1".into()),
        phone: Some("+380501112233".into()),
        ..Default::default()
    }
}

async fn start_server(api_key: Option<&str>) -> anyhow::Result<TestApp> {
    let db = models::db::connect_in_memory().await?;
    migration::Migrator::up(&db, None).await?;

    let state = ServerState {
        db,
        geocoder: Some(Arc::new(StaticGeocoder::with(&[("вул. Шевченка, 1", (51.82, 31.95))]))),
        assistant: Some(Arc::new(CannedAssistant { draft: Some(draft()), ..Default::default() })),
        admin_api_key: api_key.map(str::to_string),
    };

    let app: Router = routes::build_router(state, cors());
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url })
}

fn client() -> reqwest::Client { reqwest::Client::new() }

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server(None).await?;
    let res = client().get(app.url("/health")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_service_crud_with_geocoding() -> anyhow::Result<()> {
    let app = start_server(None).await?;
    let c = client();

    let res = c
        .post(app.url("/admin/services"))
        .json(&json!({"name": "Шиномонтаж", "category": "Автомобільний сервіс", "address": "вул. Шевченка, 1", "phone": "+380671234567"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let created: Value = res.json().await?;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["latitude"], json!(51.82));
    assert_eq!(created["longitude"], json!(31.95));

    // category created on the fly
    let cats: Value = c.get(app.url("/admin/categories")).send().await?.json().await?;
    assert!(cats.as_array().unwrap().iter().any(|c| c["name"] == "Автомобільний сервіс"));

    let res = c
        .put(app.url(&format!("/admin/services/{id}")))
        .json(&json!({"name": "Шиномонтаж", "category": "Автомобільний сервіс", "address": "невідома адреса"}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let updated: Value = res.json().await?;
    assert!(updated["latitude"].is_null());
    assert!(updated["phone"].is_null());

    let listed: Value = c.get(app.url("/admin/services?q=монтаж")).send().await?.json().await?;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let res = c.delete(app.url(&format!("/admin/services/{id}"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);
    let res = c.get(app.url(&format!("/admin/services/{id}"))).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], "Not Found");
    Ok(())
}

#[tokio::test]
async fn e2e_duplicate_service_conflicts() -> anyhow::Result<()> {
    let app = start_server(None).await?;
    let c = client();
    let body = json!({"name": "Пекарня", "category": "Ремонт та обслуговування"});
    assert_eq!(c.post(app.url("/admin/services")).json(&body).send().await?.status(), HttpStatusCode::CREATED);
    assert_eq!(c.post(app.url("/admin/services")).json(&body).send().await?.status(), HttpStatusCode::CONFLICT);

    let res = c.post(app.url("/admin/services")).json(&json!({"name": " ", "category": "X"})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn e2e_menu_tree_crud() -> anyhow::Result<()> {
    let app = start_server(None).await?;
    let c = client();

    let root: Value = c.post(app.url("/admin/menu")).json(&json!({"text": "Транспорт"})).send().await?.json().await?;
    let root_id = root["id"].as_i64().unwrap();
    let res = c
        .post(app.url("/admin/menu"))
        .json(&json!({"text": "Розклад автобусів", "parent_id": root_id}))
        .send()
        .await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);

    let res = c.post(app.url("/admin/menu")).json(&json!({"text": "Сирота", "parent_id": 999})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let all: Value = c.get(app.url("/admin/menu")).send().await?.json().await?;
    assert_eq!(all.as_array().map(Vec::len), Some(2));

    let res = c.delete(app.url("/admin/menu/999")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn e2e_admin_routes_require_api_key() -> anyhow::Result<()> {
    let app = start_server(Some("s3cret")).await?;
    let c = client();

    let res = c.get(app.url("/admin/categories")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::UNAUTHORIZED);
    let res = c.get(app.url("/admin/categories")).header(routes::API_KEY_HEADER, "wrong").send().await?;
    assert_eq!(res.status(), HttpStatusCode::UNAUTHORIZED);

    let res = c.get(app.url("/admin/categories")).header(routes::API_KEY_HEADER, "s3cret").send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    // the key is never taken from the URI
    let res = c.get(app.url("/admin/categories?api_key=s3cret")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::UNAUTHORIZED);

    // health stays public
    let res = c.get(app.url("/health")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn e2e_process_text_extracts_and_saves() -> anyhow::Result<()> {
    let app = start_server(None).await?;
    let c = client();

    let res = c.post(app.url("/admin/process-text")).json(&json!({"text": "Перукарня Оля на Шевченка 1"})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["draft"]["name"], "Перукарня Оля");
    assert!(body.get("service").is_none());

    let res = c
        .post(app.url("/admin/process-text"))
        .json(&json!({"text": "Перукарня Оля на Шевченка 1", "save": true}))
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["service"]["latitude"], json!(51.82));

    let res = c.post(app.url("/admin/process-text")).json(&json!({"text": "   "})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn e2e_openapi_document_served() -> anyhow::Result<()> {
    let app = start_server(None).await?;
    let res = client().get(app.url("/api-docs/openapi.json")).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let doc: Value = res.json().await?;
    assert!(doc["paths"].get("/admin/process-text").is_some());
    Ok(())
}
