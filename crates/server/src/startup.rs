use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use configs::AppConfig;
use integrations::{Assistant, Geocoder, GoogleGeocoder, OpenAiAssistant};

use crate::routes::{self, ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

/// Optional external clients; a missing key disables the feature instead of failing startup.
fn build_state(cfg: &AppConfig, db: sea_orm::DatabaseConnection) -> ServerState {
    let geocoder: Option<Arc<dyn Geocoder>> = match GoogleGeocoder::new(&cfg.geocoding) {
        Ok(g) => Some(Arc::new(g)),
        Err(e) => {
            warn!(service = "admin", error = %e, "geocoding disabled; services are stored without coordinates");
            None
        }
    };
    let assistant: Option<Arc<dyn Assistant>> = match OpenAiAssistant::new(&cfg.openai) {
        Ok(a) => Some(Arc::new(a)),
        Err(e) => {
            warn!(service = "admin", error = %e, "AI text processing disabled");
            None
        }
    };
    if cfg.admin.api_key.is_none() {
        warn!(service = "admin", "admin.api_key is not set; /admin routes are open");
    }
    ServerState { db, geocoder, assistant, admin_api_key: cfg.admin.api_key.clone() }
}

/// Public entry: build the app and run the HTTP server
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    // DB connection + schema
    let db = models::db::connect_with_config(&cfg.database).await?;
    migration::Migrator::up(&db, None).await?;

    let state = build_state(&cfg, db);
    let app: Router = routes::build_router(state, build_cors());

    let addr = bind_addr(&cfg)?;
    info!(service = "admin", %addr, "starting admin api");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
