use std::sync::OnceLock;
use std::time::Instant;

use axum::routing::get;
use axum::Json;
use serde_json::json;
use via::routers::Basic;
use via::{RouteCollection, RoutesModule, ViaApp};

static STARTED: OnceLock<Instant> = OnceLock::new();

async fn dashboard() -> &'static str {
    "Via admin"
}

async fn status() -> Json<serde_json::Value> {
    let uptime = STARTED.get_or_init(Instant::now).elapsed();
    Json(json!({ "status": "up", "uptime_secs": uptime.as_secs() }))
}

fn load() -> anyhow::Result<RoutesModule> {
    STARTED.get_or_init(Instant::now);
    let routes = RouteCollection::<ViaApp>::new()
        .route(Basic::new("/", get(dashboard)).endpoint("dashboard"))
        .route(Basic::new("/status", get(status)).endpoint("status"));
    Ok(RoutesModule::new("via_server.admin").bind("routes", routes))
}
via::routes_module!("via_server.admin", load);
