use axum::extract::Path;
use axum::routing::get;
use axum::Json;
use serde_json::json;
use via::routers::Basic;
use via::{RouteCollection, RoutesModule, ViaApp};

async fn info() -> Json<serde_json::Value> {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[tracing::instrument(name = "api.hello", skip_all)]
async fn hello(Path(name): Path<String>) -> String {
    tracing::debug!(%name, "Greeting");
    format!("Hello, {name}!")
}

fn load() -> anyhow::Result<RoutesModule> {
    let routes = RouteCollection::<ViaApp>::new()
        .route(Basic::new("/info", get(info)).endpoint("info"))
        .route(Basic::new("/hello/{name}", get(hello)).endpoint("hello"));
    Ok(RoutesModule::new("via_server.api").bind("routes", routes))
}
via::routes_module!("via_server.api", load);
