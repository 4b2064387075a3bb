//! Routes modules served by `via-server`.
//!
//! `via_server.routes` is the root module referenced by the shipped
//! configuration; it pulls in the API with `Include` and the admin pages with
//! `Blueprint`.

use axum::routing::get;
use via::routers::{Basic, Blueprint, Include};
use via::{RouteCollection, RoutesModule, ViaApp};

mod admin;
mod api;

async fn index() -> &'static str {
    "Via Server"
}

async fn healthz() -> &'static str {
    "ok"
}

fn load() -> anyhow::Result<RoutesModule> {
    let routes = RouteCollection::<ViaApp>::new()
        .route(Basic::new("/", get(index)).endpoint("index"))
        .route(Basic::new("/healthz", get(healthz)).endpoint("healthz"))
        .route(
            Include::new("via_server.api")
                .url_prefix("/api")
                .endpoint("api"),
        )
        .route(Blueprint::new("admin", "via_server.admin"));
    Ok(RoutesModule::new("via_server.routes").bind("routes", routes))
}
via::routes_module!("via_server.routes", load);
