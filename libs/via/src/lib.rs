//! # Via - automatic route registration
//!
//! Resolves a named route collection from a *routes module* and registers each
//! route descriptor with the host application.
//!
//! ## Features
//!
//! - **Declarative**: declare routes modules with [`routes_module!`]
//! - **Auto-discovery**: declarations are collected via inventory
//! - **Config driven**: the module path defaults to `VIA_ROUTES_MODULE`
//! - **Composable**: [`routers::Include`] and [`routers::Blueprint`] nest modules
//!
//! ## Example
//!
//! ```rust,ignore
//! use axum::routing::get;
//! use via::routers::{Basic, Include};
//! use via::{RouteCollection, RoutesModule, ViaApp};
//!
//! fn load() -> anyhow::Result<RoutesModule> {
//!     let routes = RouteCollection::<ViaApp>::new()
//!         .route(Basic::new("/", get(|| async { "Hello" })).endpoint("index"))
//!         .route(Include::new("site.api").url_prefix("/api"));
//!     Ok(RoutesModule::new("site.routes").bind("routes", routes))
//! }
//! via::routes_module!("site.routes", load);
//!
//! let modules = Arc::new(RoutesModuleRegistry::discover()?);
//! let mut app = ViaApp::new(config, modules.clone());
//! Via::new(modules).init_app(&mut app)?;
//! let router = app.into_router();
//! ```

// Re-export inventory for the declaration macro
pub use inventory;

pub mod app;
pub mod contracts;
pub mod error;
pub mod loader;
pub mod registry;
pub mod routers;

pub use app::{AppError, ViaApp};
pub use contracts::{
    ConfigProvider, HostApplication, ModuleSource, RouteCollection, RouteDescriptor,
    RouteOptions,
};
pub use error::{ErrorKind, ViaError};
pub use loader::{RouteLoader, Via, DEFAULT_ROUTES_NAME, ROUTES_MODULE_KEY};
pub use registry::{
    Binding, RegistryBuilder, RegistryError, RoutesModule, RoutesModuleDecl,
    RoutesModuleRegistry,
};
