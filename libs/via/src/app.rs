use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use axum::routing::MethodRouter;
use axum::Router;
use thiserror::Error;

use crate::contracts::{ConfigProvider, HostApplication, ModuleSource};
use crate::registry::RoutesModuleRegistry;
use crate::routers::join_url;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid route path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },
    #[error("endpoint '{endpoint}' is already bound to '{existing}', cannot bind it to '{path}'")]
    EndpointConflict {
        endpoint: String,
        existing: String,
        path: String,
    },
}

struct RouteEntry {
    path: String,
    endpoint: String,
    handler: MethodRouter,
}

/// axum-backed host application.
///
/// Routes are kept in a flat, ordered table until [`ViaApp::into_router`].
/// Registering a path twice keeps the later handler (shadowing); mounted
/// children are flattened under their prefix.
pub struct ViaApp {
    config: Arc<dyn ConfigProvider>,
    modules: Arc<RoutesModuleRegistry>,
    routes: Vec<RouteEntry>,
    endpoints: BTreeMap<String, String>,
}

impl fmt::Debug for ViaApp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViaApp")
            .field("routes", &self.routes().collect::<Vec<_>>())
            .field("endpoints", &self.endpoints)
            .field("modules", &self.modules)
            .finish()
    }
}

impl ViaApp {
    pub fn new(config: Arc<dyn ConfigProvider>, modules: Arc<RoutesModuleRegistry>) -> Self {
        Self {
            config,
            modules,
            routes: Vec::new(),
            endpoints: BTreeMap::new(),
        }
    }

    /// Empty application sharing this one's configuration and module registry.
    pub fn child(&self) -> Self {
        Self::new(self.config.clone(), self.modules.clone())
    }

    pub fn add_route(
        &mut self,
        path: impl Into<String>,
        endpoint: impl Into<String>,
        handler: MethodRouter,
    ) -> Result<(), AppError> {
        let path = path.into();
        let endpoint = endpoint.into();
        validate_path(&path)?;
        self.check_endpoint(&endpoint, &path)?;

        tracing::debug!(%path, %endpoint, "Route added");
        self.insert(path, endpoint, handler);
        Ok(())
    }

    /// Flatten `child` into this application under `prefix`.
    ///
    /// Either every child route is mounted or, on error, none is.
    pub fn mount(&mut self, prefix: &str, child: ViaApp) -> Result<(), AppError> {
        if !prefix.is_empty() {
            validate_path(prefix)?;
        }
        for entry in &child.routes {
            self.check_endpoint(&entry.endpoint, &join_url(prefix, &entry.path))?;
        }
        let count = child.routes.len();
        for entry in child.routes {
            self.insert(join_url(prefix, &entry.path), entry.endpoint, entry.handler);
        }
        tracing::debug!(%prefix, routes = count, "Child application mounted");
        Ok(())
    }

    /// Path registered for `endpoint`.
    pub fn url_for(&self, endpoint: &str) -> Option<&str> {
        self.endpoints.get(endpoint).map(String::as_str)
    }

    /// `(endpoint, path)` pairs, sorted by endpoint.
    pub fn endpoints(&self) -> impl Iterator<Item = (&str, &str)> {
        self.endpoints
            .iter()
            .map(|(e, p)| (e.as_str(), p.as_str()))
    }

    /// Registered paths in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|r| r.path.as_str())
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn into_router(self) -> Router {
        self.routes
            .into_iter()
            .fold(Router::new(), |router, entry| {
                router.route(&entry.path, entry.handler)
            })
    }

    fn check_endpoint(&self, endpoint: &str, path: &str) -> Result<(), AppError> {
        match self.endpoints.get(endpoint) {
            Some(existing) if route_shape(existing) != route_shape(path) => {
                Err(AppError::EndpointConflict {
                    endpoint: endpoint.to_string(),
                    existing: existing.clone(),
                    path: path.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Paths that differ only in capture names match the same requests, so the
    /// later one replaces the earlier entry and takes over its position.
    fn insert(&mut self, path: String, endpoint: String, handler: MethodRouter) {
        let shape = route_shape(&path);
        self.endpoints.insert(endpoint.clone(), path.clone());
        match self.routes.iter_mut().find(|r| route_shape(&r.path) == shape) {
            Some(existing) => {
                tracing::debug!(
                    %path,
                    previous = %existing.endpoint,
                    current = %endpoint,
                    "Route shadowed by later registration"
                );
                if existing.endpoint != endpoint {
                    self.endpoints.remove(&existing.endpoint);
                }
                existing.path = path;
                existing.endpoint = endpoint;
                existing.handler = handler;
            }
            None => self.routes.push(RouteEntry {
                path,
                endpoint,
                handler,
            }),
        }
    }
}

impl HostApplication for ViaApp {
    fn config(&self) -> &dyn ConfigProvider {
        self.config.as_ref()
    }
}

impl ModuleSource for ViaApp {
    fn routes_modules(&self) -> &RoutesModuleRegistry {
        &self.modules
    }
}

/// `path` with every capture name erased: `/users/{id}` becomes `/users/{}`.
fn route_shape(path: &str) -> String {
    path.split('/')
        .map(|seg| match seg.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(capture) if capture.starts_with('*') => "{*}",
            Some(_) => "{}",
            None => seg,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn validate_path(path: &str) -> Result<(), AppError> {
    let reason = if !path.starts_with('/') {
        Some("path must start with '/'")
    } else if path
        .split('/')
        .any(|seg| seg.starts_with(':') || seg.starts_with('*'))
    {
        Some("use '{param}' / '{*wildcard}' captures instead of ':param' / '*wildcard'")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(AppError::InvalidPath {
            path: path.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
