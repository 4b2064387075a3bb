use std::cell::RefCell;
use std::sync::Arc;

use tracing::{debug, info};

use crate::contracts::{HostApplication, RouteCollection, RouteOptions};
use crate::error::ViaError;
use crate::registry::{module_path_problem, Binding, RoutesModuleRegistry};

/// Configuration key consulted when no module path is passed explicitly.
pub const ROUTES_MODULE_KEY: &str = "VIA_ROUTES_MODULE";

/// Binding name looked up when the caller does not pick one.
pub const DEFAULT_ROUTES_NAME: &str = "routes";

/// Resolves route collections from routes modules and drives their registration.
#[derive(Debug, Clone)]
pub struct RouteLoader {
    modules: Arc<RoutesModuleRegistry>,
}

impl RouteLoader {
    pub fn new(modules: Arc<RoutesModuleRegistry>) -> Self {
        Self { modules }
    }

    pub fn modules(&self) -> &Arc<RoutesModuleRegistry> {
        &self.modules
    }

    /// Load the module at `module_path` and return its `attribute_name` binding as is.
    ///
    /// The module factory runs on every call; nothing is cached.
    pub fn resolve(&self, module_path: &str, attribute_name: &str) -> Result<Binding, ViaError> {
        resolve_in(&self.modules, module_path, attribute_name)
    }

    /// Check that a resolved binding holds route descriptors for `A`.
    pub fn collection<'b, A: 'static>(
        module_path: &str,
        attribute_name: &str,
        binding: &'b Binding,
    ) -> Result<&'b RouteCollection<A>, ViaError> {
        binding
            .downcast_ref::<RouteCollection<A>>()
            .ok_or_else(|| ViaError::NotARouteCollection {
                module: module_path.to_string(),
                attribute: attribute_name.to_string(),
                expected: std::any::type_name::<A>(),
            })
    }

    /// Register every descriptor in order; stops at the first failure.
    pub fn register<A>(
        &self,
        app: &mut A,
        routes: &RouteCollection<A>,
        options: &RouteOptions,
    ) -> Result<(), ViaError> {
        register_all(app, routes, options)
    }
}

pub(crate) fn resolve_in(
    modules: &RoutesModuleRegistry,
    module_path: &str,
    attribute_name: &str,
) -> Result<Binding, ViaError> {
    if let Some(reason) = module_path_problem(module_path) {
        return Err(ViaError::InvalidModulePath {
            path: module_path.to_string(),
            reason,
        });
    }

    let load = modules
        .get(module_path)
        .ok_or_else(|| ViaError::ModuleNotFound {
            path: module_path.to_string(),
        })?;

    let module = load().map_err(|source| ViaError::ModuleLoad {
        path: module_path.to_string(),
        source,
    })?;

    module
        .binding(attribute_name)
        .ok_or_else(|| ViaError::AttributeNotFound {
            module: module_path.to_string(),
            attribute: attribute_name.to_string(),
        })
}

pub(crate) fn register_all<A>(
    app: &mut A,
    routes: &RouteCollection<A>,
    options: &RouteOptions,
) -> Result<(), ViaError> {
    for (index, route) in routes.iter().enumerate() {
        debug!(index, route = %route.describe(), "Registering route");
        route
            .register_with(app, options)
            .map_err(|source| ViaError::Registration {
                index,
                route: route.describe(),
                source,
            })?;
    }
    Ok(())
}

thread_local! {
    static LOADING: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Marks `module_path.attribute_name` as being registered on this thread
/// until dropped. Entering a binding that is already active is a cycle.
pub(crate) struct LoadGuard(());

impl LoadGuard {
    pub(crate) fn enter(module_path: &str, attribute_name: &str) -> Result<Self, ViaError> {
        let key = format!("{module_path}.{attribute_name}");
        LOADING.with(|active| {
            let mut active = active.borrow_mut();
            if let Some(start) = active.iter().position(|k| *k == key) {
                let mut chain = active[start..].to_vec();
                chain.push(key);
                return Err(ViaError::IncludeCycle {
                    chain: chain.join(" -> "),
                });
            }
            active.push(key);
            Ok(LoadGuard(()))
        })
    }
}

impl Drop for LoadGuard {
    fn drop(&mut self) {
        LOADING.with(|active| {
            active.borrow_mut().pop();
        });
    }
}

/// Resolve `module_path.attribute_name` and register it against `app`.
pub(crate) fn load_into<A: 'static>(
    modules: &RoutesModuleRegistry,
    app: &mut A,
    module_path: &str,
    attribute_name: &str,
    options: &RouteOptions,
) -> Result<usize, ViaError> {
    let _guard = LoadGuard::enter(module_path, attribute_name)?;
    let binding = resolve_in(modules, module_path, attribute_name)?;
    let routes = RouteLoader::collection::<A>(module_path, attribute_name, &binding)?;
    register_all(app, routes, options)?;
    Ok(routes.len())
}

/// Entry point: picks the routes module (argument or configuration) and registers it.
///
/// ```rust,ignore
/// let via = Via::new(Arc::new(RoutesModuleRegistry::discover()?));
/// via.init_app(&mut app)?;
/// ```
#[derive(Debug, Clone)]
pub struct Via {
    loader: RouteLoader,
}

impl Via {
    pub fn new(modules: Arc<RoutesModuleRegistry>) -> Self {
        Self {
            loader: RouteLoader::new(modules),
        }
    }

    pub fn loader(&self) -> &RouteLoader {
        &self.loader
    }

    /// `initialize` with the configured module, the `routes` binding and no options.
    pub fn init_app<A>(&self, app: &mut A) -> Result<(), ViaError>
    where
        A: HostApplication + 'static,
    {
        self.initialize(app, None, DEFAULT_ROUTES_NAME, &RouteOptions::default())
    }

    /// Resolve the routes module and register its `attribute_name` collection.
    ///
    /// An absent or empty `module_path` falls back to [`ROUTES_MODULE_KEY`] in
    /// the application configuration. Every call re-resolves and re-registers.
    pub fn initialize<A>(
        &self,
        app: &mut A,
        module_path: Option<&str>,
        attribute_name: &str,
        options: &RouteOptions,
    ) -> Result<(), ViaError>
    where
        A: HostApplication + 'static,
    {
        let module_path = match module_path.filter(|p| !p.is_empty()) {
            Some(path) => path.to_string(),
            None => configured_routes_module(app)?,
        };

        let count = load_into(
            &self.loader.modules,
            app,
            &module_path,
            attribute_name,
            options,
        )?;

        info!(
            module = %module_path,
            attribute = attribute_name,
            routes = count,
            "Routes registered"
        );
        Ok(())
    }
}

fn configured_routes_module<A: HostApplication>(app: &A) -> Result<String, ViaError> {
    match app.config().get_config_raw(ROUTES_MODULE_KEY) {
        None | Some(serde_json::Value::Null) => Err(ViaError::RoutesModuleNotConfigured),
        Some(serde_json::Value::String(s)) if s.is_empty() => {
            Err(ViaError::RoutesModuleNotConfigured)
        }
        Some(serde_json::Value::String(s)) => Ok(s),
        Some(other) => Err(ViaError::InvalidRoutesModuleSetting {
            key: ROUTES_MODULE_KEY,
            found: other.to_string(),
        }),
    }
}
