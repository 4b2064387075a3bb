use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::registry::RoutesModuleRegistry;

/// Read-only view over the host application's configuration.
pub trait ConfigProvider: Send + Sync {
    /// Get a specific config value by key
    fn get_config_raw(&self, key: &str) -> Option<serde_json::Value>;
}

impl ConfigProvider for HashMap<String, serde_json::Value> {
    fn get_config_raw(&self, key: &str) -> Option<serde_json::Value> {
        self.get(key).cloned()
    }
}

impl ConfigProvider for serde_json::Map<String, serde_json::Value> {
    fn get_config_raw(&self, key: &str) -> Option<serde_json::Value> {
        self.get(key).cloned()
    }
}

/// The application routes are registered against.
///
/// Beyond configuration lookup the application is opaque to the loader; it is
/// only handed through to each [`RouteDescriptor`].
pub trait HostApplication {
    fn config(&self) -> &dyn ConfigProvider;
}

/// Hosts that can resolve further routes modules while registering
/// (needed by [`crate::routers::Include`]).
pub trait ModuleSource {
    fn routes_modules(&self) -> &RoutesModuleRegistry;
}

/// One routing rule that knows how to register itself with an application.
pub trait RouteDescriptor<A>: Send + Sync {
    /// Register with `app`. `options` are the caller's pass-through parameters.
    fn register_with(&self, app: &mut A, options: &RouteOptions) -> anyhow::Result<()>;

    /// Human readable label used in logs and errors.
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

/// Ordered sequence of route descriptors. Order is registration order.
pub struct RouteCollection<A> {
    routes: Vec<Arc<dyn RouteDescriptor<A>>>,
}

impl<A> RouteCollection<A> {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Builder-style append.
    pub fn route<R>(mut self, route: R) -> Self
    where
        R: RouteDescriptor<A> + 'static,
    {
        self.routes.push(Arc::new(route));
        self
    }

    pub fn push(&mut self, route: Arc<dyn RouteDescriptor<A>>) {
        self.routes.push(route);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn RouteDescriptor<A>>> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<A> Default for RouteCollection<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Clone for RouteCollection<A> {
    fn clone(&self) -> Self {
        Self {
            routes: self.routes.clone(),
        }
    }
}

impl<A> FromIterator<Arc<dyn RouteDescriptor<A>>> for RouteCollection<A> {
    fn from_iter<I: IntoIterator<Item = Arc<dyn RouteDescriptor<A>>>>(iter: I) -> Self {
        Self {
            routes: iter.into_iter().collect(),
        }
    }
}

impl<A> fmt::Debug for RouteCollection<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.routes.iter().map(|r| r.describe()))
            .finish()
    }
}

/// Pass-through keyword parameters handed to every descriptor.
///
/// `url_prefix` and `endpoint` are interpreted by the stock routers; any other
/// key is forwarded untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteOptions(BTreeMap<String, serde_json::Value>);

impl RouteOptions {
    pub const URL_PREFIX: &'static str = "url_prefix";
    pub const ENDPOINT: &'static str = "endpoint";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }

    /// Prefix prepended to every registered path; empty when unset.
    pub fn url_prefix(&self) -> &str {
        self.get_str(Self::URL_PREFIX).unwrap_or("")
    }

    /// Dotted endpoint namespace, if any.
    pub fn endpoint(&self) -> Option<&str> {
        self.get_str(Self::ENDPOINT).filter(|s| !s.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
