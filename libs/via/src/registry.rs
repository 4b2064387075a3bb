// via/src/registry.rs
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// A type-erased value bound to a name inside a routes module.
pub type Binding = Arc<dyn Any + Send + Sync>;

/// Factory producing a fresh routes module object.
pub type LoadFn = fn() -> anyhow::Result<RoutesModule>;

/// A loaded routes module: a dotted path plus its named bindings.
pub struct RoutesModule {
    path: String,
    bindings: HashMap<String, Binding>,
}

impl RoutesModule {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            bindings: HashMap::new(),
        }
    }

    /// Bind `value` under `name`, replacing any previous binding.
    pub fn bind<T>(mut self, name: impl Into<String>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.bindings.insert(name.into(), Arc::new(value));
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn binding(&self, name: &str) -> Option<Binding> {
        self.bindings.get(name).cloned()
    }

    pub fn binding_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.bindings.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for RoutesModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutesModule")
            .field("path", &self.path)
            .field("bindings", &self.binding_names())
            .finish()
    }
}

/// Compile-time declaration of a routes module, collected via `inventory`.
pub struct RoutesModuleDecl {
    pub path: &'static str,
    pub load: LoadFn,
}

impl RoutesModuleDecl {
    pub const fn new(path: &'static str, load: LoadFn) -> Self {
        Self { path, load }
    }
}

inventory::collect!(RoutesModuleDecl);

/// Declare a routes module so [`RoutesModuleRegistry::discover`] can find it.
///
/// ```rust,ignore
/// fn load() -> anyhow::Result<via::RoutesModule> {
///     Ok(via::RoutesModule::new("site.routes").bind("routes", routes()))
/// }
/// via::routes_module!("site.routes", load);
/// ```
#[macro_export]
macro_rules! routes_module {
    ($path:expr, $load:path) => {
        $crate::inventory::submit! {
            $crate::registry::RoutesModuleDecl::new($path, $load)
        }
    };
}

/// Why a dotted path is rejected, or `None` when it is well formed.
pub(crate) fn module_path_problem(path: &str) -> Option<&'static str> {
    if path.is_empty() {
        return Some("empty module path");
    }
    for segment in path.split('.') {
        let mut chars = segment.chars();
        match chars.next() {
            None => return Some("empty path segment"),
            Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
            Some(_) => return Some("segment must start with a letter or underscore"),
        }
        if !chars.all(|c| c == '_' || c.is_ascii_alphanumeric()) {
            return Some("segment contains characters other than letters, digits or underscore");
        }
    }
    None
}

/// Immutable lookup table from dotted paths to routes module factories.
#[derive(Default)]
pub struct RoutesModuleRegistry {
    modules: BTreeMap<&'static str, LoadFn>,
}

impl fmt::Debug for RoutesModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutesModuleRegistry")
            .field("modules", &self.paths())
            .finish()
    }
}

impl RoutesModuleRegistry {
    /// Discover via inventory, feed every declaration to a builder, then build.
    pub fn discover() -> Result<Self, RegistryError> {
        let mut b = RegistryBuilder::default();
        for decl in ::inventory::iter::<RoutesModuleDecl> {
            b.register(decl.path, decl.load);
        }
        b.build()
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn get(&self, path: &str) -> Option<LoadFn> {
        self.modules.get(path).copied()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.modules.contains_key(path)
    }

    /// Registered paths in sorted order.
    pub fn paths(&self) -> Vec<&'static str> {
        self.modules.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Collects declarations; problems are reported together at build time.
#[derive(Default)]
pub struct RegistryBuilder {
    modules: BTreeMap<&'static str, LoadFn>,
    errors: Vec<String>,
}

impl RegistryBuilder {
    pub fn register(&mut self, path: &'static str, load: LoadFn) -> &mut Self {
        if let Some(reason) = module_path_problem(path) {
            self.errors
                .push(format!("Routes module path '{path}' is invalid: {reason}"));
            return self;
        }
        if self.modules.contains_key(path) {
            self.errors
                .push(format!("Routes module '{path}' is already registered"));
            return self;
        }
        self.modules.insert(path, load);
        self
    }

    pub fn build(self) -> Result<RoutesModuleRegistry, RegistryError> {
        if !self.errors.is_empty() {
            return Err(RegistryError::InvalidRegistryConfiguration {
                errors: self.errors,
            });
        }

        tracing::debug!(
            modules = ?self.modules.keys().collect::<Vec<_>>(),
            "Routes module registry built"
        );

        Ok(RoutesModuleRegistry {
            modules: self.modules,
        })
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid routes module registry:\n{errors:#?}")]
    InvalidRegistryConfiguration { errors: Vec<String> },
}
