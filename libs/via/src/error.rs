use thiserror::Error;

/// Coarse classification of [`ViaError`], stable across variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No usable routes module path could be determined.
    Configuration,
    /// The routes module could not be located or loaded.
    ModuleResolution,
    /// The module loaded but has no binding with the requested name.
    AttributeResolution,
    /// The binding does not hold route descriptors for this application.
    Capability,
    /// A route descriptor failed while registering itself.
    Registration,
}

/// Errors surfaced by route resolution and registration.
///
/// Nothing is recovered internally: every variant is meant to abort
/// application start-up.
#[derive(Debug, Error)]
pub enum ViaError {
    #[error("route module is not defined in application configuration")]
    RoutesModuleNotConfigured,

    #[error("configuration key '{key}' must hold a dotted module path, found {found}")]
    InvalidRoutesModuleSetting { key: &'static str, found: String },

    #[error("invalid module path '{path}': {reason}")]
    InvalidModulePath { path: String, reason: &'static str },

    #[error("no module named '{path}'")]
    ModuleNotFound { path: String },

    #[error("failed to load routes module '{path}'")]
    ModuleLoad {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("routes module include cycle: {chain}")]
    IncludeCycle { chain: String },

    #[error("module '{module}' has no attribute '{attribute}'")]
    AttributeNotFound { module: String, attribute: String },

    #[error("'{module}.{attribute}' is not a route collection for {expected}")]
    NotARouteCollection {
        module: String,
        attribute: String,
        expected: &'static str,
    },

    #[error("route #{index} ({route}) failed to register")]
    Registration {
        index: usize,
        route: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ViaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ViaError::RoutesModuleNotConfigured | ViaError::InvalidRoutesModuleSetting { .. } => {
                ErrorKind::Configuration
            }
            ViaError::InvalidModulePath { .. }
            | ViaError::ModuleNotFound { .. }
            | ViaError::ModuleLoad { .. }
            | ViaError::IncludeCycle { .. } => ErrorKind::ModuleResolution,
            ViaError::AttributeNotFound { .. } => ErrorKind::AttributeResolution,
            ViaError::NotARouteCollection { .. } => ErrorKind::Capability,
            ViaError::Registration { .. } => ErrorKind::Registration,
        }
    }
}
