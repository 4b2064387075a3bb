use crate::app::ViaApp;
use crate::contracts::{ModuleSource, RouteDescriptor, RouteOptions};
use crate::loader::{load_into, DEFAULT_ROUTES_NAME};
use crate::routers::{join_endpoint, join_url};

/// A named group of routes loaded from another module and mounted under a prefix.
///
/// Routes inside the group are registered against a child [`ViaApp`] with the
/// endpoint namespace `<name>`; the child is then mounted at
/// `url_prefix` (default `/<name>`), itself appended to the caller's prefix.
#[derive(Debug, Clone)]
pub struct Blueprint {
    name: String,
    module_path: String,
    routes_name: String,
    url_prefix: Option<String>,
}

impl Blueprint {
    pub fn new(name: impl Into<String>, module_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module_path: module_path.into(),
            routes_name: DEFAULT_ROUTES_NAME.to_string(),
            url_prefix: None,
        }
    }

    pub fn routes_name(mut self, name: impl Into<String>) -> Self {
        self.routes_name = name.into();
        self
    }

    pub fn url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = Some(prefix.into());
        self
    }

    fn mount_point(&self, options: &RouteOptions) -> String {
        let own = match &self.url_prefix {
            Some(prefix) => prefix.clone(),
            None => format!("/{}", self.name),
        };
        join_url(options.url_prefix(), &own)
    }
}

impl RouteDescriptor<ViaApp> for Blueprint {
    fn register_with(&self, app: &mut ViaApp, options: &RouteOptions) -> anyhow::Result<()> {
        let mut inner = options.clone();
        inner.remove(RouteOptions::URL_PREFIX);
        inner.set(
            RouteOptions::ENDPOINT,
            join_endpoint(options.endpoint(), &self.name),
        );

        let mut child = app.child();
        load_into(
            app.routes_modules(),
            &mut child,
            &self.module_path,
            &self.routes_name,
            &inner,
        )?;

        app.mount(&self.mount_point(options), child)?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("Blueprint({} <- {})", self.name, self.module_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::RouteCollection;
    use crate::registry::{RoutesModule, RoutesModuleRegistry};
    use crate::routers::Basic;
    use axum::routing::get;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn admin() -> anyhow::Result<RoutesModule> {
        Ok(RoutesModule::new("bp.admin").bind(
            "routes",
            RouteCollection::<ViaApp>::new()
                .route(Basic::new("/x", get(|| async { "x" })).endpoint("x")),
        ))
    }

    fn app() -> ViaApp {
        let mut b = RoutesModuleRegistry::builder();
        b.register("bp.admin", admin);
        ViaApp::new(
            Arc::new(HashMap::<String, serde_json::Value>::new()),
            Arc::new(b.build().unwrap()),
        )
    }

    #[test]
    fn nests_under_parent_prefix_and_endpoint() {
        let mut app = app();
        let parent = RouteOptions::new()
            .with(RouteOptions::URL_PREFIX, "/m")
            .with(RouteOptions::ENDPOINT, "p");
        Blueprint::new("admin", "bp.admin")
            .register_with(&mut app, &parent)
            .unwrap();
        assert_eq!(app.url_for("p.admin.x"), Some("/m/admin/x"));
        assert_eq!(app.routes().collect::<Vec<_>>(), vec!["/m/admin/x"]);
    }

    #[test]
    fn mounts_at_own_name_by_default() {
        let mut app = app();
        Blueprint::new("admin", "bp.admin")
            .register_with(&mut app, &RouteOptions::new())
            .unwrap();
        assert_eq!(app.url_for("admin.x"), Some("/admin/x"));
    }

    #[test]
    fn empty_or_root_prefix_merges_at_root() {
        for prefix in ["", "/"] {
            let mut app = app();
            Blueprint::new("admin", "bp.admin")
                .url_prefix(prefix)
                .register_with(&mut app, &RouteOptions::new())
                .unwrap();
            assert_eq!(app.url_for("admin.x"), Some("/x"), "prefix {prefix:?}");
        }
    }

    #[test]
    fn missing_module_registers_nothing() {
        let mut app = app();
        let err = Blueprint::new("gone", "bp.gone")
            .register_with(&mut app, &RouteOptions::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "no module named 'bp.gone'");
        assert_eq!(app.route_count(), 0);
    }
}
