use axum::routing::MethodRouter;

use crate::app::ViaApp;
use crate::contracts::{RouteDescriptor, RouteOptions};
use crate::routers::{join_endpoint, join_url};

/// One path bound to an axum [`MethodRouter`].
///
/// The endpoint name defaults to the path and is namespaced by the `endpoint`
/// option; the path is prefixed by the `url_prefix` option.
#[derive(Clone)]
pub struct Basic {
    path: String,
    endpoint: Option<String>,
    handler: MethodRouter,
}

impl Basic {
    pub fn new(path: impl Into<String>, handler: MethodRouter) -> Self {
        Self {
            path: path.into(),
            endpoint: None,
            handler,
        }
    }

    pub fn endpoint(mut self, name: impl Into<String>) -> Self {
        self.endpoint = Some(name.into());
        self
    }
}

impl RouteDescriptor<ViaApp> for Basic {
    fn register_with(&self, app: &mut ViaApp, options: &RouteOptions) -> anyhow::Result<()> {
        let path = join_url(options.url_prefix(), &self.path);
        let own = self.endpoint.as_deref().unwrap_or(&self.path);
        let endpoint = join_endpoint(options.endpoint(), own);
        app.add_route(path, endpoint, self.handler.clone())?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("Basic({})", self.path)
    }
}
