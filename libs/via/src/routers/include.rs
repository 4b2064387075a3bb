use crate::contracts::{ModuleSource, RouteDescriptor, RouteOptions};
use crate::loader::{register_all, resolve_in, LoadGuard, RouteLoader, DEFAULT_ROUTES_NAME};
use crate::routers::{join_endpoint, join_url};

/// Registers the route collection of another routes module in place.
///
/// Its own `url_prefix` and `endpoint` are appended to whatever the caller
/// passed; every other option is forwarded as is.
#[derive(Debug, Clone)]
pub struct Include {
    module_path: String,
    routes_name: String,
    url_prefix: Option<String>,
    endpoint: Option<String>,
}

impl Include {
    pub fn new(module_path: impl Into<String>) -> Self {
        Self {
            module_path: module_path.into(),
            routes_name: DEFAULT_ROUTES_NAME.to_string(),
            url_prefix: None,
            endpoint: None,
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

    pub fn endpoint(mut self, name: impl Into<String>) -> Self {
        self.endpoint = Some(name.into());
        self
    }

    fn nested_options(&self, options: &RouteOptions) -> RouteOptions {
        let mut nested = options.clone();
        if let Some(prefix) = &self.url_prefix {
            nested.set(
                RouteOptions::URL_PREFIX,
                join_url(options.url_prefix(), prefix),
            );
        }
        if let Some(endpoint) = &self.endpoint {
            nested.set(
                RouteOptions::ENDPOINT,
                join_endpoint(options.endpoint(), endpoint),
            );
        }
        nested
    }
}

impl<A> RouteDescriptor<A> for Include
where
    A: ModuleSource + 'static,
{
    fn register_with(&self, app: &mut A, options: &RouteOptions) -> anyhow::Result<()> {
        let _guard = LoadGuard::enter(&self.module_path, &self.routes_name)?;
        let binding = resolve_in(app.routes_modules(), &self.module_path, &self.routes_name)?;
        let routes = RouteLoader::collection::<A>(&self.module_path, &self.routes_name, &binding)?;
        register_all(app, routes, &self.nested_options(options))?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("Include({}.{})", self.module_path, self.routes_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::RouteCollection;
    use crate::error::ViaError;
    use crate::registry::{RoutesModule, RoutesModuleRegistry};

    struct Host {
        modules: RoutesModuleRegistry,
        seen: Vec<(String, String, Option<String>)>,
    }

    impl ModuleSource for Host {
        fn routes_modules(&self) -> &RoutesModuleRegistry {
            &self.modules
        }
    }

    struct Leaf(&'static str);
    impl RouteDescriptor<Host> for Leaf {
        fn register_with(&self, app: &mut Host, options: &RouteOptions) -> anyhow::Result<()> {
            app.seen.push((
                self.0.to_string(),
                options.url_prefix().to_string(),
                options.endpoint().map(str::to_string),
            ));
            Ok(())
        }
    }

    fn inner() -> anyhow::Result<RoutesModule> {
        Ok(RoutesModule::new("app.inner")
            .bind("routes", RouteCollection::<Host>::new().route(Leaf("a")))
            .bind("extra", RouteCollection::<Host>::new().route(Leaf("x"))))
    }

    fn self_including() -> anyhow::Result<RoutesModule> {
        Ok(RoutesModule::new("app.loop").bind(
            "routes",
            RouteCollection::<Host>::new()
                .route(Leaf("before"))
                .route(Include::new("app.loop")),
        ))
    }

    fn ping() -> anyhow::Result<RoutesModule> {
        Ok(RoutesModule::new("app.ping")
            .bind("routes", RouteCollection::<Host>::new().route(Include::new("app.pong"))))
    }

    fn pong() -> anyhow::Result<RoutesModule> {
        Ok(RoutesModule::new("app.pong")
            .bind("routes", RouteCollection::<Host>::new().route(Include::new("app.ping"))))
    }

    fn cycle_of(err: &anyhow::Error) -> Option<String> {
        err.chain().find_map(|e| match e.downcast_ref::<ViaError>() {
            Some(ViaError::IncludeCycle { chain }) => Some(chain.clone()),
            _ => None,
        })
    }

    fn host() -> Host {
        let mut b = RoutesModuleRegistry::builder();
        b.register("app.inner", inner)
            .register("app.loop", self_including)
            .register("app.ping", ping)
            .register("app.pong", pong);
        Host {
            modules: b.build().unwrap(),
            seen: Vec::new(),
        }
    }

    #[test]
    fn composes_prefix_and_endpoint_with_parent_options() {
        let mut host = host();
        let parent = RouteOptions::new()
            .with(RouteOptions::URL_PREFIX, "/api")
            .with(RouteOptions::ENDPOINT, "api");
        Include::new("app.inner")
            .url_prefix("/v1")
            .endpoint("v1")
            .register_with(&mut host, &parent)
            .unwrap();
        assert_eq!(
            host.seen,
            vec![(
                "a".to_string(),
                "/api/v1".to_string(),
                Some("api.v1".to_string())
            )]
        );
    }

    #[test]
    fn forwards_options_untouched_without_own_settings() {
        let mut host = host();
        Include::new("app.inner")
            .routes_name("extra")
            .register_with(&mut host, &RouteOptions::new())
            .unwrap();
        assert_eq!(host.seen, vec![("x".to_string(), String::new(), None)]);
    }

    #[test]
    fn missing_module_fails_registration() {
        let mut host = host();
        let err = Include::new("app.gone")
            .register_with(&mut host, &RouteOptions::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "no module named 'app.gone'");
    }

    #[test]
    fn self_include_is_reported_as_cycle() {
        let mut host = host();
        let err = Include::new("app.loop")
            .register_with(&mut host, &RouteOptions::new())
            .unwrap_err();
        assert_eq!(
            cycle_of(&err).as_deref(),
            Some("app.loop.routes -> app.loop.routes")
        );
        assert_eq!(host.seen.len(), 1);
    }

    #[test]
    fn indirect_cycle_names_every_module() {
        let mut host = host();
        let err = Include::new("app.ping")
            .register_with(&mut host, &RouteOptions::new())
            .unwrap_err();
        assert_eq!(
            cycle_of(&err).as_deref(),
            Some("app.ping.routes -> app.pong.routes -> app.ping.routes")
        );

        // The failed attempt leaves nothing marked as loading.
        Include::new("app.inner")
            .register_with(&mut host, &RouteOptions::new())
            .unwrap();
        Include::new("app.inner")
            .register_with(&mut host, &RouteOptions::new())
            .unwrap();
        assert_eq!(host.seen.len(), 2);
    }
}
