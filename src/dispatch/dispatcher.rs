//! Route selection and handler invocation.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::dispatch::error::DispatchError;
use crate::dispatch::handler::{Context, Reply};
use crate::dispatch::registry::{qualify, HandlerRegistry};
use crate::routing::{Params, RouteMatch, RouteTable, UrlBuilder};

/// Nesting limit for handlers dispatching other paths.
pub const MAX_SUBREQUEST_DEPTH: usize = 8;

/// Request data that is not part of the route.
#[derive(Debug, Clone, Default)]
pub struct RequestInfo {
    pub request_id: Option<String>,
    /// Decoded query string pairs, in order.
    pub query: Vec<(String, String)>,
    /// 0 for a top-level request.
    pub depth: usize,
}

/// Selects routes and runs their handlers.
///
/// The route table sits behind an [`ArcSwap`] so a reload can replace it
/// while requests are in flight; each request keeps the snapshot it started
/// with.
pub struct Dispatcher {
    table: ArcSwap<RouteTable>,
    registry: HandlerRegistry,
    links: UrlBuilder,
}

impl Dispatcher {
    pub fn new(table: RouteTable, registry: HandlerRegistry) -> Self {
        Self {
            table: ArcSwap::from_pointee(table),
            registry,
            links: UrlBuilder::relative(),
        }
    }

    /// Use `links` to build absolute URLs.
    pub fn with_links(mut self, links: UrlBuilder) -> Self {
        self.links = links;
        self
    }

    /// The current route table snapshot.
    pub fn table(&self) -> Arc<RouteTable> {
        self.table.load_full()
    }

    /// Atomically replace the route table.
    pub fn replace_table(&self, table: RouteTable) {
        self.table.store(Arc::new(table));
    }

    pub fn links(&self) -> &UrlBuilder {
        &self.links
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Select the route for `path` and dispatch it.
    pub fn handle(&self, path: &str, request: RequestInfo) -> Result<Reply, DispatchError> {
        let table = self.table();
        let route = table.select(path)?;
        self.run(table, route, request)
    }

    pub fn dispatch(&self, route: RouteMatch, request: RequestInfo) -> Result<Reply, DispatchError> {
        self.run(self.table(), route, request)
    }

    /// Dispatch with `extra` layered over the route parameters for this call only.
    pub fn dispatch_with(
        &self,
        route: RouteMatch,
        extra: &Params,
        request: RequestInfo,
    ) -> Result<Reply, DispatchError> {
        self.dispatch(route.with_options(extra), request)
    }

    /// Dispatch `path` on behalf of another handler.
    pub fn subrequest(
        &self,
        path: &str,
        extra: &Params,
        request: RequestInfo,
    ) -> Result<Reply, DispatchError> {
        if request.depth > MAX_SUBREQUEST_DEPTH {
            return Err(DispatchError::SubrequestDepth(MAX_SUBREQUEST_DEPTH));
        }
        let table = self.table();
        let route = table.select(path)?.with_options(extra);
        tracing::debug!(path, depth = request.depth, "Subrequest");
        self.run(table, route, request)
    }

    fn run(
        &self,
        table: Arc<RouteTable>,
        route: RouteMatch,
        request: RequestInfo,
    ) -> Result<Reply, DispatchError> {
        if !route.is_allowed() {
            tracing::debug!(route = route.name().unwrap_or("-"), "Route condition declined");
            return Err(DispatchError::Declined {
                route: route.name().unwrap_or("-").to_string(),
            });
        }

        let controller = qualify(route.namespace(), route.controller());
        let resolved = self.registry.resolve(&controller, route.action())?;

        let span = tracing::debug_span!(
            "dispatch",
            route = route.name().unwrap_or("-"),
            controller = %resolved.target.controller,
            action = %resolved.target.action,
        );
        let _guard = span.enter();

        let mut ctx = Context::new(self, table, route, request);
        match resolved.handler.invoke(&mut ctx) {
            Ok(reply) => Ok(reply),
            Err(err) => {
                tracing::debug!(error = %err, "Handler failed, running its error hook");
                resolved
                    .handler
                    .catch_error(err, &mut ctx)
                    .map_err(|source| DispatchError::Handler {
                        controller: resolved.target.controller.clone(),
                        action: resolved.target.action.clone(),
                        source,
                    })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::error::HandlerError;
    use crate::dispatch::handler::Handler;
    use crate::routing::{LinkParams, Route};

    fn table() -> RouteTable {
        RouteTable::new()
            .with_route(
                "user",
                Route::builder("user/:id").controller("Users").action("Show").build().unwrap(),
            )
            .with_route(
                "fail",
                Route::builder("fail").controller("Broken").build().unwrap(),
            )
            .with_route(
                "outer",
                Route::builder("outer/:id").controller("Outer").build().unwrap(),
            )
    }

    fn registry() -> HandlerRegistry {
        let mut registry = HandlerRegistry::new();
        registry
            .register_fn("Users", "Show", |ctx| {
                Ok(Reply::text(format!("user {}", ctx.require("id")?)))
            })
            .register_fn("Index", "Index", |_ctx| Ok(Reply::text("home")))
            .register_fn("Index", "NoRoute", |_ctx| Ok(Reply::not_found("missing")))
            .register_fn("Outer", "Index", |ctx| {
                let inner = ctx.subrequest(&format!("user/{}", ctx.require("id")?), &Params::new())?;
                Ok(Reply::text(format!("outer({})", inner.body)))
            });
        registry
    }

    #[test]
    fn test_handle_binds_params() {
        let d = Dispatcher::new(table(), registry());
        let reply = d.handle("user/42", RequestInfo::default()).unwrap();
        assert_eq!(reply.body, "user 42");
    }

    #[test]
    fn test_root_and_not_found_dispatch() {
        let d = Dispatcher::new(table(), registry());
        assert_eq!(d.handle("/", RequestInfo::default()).unwrap().body, "home");

        let reply = d.handle("nowhere", RequestInfo::default()).unwrap();
        assert_eq!(reply.status, 404);
    }

    #[test]
    fn test_missing_handler_is_reported() {
        let d = Dispatcher::new(table(), registry());
        let err = d.handle("fail", RequestInfo::default()).unwrap_err();
        assert!(matches!(err, DispatchError::HandlerNotFound { ref controller, .. } if controller == "Broken"));
    }

    #[test]
    fn test_dispatch_with_extra_options() {
        let d = Dispatcher::new(table(), registry());
        let route = d.table().select("user/1").unwrap();
        let extra = Params::from([("id".to_string(), "99".to_string())]);
        let reply = d.dispatch_with(route, &extra, RequestInfo::default()).unwrap();
        assert_eq!(reply.body, "user 99");
    }

    #[test]
    fn test_error_hook() {
        struct Recovering;
        impl Handler for Recovering {
            fn invoke(&self, _ctx: &mut Context<'_>) -> Result<Reply, HandlerError> {
                Err(HandlerError::Failed("boom".into()))
            }
            fn catch_error(&self, err: HandlerError, _ctx: &mut Context<'_>) -> Result<Reply, HandlerError> {
                Ok(Reply::text(format!("recovered: {err}")).with_status(500))
            }
        }

        let mut registry = registry();
        registry.register("Broken", "Index", || Recovering);
        let d = Dispatcher::new(table(), registry);
        let reply = d.handle("fail", RequestInfo::default()).unwrap();
        assert_eq!(reply.body, "recovered: boom");
        assert_eq!(reply.status, 500);
    }

    #[test]
    fn test_handler_error_without_hook_propagates() {
        let mut registry = registry();
        registry.register_fn("Broken", "Index", |_ctx| Err(HandlerError::Failed("boom".into())));
        let d = Dispatcher::new(table(), registry);
        let err = d.handle("fail", RequestInfo::default()).unwrap_err();
        assert!(matches!(err, DispatchError::Handler { ref action, .. } if action == "Index"));
    }

    #[test]
    fn test_subrequest() {
        let d = Dispatcher::new(table(), registry());
        let reply = d.handle("outer/7", RequestInfo::default()).unwrap();
        assert_eq!(reply.body, "outer(user 7)");
    }

    #[test]
    fn test_subrequest_depth_limit() {
        let table = RouteTable::new().with_route(
            "loop",
            Route::builder("loop").controller("Loop").build().unwrap(),
        );
        let mut registry = HandlerRegistry::new();
        registry.register_fn("Loop", "Index", |ctx| Ok(ctx.subrequest("loop", &Params::new())?));
        let d = Dispatcher::new(table, registry);

        let err = d.handle("loop", RequestInfo::default()).unwrap_err();
        let mut source: &dyn std::error::Error = &err;
        while let Some(next) = source.source() {
            source = next;
        }
        assert_eq!(
            source.to_string(),
            DispatchError::SubrequestDepth(MAX_SUBREQUEST_DEPTH).to_string()
        );
    }

    #[test]
    fn test_url_for_current_route_reuses_bound_values() {
        let mut registry = registry();
        registry.register_fn("Users", "Show", |ctx| {
            let own = ctx.url_for(None, LinkParams::new())?;
            let other = ctx.url_for(Some("outer"), LinkParams::new().param("id", "3"))?;
            Ok(Reply::text(format!("{own} {other}")))
        });
        let d = Dispatcher::new(table(), registry);
        let reply = d.handle("user/42", RequestInfo::default()).unwrap();
        assert_eq!(reply.body, "/user/42 /outer/3");
    }

    #[test]
    fn test_replace_table() {
        let d = Dispatcher::new(RouteTable::new(), registry());
        assert_eq!(d.handle("user/1", RequestInfo::default()).unwrap().status, 404);
        d.replace_table(table());
        assert_eq!(d.handle("user/1", RequestInfo::default()).unwrap().body, "user 1");
    }

    #[test]
    fn test_condition_guards_dispatch() {
        let table = table().with_route(
            "admin",
            Route::builder("admin/:section")
                .controller("Users")
                .action("Show")
                .condition(|m| m.get("section") != Some("secret"))
                .build()
                .unwrap(),
        );
        let mut registry = registry();
        registry.register_fn("Users", "Show", |ctx| {
            Ok(Reply::text(format!("section {}", ctx.require("section")?)))
        });
        let d = Dispatcher::new(table, registry);

        assert_eq!(
            d.handle("admin/users", RequestInfo::default()).unwrap().body,
            "section users"
        );
        let err = d.handle("admin/secret", RequestInfo::default()).unwrap_err();
        assert!(matches!(err, DispatchError::Declined { ref route } if route == "admin"));
    }

    #[test]
    fn test_namespace_prefixes_controller() {
        let table = RouteTable::new()
            .with_route(
                "api",
                Route::builder("api/:id").controller("users").namespace("api").build().unwrap(),
            )
            .with_route(
                "plain",
                Route::builder("users/:id").controller("users").build().unwrap(),
            );
        let mut registry = HandlerRegistry::new();
        registry
            .register_fn("Api::Users", "Index", |ctx| {
                Ok(Reply::text(format!("api {}", ctx.require("id")?)))
            })
            .register_fn("Users", "Index", |ctx| {
                Ok(Reply::text(format!("plain {}", ctx.require("id")?)))
            });
        let d = Dispatcher::new(table, registry);

        assert_eq!(d.handle("api/3", RequestInfo::default()).unwrap().body, "api 3");
        assert_eq!(d.handle("users/3", RequestInfo::default()).unwrap().body, "plain 3");
    }
}
