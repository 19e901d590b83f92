//! Route lookup.
//!
//! # Responsibilities
//! - Store compiled routes in registration order
//! - Select the first route matching a request path
//! - Fall back to the `index` route or the not-found route
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) ordered scan; registration order is priority order
//! - Re-registering a name replaces the route but keeps its position
//! - No match is a value (the `NoRoute` fallback), not an error

use std::sync::Arc;

use indexmap::IndexMap;

use crate::routing::error::{RouteError, ValidatorError};
use crate::routing::route::{Params, Route, RouteMatch, ACTION, NO_ROUTE_ACTION};

/// Name of the route served for the root path when nothing else matches.
pub const INDEX_ROUTE: &str = "index";

/// Returns true for the paths treated as the site root.
pub fn is_root(path: &str) -> bool {
    path.is_empty() || path == "/"
}

/// Ordered mapping of route name to compiled route.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: IndexMap<String, Arc<Route>>,
    fallback: Arc<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self {
            routes: IndexMap::new(),
            fallback: Arc::new(Route::fallback()),
        }
    }

    /// Register `route` under `name`, returning the route it replaced.
    pub fn register(&mut self, name: impl Into<String>, route: Route) -> Option<Arc<Route>> {
        self.routes.insert(name.into(), Arc::new(route))
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_route(mut self, name: impl Into<String>, route: Route) -> Self {
        self.register(name, route);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Route>> {
        self.routes.get(name)
    }

    /// Like [`get`](Self::get) but reports unknown names as an error.
    pub fn route(&self, name: &str) -> Result<&Arc<Route>, RouteError> {
        self.get(name)
            .ok_or_else(|| RouteError::UnknownRoute(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Route>)> {
        self.routes.iter().map(|(name, route)| (name.as_str(), route))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Select the route for a request path.
    ///
    /// The first registered route that matches wins. Otherwise the root path
    /// resolves to the `index` route if one exists, and anything else to the
    /// fallback route with its action set to `NoRoute`.
    pub fn select(&self, path: &str) -> Result<RouteMatch, ValidatorError> {
        for (name, route) in &self.routes {
            if let Some(bound) = route.match_path(path)? {
                return Ok(RouteMatch::new(Some(name.clone()), route.clone(), bound));
            }
        }

        if is_root(path) {
            if let Some(index) = self.routes.get(INDEX_ROUTE) {
                return Ok(RouteMatch::new(
                    Some(INDEX_ROUTE.to_string()),
                    index.clone(),
                    Params::new(),
                ));
            }
        }

        let mut fallback = RouteMatch::new(None, self.fallback.clone(), Params::new());
        if !is_root(path) {
            fallback.set_param(ACTION, NO_ROUTE_ACTION);
        }
        Ok(fallback)
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}
