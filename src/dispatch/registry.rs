//! Handler registration and resolution.
//!
//! # Responsibilities
//! - Map `{Controller, Action}` names to handler factories
//! - Fall back to a controller's catch-all, then its `NoRoute` action
//! - Let resolve hooks wrap or replace the chosen handler
//!
//! # Design Decisions
//! - Populated explicitly at startup; no name-to-type lookup at runtime
//! - Names are normalized to an upper-case first letter, so `:controller`
//!   variables bound from lowercase paths resolve
//! - A route's `Namespace` option qualifies its controller as `Namespace::Controller`
//! - Hooks run in registration order, each sees the previous hook's result

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::dispatch::error::{DispatchError, HandlerError};
use crate::dispatch::handler::{Context, Handler, Reply};
use crate::routing::NO_ROUTE_ACTION;

/// Produces a handler instance for one dispatch.
pub type HandlerFactory = Arc<dyn Fn() -> Arc<dyn Handler> + Send + Sync>;

/// The controller and action a request resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub controller: String,
    pub action: String,
}

/// Interceptor run after a handler is resolved and before it is invoked.
pub trait ResolveHook: Send + Sync {
    fn resolve(&self, target: &Target, handler: Arc<dyn Handler>) -> Arc<dyn Handler>;
}

impl<F> ResolveHook for F
where
    F: Fn(&Target, Arc<dyn Handler>) -> Arc<dyn Handler> + Send + Sync,
{
    fn resolve(&self, target: &Target, handler: Arc<dyn Handler>) -> Arc<dyn Handler> {
        self(target, handler)
    }
}

/// A handler ready to be invoked.
pub struct Resolved {
    pub target: Target,
    pub handler: Arc<dyn Handler>,
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolved")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// Upper-case the first character of each `::`-separated part.
pub fn normalize_name(name: &str) -> String {
    name.split(NAMESPACE_SEPARATOR)
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(NAMESPACE_SEPARATOR)
}

/// Joins a route's `Namespace` option to its controller name.
pub const NAMESPACE_SEPARATOR: &str = "::";

/// The controller name a handler is registered under for `namespace`.
pub fn qualify(namespace: Option<&str>, controller: &str) -> String {
    match namespace {
        Some(ns) => format!("{ns}{NAMESPACE_SEPARATOR}{controller}"),
        None => controller.to_string(),
    }
}

/// Explicit controller/action → handler registry.
#[derive(Default)]
pub struct HandlerRegistry {
    actions: HashMap<(String, String), HandlerFactory>,
    catch_all: HashMap<String, HandlerFactory>,
    hooks: Vec<Arc<dyn ResolveHook>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory building a fresh handler for every dispatch.
    pub fn register<F, H>(&mut self, controller: &str, action: &str, factory: F) -> &mut Self
    where
        F: Fn() -> H + Send + Sync + 'static,
        H: Handler + 'static,
    {
        let factory: HandlerFactory = Arc::new(move || Arc::new(factory()) as Arc<dyn Handler>);
        self.actions
            .insert((normalize_name(controller), normalize_name(action)), factory);
        self
    }

    /// Register a shared function handler.
    pub fn register_fn<F>(&mut self, controller: &str, action: &str, f: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) -> Result<Reply, HandlerError> + Send + Sync + 'static,
    {
        let handler: Arc<dyn Handler> = Arc::new(f);
        self.actions.insert(
            (normalize_name(controller), normalize_name(action)),
            Arc::new(move || handler.clone()),
        );
        self
    }

    /// Register a handler serving every action of `controller` without its own entry.
    pub fn register_catch_all<H>(&mut self, controller: &str, handler: H) -> &mut Self
    where
        H: Handler + 'static,
    {
        let handler: Arc<dyn Handler> = Arc::new(handler);
        self.catch_all
            .insert(normalize_name(controller), Arc::new(move || handler.clone()));
        self
    }

    pub fn add_hook<K: ResolveHook + 'static>(&mut self, hook: K) -> &mut Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn len(&self) -> usize {
        self.actions.len() + self.catch_all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find the handler for `controller`/`action` and run the resolve hooks.
    pub fn resolve(&self, controller: &str, action: &str) -> Result<Resolved, DispatchError> {
        let target = Target {
            controller: normalize_name(controller),
            action: normalize_name(action),
        };

        let factory = self
            .actions
            .get(&(target.controller.clone(), target.action.clone()))
            .or_else(|| self.catch_all.get(&target.controller))
            .or_else(|| {
                self.actions
                    .get(&(target.controller.clone(), NO_ROUTE_ACTION.to_string()))
            })
            .ok_or_else(|| DispatchError::HandlerNotFound {
                controller: target.controller.clone(),
                action: target.action.clone(),
            })?;

        let handler = self
            .hooks
            .iter()
            .fold(factory(), |handler, hook| hook.resolve(&target, handler));

        Ok(Resolved { target, handler })
    }
}
