//! Compiled routes and path matching.
//!
//! # Responsibilities
//! - Hold a compiled template, its validators and its default options
//! - Decide whether a request path matches and extract its variables
//!
//! # Design Decisions
//! - Matching never mutates the route; bindings go into a fresh `RouteMatch`
//! - Purely positional: each template index is matched once, no backtracking
//! - A missing variable is accepted only when the route has a default for it
//! - An empty token never binds an unconstrained variable

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::routing::error::{TemplateError, ValidatorError};
use crate::routing::template::{PathTemplate, Segment};
use crate::routing::validators::{Validator, Validators};

/// Option and parameter values keyed by name.
pub type Params = BTreeMap<String, String>;

/// Option key naming the controller to dispatch to.
pub const CONTROLLER: &str = "Controller";
/// Option key naming the action to dispatch to.
pub const ACTION: &str = "Action";
pub const DEFAULT_CONTROLLER: &str = "Index";
pub const DEFAULT_ACTION: &str = "Index";
/// Action forced onto the fallback route when nothing matched.
pub const NO_ROUTE_ACTION: &str = "NoRoute";
/// Option key prefixing the controller name at handler resolution.
pub const NAMESPACE: &str = "Namespace";

/// Guard run against a selected route before its handler is invoked.
#[derive(Clone)]
pub struct Condition(Arc<dyn Fn(&RouteMatch) -> bool + Send + Sync>);

impl Condition {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&RouteMatch) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn allows(&self, route: &RouteMatch) -> bool {
        (self.0)(route)
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition").finish_non_exhaustive()
    }
}

/// A named path pattern together with its validators and default options.
#[derive(Debug, Clone)]
pub struct Route {
    template: PathTemplate,
    validators: Validators,
    options: Params,
    condition: Option<Condition>,
}

impl Route {
    /// Compile a route from its path, options and validators.
    ///
    /// `options` are layered over the `Controller = Index`, `Action = Index`
    /// defaults. Variables whose validator is greedy become tail captures.
    pub fn new(path: &str, options: Params, validators: Validators) -> Result<Self, TemplateError> {
        let template =
            PathTemplate::parse(path)?.with_tail_captures(|name| validators.is_greedy(name))?;

        let mut merged = Params::new();
        merged.insert(CONTROLLER.to_string(), DEFAULT_CONTROLLER.to_string());
        merged.insert(ACTION.to_string(), DEFAULT_ACTION.to_string());
        merged.extend(options);

        Ok(Self {
            template,
            validators,
            options: merged,
            condition: None,
        })
    }

    pub fn builder(path: impl Into<String>) -> RouteBuilder {
        RouteBuilder::new(path)
    }

    /// The empty route used when nothing else matches.
    pub fn fallback() -> Self {
        Self {
            template: PathTemplate::empty(),
            validators: Validators::new(),
            options: Params::from([
                (CONTROLLER.to_string(), DEFAULT_CONTROLLER.to_string()),
                (ACTION.to_string(), DEFAULT_ACTION.to_string()),
            ]),
            condition: None,
        }
    }

    /// Dispatch this route only when `f` accepts the match.
    pub fn with_condition<F>(mut self, f: F) -> Self
    where
        F: Fn(&RouteMatch) -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Condition::new(f));
        self
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    /// Match `path` against this route.
    ///
    /// Returns the variables bound from the path, `None` if the path does not
    /// match, or the error of a predicate that failed to run.
    pub fn match_path(&self, path: &str) -> Result<Option<Params>, ValidatorError> {
        if path == self.template.original() {
            return Ok(Some(Params::new()));
        }
        if path.is_empty() {
            return Ok(None);
        }

        let parts: Vec<&str> = path.split('/').collect();
        let segments = self.template.segments();

        if parts.len() > segments.len() && !self.template.has_tail_capture() {
            return Ok(None);
        }

        let mut bound = Params::new();
        for (i, segment) in segments.iter().enumerate() {
            let Some(&part) = parts.get(i) else {
                if self.template.is_optional(i) {
                    continue;
                }
                match segment.variable() {
                    Some(name) if self.options.contains_key(name) => continue,
                    _ => return Ok(None),
                }
            };

            match segment {
                Segment::Literal(text) => {
                    if part != text {
                        return Ok(None);
                    }
                }
                Segment::OptionalLiteral(opt) => {
                    if !opt.matches(part) {
                        return Ok(None);
                    }
                }
                Segment::TailCapture(name) => {
                    bound.insert(name.clone(), parts[i..].join("/"));
                    break;
                }
                Segment::Variable(name) => {
                    match self.validators.get(name) {
                        Some(Validator::Predicate(predicate)) => {
                            if !predicate.check(part, name)? {
                                return Ok(None);
                            }
                        }
                        // An unconstrained variable needs a non-empty token.
                        _ if part.is_empty() => {
                            if self.template.is_optional(i) {
                                continue;
                            }
                            return Ok(None);
                        }
                        _ => {}
                    }
                    bound.insert(name.clone(), part.to_string());
                }
            }
        }

        Ok(Some(bound))
    }

    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    pub fn path(&self) -> &str {
        self.template.original()
    }

    pub fn validators(&self) -> &Validators {
        &self.validators
    }

    /// Default option values, including `Controller` and `Action`.
    pub fn options(&self) -> &Params {
        &self.options
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    pub fn controller(&self) -> &str {
        self.option(CONTROLLER).unwrap_or(DEFAULT_CONTROLLER)
    }

    pub fn action(&self) -> &str {
        self.option(ACTION).unwrap_or(DEFAULT_ACTION)
    }
}

/// Builder for [`Route`].
#[derive(Debug)]
pub struct RouteBuilder {
    path: String,
    options: Params,
    validators: Validators,
    condition: Option<Condition>,
}

impl RouteBuilder {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            options: Params::new(),
            validators: Validators::new(),
            condition: None,
        }
    }

    pub fn controller(self, controller: impl Into<String>) -> Self {
        self.option(CONTROLLER, controller)
    }

    pub fn action(self, action: impl Into<String>) -> Self {
        self.option(ACTION, action)
    }

    /// Prefix the controller name with `namespace` when resolving handlers.
    pub fn namespace(self, namespace: impl Into<String>) -> Self {
        self.option(NAMESPACE, namespace)
    }

    /// Only dispatch matches accepted by `f`.
    pub fn condition<F>(mut self, f: F) -> Self
    where
        F: Fn(&RouteMatch) -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Condition::new(f));
        self
    }

    /// Set a default option; also the fallback value for a missing variable.
    pub fn option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn validator(mut self, variable: impl Into<String>, validator: Validator) -> Self {
        self.validators.insert(variable, validator);
        self
    }

    pub fn greedy(self, variable: impl Into<String>) -> Self {
        self.validator(variable, Validator::GreedyToEnd)
    }

    pub fn check<F>(mut self, variable: impl Into<String>, f: F) -> Self
    where
        F: Fn(&str, &str) -> bool + Send + Sync + 'static,
    {
        self.validators = self.validators.check(variable, f);
        self
    }

    pub fn build(self) -> Result<Route, TemplateError> {
        let mut route = Route::new(&self.path, self.options, self.validators)?;
        route.condition = self.condition;
        Ok(route)
    }
}

/// The outcome of selecting a route for one request.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    name: Option<String>,
    route: Arc<Route>,
    params: Params,
    bound: Params,
}

impl RouteMatch {
    /// Combine a route's options with the variables bound from a path.
    pub fn new(name: Option<String>, route: Arc<Route>, bound: Params) -> Self {
        let mut params = route.options().clone();
        params.extend(bound.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self {
            name,
            route,
            params,
            bound,
        }
    }

    /// The registered route name, `None` for the fallback route.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }

    /// Route options overlaid with bound variables.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Only the variables extracted from the request path.
    pub fn bound(&self) -> &Params {
        &self.bound
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn controller(&self) -> &str {
        self.get(CONTROLLER).unwrap_or(DEFAULT_CONTROLLER)
    }

    pub fn action(&self) -> &str {
        self.get(ACTION).unwrap_or(DEFAULT_ACTION)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.get(NAMESPACE).filter(|ns| !ns.is_empty())
    }

    /// False when the route carries a condition that rejects this match.
    pub fn is_allowed(&self) -> bool {
        self.route.condition().map_or(true, |c| c.allows(self))
    }

    /// True for the fallback route carrying the `NoRoute` action.
    pub fn is_not_found(&self) -> bool {
        self.name.is_none() && self.action() == NO_ROUTE_ACTION
    }

    pub(crate) fn set_param(&mut self, key: &str, value: &str) {
        self.params.insert(key.to_string(), value.to_string());
    }

    /// A copy with `extra` layered over the parameters.
    pub fn with_options(&self, extra: &Params) -> Self {
        let mut next = self.clone();
        next.params.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        next
    }
}
