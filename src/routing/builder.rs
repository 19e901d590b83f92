//! Reverse URL generation.
//!
//! # Responsibilities
//! - Rebuild a path from a route template and parameter values
//! - Append query string and fragment
//! - Prefix the public base URL unless a path-only link is requested
//!
//! # Design Decisions
//! - Optional `(...)` groups are always dropped from generated links
//! - Substituted values are lowercased
//! - Each `:name` token is replaced once, at its first remaining occurrence
//! - A variable with no value is replaced by the empty string

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::routing::error::RouteError;
use crate::routing::route::{Params, Route};
use crate::routing::table::RouteTable;

static OPTIONAL_GROUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(.*?\)").unwrap());
static VARIABLE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r":([^/]*)").unwrap());

/// Values and flags for one generated link.
#[derive(Debug, Clone)]
pub struct LinkParams {
    /// Explicit variable values; these always win.
    pub params: Params,
    /// Values bound by the current match, consulted after `params`.
    pub current: Option<Params>,
    /// Fall back to the route's default options.
    pub use_default_route_vars: bool,
    /// Query string pairs, in order.
    pub query: Vec<(String, String)>,
    /// Emit empty query values as bare keys instead of dropping them.
    pub keep_empty: bool,
    pub fragment: Option<String>,
    /// Produce `/path` instead of an absolute URL.
    pub path_only: bool,
}

impl Default for LinkParams {
    fn default() -> Self {
        Self {
            params: Params::new(),
            current: None,
            use_default_route_vars: true,
            query: Vec::new(),
            keep_empty: false,
            fragment: None,
            path_only: false,
        }
    }
}

impl LinkParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }

    pub fn merge_current(mut self, current: &Params) -> Self {
        self.current = Some(current.clone());
        self
    }

    pub fn without_defaults(mut self) -> Self {
        self.use_default_route_vars = false;
        self
    }

    pub fn keep_empty(mut self) -> Self {
        self.keep_empty = true;
        self
    }

    pub fn path_only(mut self) -> Self {
        self.path_only = true;
        self
    }

    fn lookup<'a>(&'a self, route: &'a Route, key: &str) -> Option<&'a str> {
        if let Some(value) = self.params.get(key) {
            return Some(value.as_str());
        }
        if let Some(value) = self.current.as_ref().and_then(|c| c.get(key)) {
            return Some(value.as_str());
        }
        if self.use_default_route_vars {
            return route.option(key);
        }
        None
    }

    fn query_string(&self) -> String {
        let pairs: Vec<String> = self
            .query
            .iter()
            .filter_map(|(key, value)| match (value.is_empty(), self.keep_empty) {
                (false, _) => Some(format!("{key}={value}")),
                (true, true) => Some(key.clone()),
                (true, false) => None,
            })
            .collect();

        if pairs.is_empty() {
            String::new()
        } else {
            format!("?{}", pairs.join("&"))
        }
    }
}

/// Generates links for routes.
#[derive(Debug, Clone, Default)]
pub struct UrlBuilder {
    base: Option<Url>,
}

impl UrlBuilder {
    /// A builder producing absolute URLs under `base`.
    pub fn new(mut base: Url) -> Self {
        base.set_query(None);
        base.set_fragment(None);
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self { base: Some(base) }
    }

    /// Join a public origin such as `https://example.com` with a base path.
    pub fn from_parts(public_url: &str, base_path: &str) -> Result<Self, url::ParseError> {
        let mut base = Url::parse(public_url)?;
        let path = format!("/{}", base_path.trim_matches('/'));
        base.set_path(&path);
        Ok(Self::new(base))
    }

    /// A builder with no origin; every link is path-only.
    pub fn relative() -> Self {
        Self { base: None }
    }

    pub fn base(&self) -> Option<&Url> {
        self.base.as_ref()
    }

    /// Build the link for `route`.
    pub fn build(&self, route: &Route, link: &LinkParams) -> String {
        let mut path = OPTIONAL_GROUP.replace_all(route.path(), "").into_owned();

        let tokens: Vec<String> = VARIABLE_TOKEN
            .captures_iter(&path)
            .map(|c| c[1].to_string())
            .collect();

        for raw in tokens {
            let token = format!(":{raw}");
            let value = link
                .lookup(route, raw.trim_matches(':'))
                .map(str::to_lowercase)
                .unwrap_or_default();
            if let Some(pos) = path.find(&token) {
                path.replace_range(pos..pos + token.len(), &value);
            }
        }

        let mut out = match (&self.base, link.path_only) {
            (Some(base), false) => base.as_str().to_string(),
            _ => "/".to_string(),
        };
        out.push_str(path.trim_matches('/'));
        out.push_str(&link.query_string());
        if let Some(fragment) = &link.fragment {
            out.push('#');
            out.push_str(fragment);
        }
        out
    }

    /// Build the link for the route registered as `name`.
    pub fn url_for(&self, table: &RouteTable, name: &str, link: &LinkParams) -> Result<String, RouteError> {
        let route = table.route(name)?;
        Ok(self.build(route, link))
    }
}
