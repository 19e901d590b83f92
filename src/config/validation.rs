//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Compile every route template and validator
//! - Detect empty and duplicate route names
//! - Validate addresses and URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{RouteConfig, RouterConfig, ValidatorConfig};
use crate::routing::validators::{OneOf, Pattern};
use crate::routing::{
    Params, Route, TemplateError, UrlBuilder, Validator, Validators, ACTION, CONTROLLER, NAMESPACE,
};

/// A single semantic problem in a config file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route #{index} has an empty name")]
    EmptyRouteName { index: usize },

    #[error("route {0:?} is defined more than once")]
    DuplicateRoute(String),

    #[error("route {route:?}: {source}")]
    Template {
        route: String,
        #[source]
        source: TemplateError,
    },

    #[error("route {route:?}: unknown validator {name:?} for {variable:?}")]
    UnknownValidator {
        route: String,
        variable: String,
        name: String,
    },

    #[error("route {route:?}: invalid pattern for {variable:?}: {message}")]
    InvalidPattern {
        route: String,
        variable: String,
        message: String,
    },

    #[error("invalid bind address {0:?}")]
    BindAddress(String),

    #[error("invalid public url {url:?}: {message}")]
    PublicUrl { url: String, message: String },

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,
}

/// Validate the whole configuration, collecting every error.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.server.bind_address.clone()));
    }
    if let Some(url) = &config.server.public_url {
        if let Err(e) = UrlBuilder::from_parts(url, &config.server.base_path) {
            errors.push(ValidationError::PublicUrl {
                url: url.clone(),
                message: e.to_string(),
            });
        }
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let mut seen = HashSet::new();
    for (index, route) in config.routes.iter().enumerate() {
        if route.name.trim().is_empty() {
            errors.push(ValidationError::EmptyRouteName { index });
        } else if !seen.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateRoute(route.name.clone()));
        }
        if let Err(mut route_errors) = compile_route(route) {
            errors.append(&mut route_errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Compile one configured route.
pub fn compile_route(config: &RouteConfig) -> Result<Route, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut validators = Validators::new();

    for (variable, spec) in &config.validators {
        match compile_validator(&config.name, variable, spec) {
            Ok(validator) => validators.insert(variable.clone(), validator),
            Err(e) => errors.push(e),
        }
    }

    let mut options: Params = config.defaults.clone();
    if let Some(controller) = &config.controller {
        options.insert(CONTROLLER.to_string(), controller.clone());
    }
    if let Some(action) = &config.action {
        options.insert(ACTION.to_string(), action.clone());
    }
    if let Some(namespace) = &config.namespace {
        options.insert(NAMESPACE.to_string(), namespace.clone());
    }

    let route = Route::new(&config.path, options, validators).map_err(|source| {
        ValidationError::Template {
            route: config.name.clone(),
            source,
        }
    });

    match route {
        Ok(route) if errors.is_empty() => Ok(route),
        Ok(_) => Err(errors),
        Err(e) => {
            errors.push(e);
            Err(errors)
        }
    }
}

fn compile_validator(
    route: &str,
    variable: &str,
    spec: &ValidatorConfig,
) -> Result<Validator, ValidationError> {
    match spec {
        ValidatorConfig::Named(name) => {
            Validator::builtin(name).ok_or_else(|| ValidationError::UnknownValidator {
                route: route.to_string(),
                variable: variable.to_string(),
                name: name.clone(),
            })
        }
        ValidatorConfig::Pattern { pattern } => Pattern::new(pattern)
            .map(Validator::predicate)
            .map_err(|e| ValidationError::InvalidPattern {
                route: route.to_string(),
                variable: variable.to_string(),
                message: e.to_string(),
            }),
        ValidatorConfig::OneOf { one_of } => Ok(Validator::predicate(OneOf::new(one_of.iter()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::ServerConfig;

    fn route(name: &str, path: &str) -> RouteConfig {
        RouteConfig {
            name: name.to_string(),
            path: path.to_string(),
            controller: None,
            action: None,
            namespace: None,
            defaults: Default::default(),
            validators: Default::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        let config = RouterConfig {
            routes: vec![route("user", "user/:id"), route("blog", "blog(/:page)")],
            ..Default::default()
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut bad_validator = route("item", "item/:id");
        bad_validator
            .validators
            .insert("id".into(), ValidatorConfig::Named("hex".into()));
        let mut bad_pattern = route("code", "code/:c");
        bad_pattern
            .validators
            .insert("c".into(), ValidatorConfig::Pattern { pattern: "(".into() });

        let config = RouterConfig {
            server: ServerConfig {
                bind_address: "not an address".into(),
                request_timeout_secs: 0,
                ..Default::default()
            },
            routes: vec![
                route("", "a"),
                route("dup", "b"),
                route("dup", "c"),
                route("parens", "a(b"),
                bad_validator,
                bad_pattern,
            ],
            ..Default::default()
        };

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 7);
        assert!(errors.contains(&ValidationError::EmptyRouteName { index: 0 }));
        assert!(errors.contains(&ValidationError::DuplicateRoute("dup".into())));
        assert!(errors.contains(&ValidationError::ZeroTimeout));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::Template { route, .. } if route == "parens")));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::UnknownValidator { name, .. } if name == "hex")));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidPattern { variable, .. } if variable == "c")));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::BindAddress(_))));
    }

    #[test]
    fn test_bad_public_url() {
        let config = RouterConfig {
            server: ServerConfig {
                public_url: Some("not a url".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::PublicUrl { .. }));
    }

    #[test]
    fn test_compile_route_applies_options() {
        let mut config = route("user", "user/:id");
        config.controller = Some("users".into());
        config.defaults.insert("id".into(), "1".into());
        config
            .validators
            .insert("id".into(), ValidatorConfig::Named("numeric".into()));

        let route = compile_route(&config).unwrap();
        assert_eq!(route.controller(), "users");
        assert_eq!(route.action(), "Index");
        assert_eq!(route.option("id"), Some("1"));
        assert!(route.match_path("user/12").unwrap().is_some());
        assert!(route.match_path("user/abc").unwrap().is_none());
    }

    #[test]
    fn test_compile_route_sets_namespace() {
        let mut config = route("admin", "admin/:id");
        config.namespace = Some("admin".into());
        let compiled = compile_route(&config).unwrap();
        assert_eq!(compiled.option(NAMESPACE), Some("admin"));

        let plain = compile_route(&route("plain", "plain")).unwrap();
        assert_eq!(plain.option(NAMESPACE), None);
    }

    #[test]
    fn test_greedy_validator_from_config() {
        let mut config = route("files", "files/:path");
        config
            .validators
            .insert("path".into(), ValidatorConfig::Named("$".into()));

        let route = compile_route(&config).unwrap();
        let params = route.match_path("files/a/b/c").unwrap().unwrap();
        assert_eq!(params["path"], "a/b/c");
    }
}
