//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the router service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Listener and link generation settings.
    pub server: ServerConfig,

    /// Route definitions, matched in file order.
    pub routes: Vec<RouteConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Path prefix the application is mounted under (e.g., "/app").
    pub base_path: String,

    /// Public origin used for absolute links (e.g., "https://example.com").
    /// Links are path-only when unset.
    pub public_url: Option<String>,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            base_path: String::new(),
            public_url: None,
            request_timeout_secs: 30,
        }
    }
}

/// A named route.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route name used for link generation and metrics.
    pub name: String,

    /// Path template, e.g. `"user/:id"` or `"blog(/:page)"`.
    pub path: String,

    /// Controller default; `Index` when omitted.
    #[serde(default)]
    pub controller: Option<String>,

    /// Action default; `Index` when omitted.
    #[serde(default)]
    pub action: Option<String>,

    /// Prefix for the controller when resolving its handler, e.g. `"admin"`.
    #[serde(default)]
    pub namespace: Option<String>,

    /// Default option values.
    #[serde(default)]
    pub defaults: BTreeMap<String, String>,

    /// Validators keyed by variable name.
    #[serde(default)]
    pub validators: BTreeMap<String, ValidatorConfig>,
}

/// A validator as written in the config file.
///
/// ```toml
/// [routes.validators]
/// id = "numeric"
/// rest = "$"
/// code = { pattern = "[A-Z]{3}" }
/// lang = { one_of = ["en", "fr"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ValidatorConfig {
    /// `"$"` or a builtin name.
    Named(String),
    Pattern { pattern: String },
    OneOf { one_of: Vec<String> },
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config() {
        let config: RouterConfig = toml::from_str("").unwrap();
        assert!(config.routes.is_empty());
        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_validator_forms() {
        let config: RouterConfig = toml::from_str(
            r#"
            [[routes]]
            name = "page"
            path = ":lang/page/:id/:rest"
            controller = "pages"

            [routes.defaults]
            id = "1"

            [routes.validators]
            id = "numeric"
            rest = "$"
            code = { pattern = "[A-Z]{3}" }
            lang = { one_of = ["en", "fr"] }
            "#,
        )
        .unwrap();

        let route = &config.routes[0];
        assert_eq!(route.controller.as_deref(), Some("pages"));
        assert_eq!(route.action, None);
        assert_eq!(route.defaults["id"], "1");
        assert_eq!(route.validators["id"], ValidatorConfig::Named("numeric".into()));
        assert_eq!(route.validators["rest"], ValidatorConfig::Named("$".into()));
        assert_eq!(
            route.validators["code"],
            ValidatorConfig::Pattern { pattern: "[A-Z]{3}".into() }
        );
        assert_eq!(
            route.validators["lang"],
            ValidatorConfig::OneOf { one_of: vec!["en".into(), "fr".into()] }
        );
    }
}
