//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::config::validation::{compile_route, validate_config, ValidationError};
use crate::routing::{RouteTable, UrlBuilder};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RouterConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<RouterConfig, ConfigError> {
    let config: RouterConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Compile the configured routes, in file order.
pub fn build_table(config: &RouterConfig) -> Result<RouteTable, ConfigError> {
    let mut table = RouteTable::new();
    for route_config in &config.routes {
        let route = compile_route(route_config).map_err(ConfigError::Validation)?;
        table.register(route_config.name.clone(), route);
    }
    Ok(table)
}

/// The link builder described by the server section.
pub fn build_links(config: &RouterConfig) -> Result<UrlBuilder, ConfigError> {
    match &config.server.public_url {
        Some(url) => UrlBuilder::from_parts(url, &config.server.base_path).map_err(|e| {
            ConfigError::Validation(vec![ValidationError::PublicUrl {
                url: url.clone(),
                message: e.to_string(),
            }])
        }),
        None => Ok(UrlBuilder::relative()),
    }
}
