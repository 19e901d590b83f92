//! Routing error types.

use thiserror::Error;

/// Errors raised while compiling a path template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The template string cannot be tokenized into segments.
    #[error("invalid route template {template:?}: {reason}")]
    InvalidTemplate { template: String, reason: String },
}

impl TemplateError {
    pub(crate) fn invalid(template: &str, reason: impl Into<String>) -> Self {
        TemplateError::InvalidTemplate {
            template: template.to_string(),
            reason: reason.into(),
        }
    }
}

/// A predicate validator failed to execute.
///
/// This is distinct from a predicate returning `false`, which is an
/// ordinary no-match.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validator for {variable:?} failed on {value:?}: {message}")]
pub struct ValidatorError {
    pub variable: String,
    pub value: String,
    pub message: String,
}

impl ValidatorError {
    pub fn new(variable: &str, value: &str, message: impl Into<String>) -> Self {
        Self {
            variable: variable.to_string(),
            value: value.to_string(),
            message: message.into(),
        }
    }
}

/// Errors raised by route table lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// No route is registered under the requested name.
    #[error("no route named {0:?}")]
    UnknownRoute(String),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Validator(#[from] ValidatorError),
}
