//! Dispatch error types.

use thiserror::Error;

use crate::routing::{RouteError, ValidatorError};

/// Errors a handler may return.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The request was understood but rejected by the handler.
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Failed(String),

    /// Building a link from inside a handler failed.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// A subrequest issued by the handler failed.
    #[error("subrequest failed: {0}")]
    Subrequest(#[source] Box<DispatchError>),
}

impl From<DispatchError> for HandlerError {
    fn from(err: DispatchError) -> Self {
        HandlerError::Subrequest(Box::new(err))
    }
}

/// Errors surfaced by the dispatcher.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Neither the action, a catch-all nor a `NoRoute` handler is registered.
    #[error("no handler registered for {controller}::{action}")]
    HandlerNotFound { controller: String, action: String },

    /// A route validator failed to run while selecting the route.
    #[error(transparent)]
    Validator(#[from] ValidatorError),

    /// The handler failed and its error hook did not recover.
    #[error("handler {controller}::{action} failed: {source}")]
    Handler {
        controller: String,
        action: String,
        #[source]
        source: HandlerError,
    },

    /// The route matched but its condition refused the request.
    #[error("route {route} declined the request")]
    Declined { route: String },

    #[error("subrequest depth limit of {0} exceeded")]
    SubrequestDepth(usize),
}
