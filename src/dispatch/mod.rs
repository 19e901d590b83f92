//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! request path
//!     → routing::RouteTable::select (RouteMatch)
//!     → registry.rs (controller/action → handler, resolve hooks)
//!     → handler.rs (Handler::invoke with a Context)
//!     → on error: Handler::catch_error
//!     → Reply
//! ```
//!
//! # Design Decisions
//! - Handlers are registered explicitly; nothing is looked up by type name
//! - Dispatch is synchronous; the HTTP layer owns the async boundary
//! - Subrequests go through the same table and registry and are depth limited

pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod registry;

pub use dispatcher::{Dispatcher, RequestInfo, MAX_SUBREQUEST_DEPTH};
pub use error::{DispatchError, HandlerError};
pub use handler::{Context, Handler, Reply};
pub use registry::{
    normalize_name, qualify, HandlerRegistry, ResolveHook, Resolved, Target, NAMESPACE_SEPARATOR,
};
