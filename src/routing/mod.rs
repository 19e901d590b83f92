//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup / reload):
//!     name + path + options + validators
//!     → template.rs (tokenize path into segments)
//!     → route.rs (promote greedy variables, freeze defaults)
//!     → table.rs (ordered registration)
//!
//! Incoming Request:
//!     path.rs (strip base path and query)
//!     → table.rs (ordered scan, first match wins)
//!     → route.rs (positional segment match, validators)
//!     → Return: RouteMatch (named route, or index / NoRoute fallback)
//!
//! Outbound Links:
//!     route name + LinkParams
//!     → builder.rs (substitute variables, query, fragment, base URL)
//! ```
//!
//! # Design Decisions
//! - Routes compiled once, immutable at runtime
//! - Match results are fresh values; a table is shared across threads without locks
//! - Deterministic: same input always matches same route
//! - No logging here; callers decide what to report

pub mod builder;
pub mod error;
pub mod path;
pub mod route;
pub mod table;
pub mod template;
pub mod validators;

pub use builder::{LinkParams, UrlBuilder};
pub use error::{RouteError, TemplateError, ValidatorError};
pub use path::request_path;
pub use route::{
    Condition, Params, Route, RouteBuilder, RouteMatch, ACTION, CONTROLLER, NAMESPACE, NO_ROUTE_ACTION,
};
pub use table::{RouteTable, INDEX_ROUTE};
pub use template::{PathTemplate, Segment};
pub use validators::{Predicate, Validator, Validators};
