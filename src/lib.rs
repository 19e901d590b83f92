//! URL pattern router library.
//!
//! Maps request paths to named routes carrying a controller/action pair,
//! dispatches them to registered handlers and generates links back to them.

pub mod config;
pub mod demo;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::RouterConfig;
pub use dispatch::{Dispatcher, HandlerRegistry};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{LinkParams, Route, RouteMatch, RouteTable, UrlBuilder};
