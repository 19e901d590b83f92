//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, trace layers)
//!     → request.rs (request ID, query pairs)
//!     → routing::request_path (strip base path)
//!     → dispatch::Dispatcher (select route, run handler)
//!     → response.rs (Reply or error → HTTP response)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::{error_response, status_for};
pub use server::{apply_config, AppState, HttpServer};
