//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! http, dispatch, config reload produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through log fields
//! - Routing code stays silent; callers log selection outcomes

pub mod logging;
pub mod metrics;
