//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! routes file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (compile every route, collect all errors)
//!     → RouterConfig (validated, immutable)
//!     → loader::build_table → RouteTable
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → new RouterConfig sent over a channel
//!     → server rebuilds the table and swaps it atomically
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - A failed reload keeps the current table

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{build_links, build_table, load_config, parse_config, ConfigError};
pub use schema::{ObservabilityConfig, RouteConfig, RouterConfig, ServerConfig, ValidatorConfig};
pub use validation::{validate_config, ValidationError};
pub use watcher::ConfigWatcher;
