//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use url_router::config::{build_links, build_table, parse_config, RouterConfig};
use url_router::dispatch::Dispatcher;
use url_router::HttpServer;

/// A routes file exercising every template feature.
pub const ROUTES: &str = r#"
[server]
bind_address = "127.0.0.1:0"
base_path = "/app"
public_url = "https://example.com"

[[routes]]
name = "index"
path = "home"

[[routes]]
name = "user"
path = "user/:id"
controller = "echo"
action = "user"

[routes.validators]
id = "numeric"

[[routes]]
name = "blog"
path = "blog(/:page)"
controller = "echo"
action = "blog"

[routes.defaults]
page = "1"

[[routes]]
name = "files"
path = "files/:path"
controller = "echo"
action = "files"

[routes.validators]
path = "$"

[[routes]]
name = "docs"
path = ":lang/doc(s)/:page"
controller = "echo"
action = "docs"

[routes.validators]
lang = { one_of = ["en", "fr"] }

[[routes]]
name = "broken"
path = "broken"
controller = "missing"
"#;

pub fn config() -> RouterConfig {
    parse_config(ROUTES).unwrap()
}

/// Dispatcher over [`ROUTES`] with the demo handlers.
pub fn dispatcher() -> Arc<Dispatcher> {
    let config = config();
    let table = build_table(&config).unwrap();
    let links = build_links(&config).unwrap();
    Arc::new(Dispatcher::new(table, url_router::demo::registry()).with_links(links))
}

pub fn server() -> HttpServer {
    HttpServer::new(config(), dispatcher())
}
