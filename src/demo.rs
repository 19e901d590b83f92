//! Handlers registered by the `url-router` binary.
//!
//! - `Index/Index`: a plain landing page with a link back to itself
//! - `Index/NoRoute`: 404 page
//! - `Echo/*`: JSON description of the matched route, for any action

use std::collections::BTreeMap;

use serde::Serialize;

use crate::dispatch::{Context, HandlerError, HandlerRegistry, Reply};
use crate::routing::LinkParams;

#[derive(Debug, Serialize)]
struct Echo<'a> {
    route: Option<&'a str>,
    controller: &'a str,
    action: &'a str,
    params: &'a BTreeMap<String, String>,
    query: &'a [(String, String)],
    request_id: Option<&'a str>,
    self_url: String,
}

fn index(ctx: &mut Context<'_>) -> Result<Reply, HandlerError> {
    let home = ctx.url_for(None, LinkParams::new())?;
    Ok(Reply::html(format!(
        "<!doctype html><title>url-router</title><p><a href=\"{home}\">home</a></p>"
    )))
}

fn no_route(ctx: &mut Context<'_>) -> Result<Reply, HandlerError> {
    tracing::debug!(request_id = ctx.request_id().unwrap_or("-"), "No route");
    Ok(Reply::not_found("Not Found"))
}

fn echo(ctx: &mut Context<'_>) -> Result<Reply, HandlerError> {
    let self_url = ctx.url_for(None, LinkParams::new().path_only())?;
    let route = ctx.route();
    Reply::json(&Echo {
        route: route.name(),
        controller: route.controller(),
        action: route.action(),
        params: route.params(),
        query: ctx.query(),
        request_id: ctx.request_id(),
        self_url,
    })
}

/// The demo handler set.
pub fn registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry
        .register_fn("Index", "Index", index)
        .register_fn("Index", "NoRoute", no_route)
        .register_catch_all("Echo", echo);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{Dispatcher, RequestInfo};
    use crate::routing::{Route, RouteTable};

    fn dispatcher() -> Dispatcher {
        let table = RouteTable::new().with_route(
            "echo",
            Route::builder("echo/:Action/:id").controller("echo").build().unwrap(),
        );
        Dispatcher::new(table, registry())
    }

    #[test]
    fn test_echo_reports_route() {
        let request = RequestInfo {
            request_id: Some("req-1".into()),
            query: vec![("q".into(), "x".into())],
            depth: 0,
        };
        let reply = dispatcher().handle("echo/show/5", request).unwrap();
        assert_eq!(reply.content_type, "application/json");

        let body: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
        assert_eq!(body["route"], "echo");
        assert_eq!(body["action"], "show");
        assert_eq!(body["params"]["id"], "5");
        assert_eq!(body["query"][0][1], "x");
        assert_eq!(body["request_id"], "req-1");
        assert_eq!(body["self_url"], "/echo/show/5");
    }

    #[test]
    fn test_index_and_no_route() {
        let d = dispatcher();
        let home = d.handle("/", RequestInfo::default()).unwrap();
        assert!(home.body.contains("href=\"/\""));

        let missing = d.handle("nope", RequestInfo::default()).unwrap();
        assert_eq!(missing.status, 404);
    }
}
