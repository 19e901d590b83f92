//! Handler capability and per-request context.

use std::sync::Arc;

use serde::Serialize;

use crate::dispatch::dispatcher::{Dispatcher, RequestInfo};
use crate::dispatch::error::{DispatchError, HandlerError};
use crate::routing::{LinkParams, Params, RouteError, RouteMatch, RouteTable};

/// Something that can serve a resolved `{Controller, Action}` pair.
pub trait Handler: Send + Sync {
    fn invoke(&self, ctx: &mut Context<'_>) -> Result<Reply, HandlerError>;

    /// Called with the error returned by [`invoke`](Self::invoke).
    ///
    /// Returning `Ok` recovers the request; the default re-raises.
    fn catch_error(&self, err: HandlerError, _ctx: &mut Context<'_>) -> Result<Reply, HandlerError> {
        Err(err)
    }
}

impl<F> Handler for F
where
    F: Fn(&mut Context<'_>) -> Result<Reply, HandlerError> + Send + Sync,
{
    fn invoke(&self, ctx: &mut Context<'_>) -> Result<Reply, HandlerError> {
        self(ctx)
    }
}

/// A handler's response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: "text/plain; charset=utf-8",
            body: body.into(),
        }
    }

    pub fn html(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body: body.into(),
        }
    }

    /// Serialize `value` as a JSON body.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, HandlerError> {
        let body = serde_json::to_string(value).map_err(|e| HandlerError::Failed(e.to_string()))?;
        Ok(Self {
            status: 200,
            content_type: "application/json",
            body,
        })
    }

    pub fn not_found(body: impl Into<String>) -> Self {
        Self::text(body).with_status(404)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }
}

/// Everything a handler can see about the request it serves.
pub struct Context<'d> {
    dispatcher: &'d Dispatcher,
    table: Arc<RouteTable>,
    route: RouteMatch,
    request: RequestInfo,
}

impl<'d> Context<'d> {
    pub(crate) fn new(
        dispatcher: &'d Dispatcher,
        table: Arc<RouteTable>,
        route: RouteMatch,
        request: RequestInfo,
    ) -> Self {
        Self {
            dispatcher,
            table,
            route,
            request,
        }
    }

    pub fn route(&self) -> &RouteMatch {
        &self.route
    }

    pub fn params(&self) -> &Params {
        self.route.params()
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.route.get(key)
    }

    /// Look up a parameter, failing with `BadRequest` when it is absent.
    pub fn require(&self, key: &str) -> Result<&str, HandlerError> {
        self.param(key)
            .ok_or_else(|| HandlerError::BadRequest(format!("missing parameter {key:?}")))
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request.request_id.as_deref()
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.request.query
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.request
            .query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// True when this request was issued by another handler.
    pub fn is_subrequest(&self) -> bool {
        self.request.depth > 0
    }

    /// Build a link to the route named `name`, or to the current route.
    ///
    /// Links to the current route fall back to its bound values unless
    /// `link` already carries current values.
    pub fn url_for(&self, name: Option<&str>, mut link: LinkParams) -> Result<String, RouteError> {
        let links = self.dispatcher.links();
        let target = match name {
            Some(name) => name,
            None => match self.route.name() {
                Some(current) => current,
                None => return Ok(links.build(self.route.route(), &link)),
            },
        };

        if self.route.name() == Some(target) && link.current.is_none() {
            link.current = Some(self.route.params().clone());
        }
        links.url_for(&self.table, target, &link)
    }

    /// Dispatch another path through the same table and handlers.
    pub fn subrequest(&self, path: &str, extra: &Params) -> Result<Reply, DispatchError> {
        let request = RequestInfo {
            request_id: self.request.request_id.clone(),
            query: Vec::new(),
            depth: self.request.depth + 1,
        };
        self.dispatcher.subrequest(path, extra, request)
    }
}
