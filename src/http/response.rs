//! Response conversion.
//!
//! # Responsibilities
//! - Turn handler replies into HTTP responses
//! - Map dispatch errors to status codes
//!
//! # Design Decisions
//! - A missing handler is a 404 only when the route itself was not found
//! - Error bodies are plain text; details go to the log

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::dispatch::{DispatchError, HandlerError, Reply};

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, self.body).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(self.content_type),
        );
        response
    }
}

/// Status code for a failed dispatch.
pub fn status_for(err: &DispatchError, route_not_found: bool) -> StatusCode {
    match err {
        DispatchError::HandlerNotFound { .. } if route_not_found => StatusCode::NOT_FOUND,
        DispatchError::Declined { .. } => StatusCode::NOT_FOUND,
        DispatchError::Handler {
            source: HandlerError::BadRequest(_),
            ..
        } => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Build the response for a failed dispatch.
pub fn error_response(err: &DispatchError, route_not_found: bool) -> Response {
    let status = status_for(err, route_not_found);
    let body = match status {
        StatusCode::NOT_FOUND => "Not Found".to_string(),
        StatusCode::BAD_REQUEST => err.to_string(),
        _ => "Internal Server Error".to_string(),
    };
    (status, body).into_response()
}
