//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: body-size validation, route
//! matching, method checks, dispatch and access logging.

use crate::config::AppState;
use crate::handler::wiki;
use crate::http::{self, form};
use crate::logger::{self, AccessLogEntry};
use crate::routing::{self, RouteKind, RouteMatch};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderName, CONTENT_LENGTH, CONTENT_TYPE, REFERER, USER_AGENT};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request information the wiki handlers need, with the body already read
pub struct RequestContext<'a> {
    pub method: &'a Method,
    /// Raw (still percent-encoded) request path
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub body: &'a [u8],
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let started = Instant::now();
    let mut entry = state
        .access_log_enabled()
        .then(|| access_entry(&req, peer_addr));

    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(ToString::to_string);
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    let max_body_size = state.config.http.max_body_size;

    let mut response = if let Some(resp) = check_body_size(&req, max_body_size) {
        resp
    } else {
        match read_body(req, max_body_size).await {
            Ok(body) => {
                let ctx = RequestContext {
                    method: &method,
                    path: &path,
                    query: query.as_deref(),
                    content_type: content_type.as_deref(),
                    body: &body,
                };
                dispatch(&ctx, &state).await
            }
            Err(resp) => resp,
        }
    };

    http::set_server_header(&mut response, &state.config.http.server_name);

    if let Some(entry) = entry.as_mut() {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Match the decoded path against the route table and run the bound handler
pub async fn dispatch(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    let Some(path) = form::decode_path(ctx.path) else {
        return http::build_404_response();
    };
    let Some(RouteMatch { kind, title }) = routing::match_route(&path) else {
        return http::build_404_response();
    };

    if !kind.allows(ctx.method) {
        logger::log_warning(&format!("Method not allowed: {} {path}", ctx.method));
        return http::build_405_response(kind.allowed_methods());
    }

    let is_head = *ctx.method == Method::HEAD;
    match kind {
        RouteKind::View => wiki::view(state, title, is_head).await,
        RouteKind::Edit => wiki::edit(state, title, is_head).await,
        RouteKind::Save => wiki::save(state, title, ctx).await,
        RouteKind::CreateNewPage => wiki::create_new_page(state, title, is_head),
    }
}

fn access_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get(CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_warning(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', relying on body limit"
                ));
                None
            }
            _ => None,
        },
    )
}

/// Collect the request body, enforcing the size limit for bodies without
/// a trustworthy Content-Length
async fn read_body<B>(req: Request<B>, max_body_size: u64) -> Result<Bytes, Response<Full<Bytes>>>
where
    B: Body<Data = Bytes>,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_warning(&format!("Request body exceeded {max_body_size} bytes"));
            Err(http::build_413_response())
        }
        Err(e) => {
            logger::log_error(&format!("Failed to read request body: {e}"));
            Err(http::build_text_response(
                hyper::StatusCode::BAD_REQUEST,
                "Failed to read request body",
            ))
        }
    }
}
