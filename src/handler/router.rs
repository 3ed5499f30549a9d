//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation,
//! route matching, dispatching and access logging.

use crate::config::AppState;
use crate::handler::assets::{self, Asset};
use crate::handler::tags;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::HeaderValue;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_none_match: Option<&'a str>,
}

/// Matched application route
#[derive(Debug, PartialEq, Eq)]
pub enum Route {
    Health,
    Tags,
    Asset { module_name: String, asset: Asset },
    NotFound,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B: Body>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();

    let early = check_request(&req, &state);
    let mut response = match early {
        Some(resp) => resp,
        None => {
            let ctx = RequestContext {
                path: req.uri().path(),
                query: req.uri().query(),
                is_head: req.method() == Method::HEAD,
                if_none_match: header_str(&req, "if-none-match"),
            };
            dispatch(&ctx, &state).await
        }
    };

    apply_common_headers(&mut response, &state);

    if state.access_log {
        log_access(&req, &response, peer_addr, started, &state);
    }

    Ok(response)
}

/// Method and body-size checks; `Some` short-circuits the request
fn check_request<B: Body>(req: &Request<B>, state: &AppState) -> Option<Response<Full<Bytes>>> {
    if let Some(resp) = check_http_method(req.method(), state.config.http.enable_cors) {
        return Some(resp);
    }
    check_body_size(req, state.config.http.max_body_size)
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method, enable_cors: bool) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(enable_cors)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response())
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let size_str = header_str(req, "content-length")?;
    match size_str.parse::<u64>() {
        Ok(size) if size > max_body_size => {
            logger::log_error(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            Some(http::build_413_response())
        }
        Err(_) => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: '{size_str}', skipping size check"
            ));
            None
        }
        _ => None,
    }
}

/// Match a request path to a route
///
/// The scripts route historically lives under the singular `module/` prefix;
/// `modules/` is accepted for it as well.
pub fn match_route(path: &str) -> Route {
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    let asset_route = |name: &str, asset: Asset| Route::Asset {
        module_name: http::percent_decode(name, false),
        asset,
    };

    match segments.as_slice() {
        ["healthz"] => Route::Health,
        ["tags"] => Route::Tags,
        ["modules", name, "metadata"] => asset_route(*name, Asset::Metadata),
        ["module" | "modules", name, "scripts"] => asset_route(*name, Asset::Scripts),
        _ => Route::NotFound,
    }
}

async fn dispatch(ctx: &RequestContext<'_>, state: &Arc<AppState>) -> Response<Full<Bytes>> {
    match match_route(ctx.path) {
        Route::Health => http::build_health_response("ok"),
        Route::Tags => tags::get_tags(ctx, state).await,
        Route::Asset { module_name, asset } => {
            assets::serve_asset(ctx, state, &module_name, asset).await
        }
        Route::NotFound => http::build_404_response(),
    }
}

fn apply_common_headers(response: &mut Response<Full<Bytes>>, state: &AppState) {
    let headers = response.headers_mut();
    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        headers.insert("Server", server);
    }
    if state.config.http.enable_cors {
        headers.insert("Access-Control-Allow-Origin", HeaderValue::from_static("*"));
    }
}

fn log_access<B>(
    req: &Request<B>,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    started: Instant,
    state: &AppState,
) {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = http_version(req.version()).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = usize::try_from(response.body().size_hint().exact().unwrap_or(0))
        .unwrap_or(usize::MAX);
    entry.referer = header_str(req, "referer").map(ToString::to_string);
    entry.user_agent = header_str(req, "user-agent").map(ToString::to_string);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}

fn http_version(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

fn header_str<'a, B>(req: &'a Request<B>, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}
