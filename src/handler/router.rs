//! Public request dispatch
//!
//! Entry point for the public server: method validation, route table
//! lookup, dispatch and access logging.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use super::{media, promotion};
use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::routing::PublicRoute;

const ALLOWED_METHODS: &str = "GET, HEAD, OPTIONS";

/// Request information the handlers need after the body is gone
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<String>,
    pub range_header: Option<String>,
}

/// Main entry point for public HTTP requests
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path();

    let response = match check_http_method(&method) {
        Some(resp) => resp,
        None => {
            let ctx = RequestContext {
                path,
                is_head: method == Method::HEAD,
                if_none_match: http::header_str(req.headers(), "if-none-match").map(ToString::to_string),
                range_header: http::header_str(req.headers(), "range").map(ToString::to_string),
            };
            route_request(&ctx, &state).await
        }
    };

    if state.cached_access_log.load(Ordering::Relaxed) {
        let mut entry = AccessLogEntry::new(peer.ip().to_string(), &method, path.to_string())
            .with_headers(req.headers());
        entry.query = req.uri().query().map(ToString::to_string);
        entry.http_version = format!("{:?}", req.version()).trim_start_matches("HTTP/").to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = usize::try_from(response.body().size_hint().exact().unwrap_or(0))
            .unwrap_or(usize::MAX);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Only GET and HEAD reach the routes
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(http::build_options_response(ALLOWED_METHODS)),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response(ALLOWED_METHODS))
        }
    }
}

async fn route_request(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    let routes = state.current_routes();
    match routes.resolve(ctx.path) {
        Some(PublicRoute::Liveness | PublicRoute::Readiness) => http::build_health_response("ok"),
        Some(PublicRoute::Media) => {
            media::serve_media(
                ctx,
                Path::new(&state.config.storage.upload_dir),
                &state.config.storage.url_prefix,
            )
            .await
        }
        Some(PublicRoute::Promotion) => promotion::serve_promotion(state, ctx.is_head).await,
        None => http::build_404_response(),
    }
}
