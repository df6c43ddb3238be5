// Admin module entry
// Settings page, settings form and the background actions the page calls

pub mod actions;
pub mod auth;
mod page;
mod response;

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::sync::Arc;

use crate::config::AppState;
use crate::http::{self, BoxError};
use crate::logger;

pub use auth::TokenRegistry;

/// Admin route handler
///
/// Dispatches to handler functions based on request path and method
pub async fn handle_admin_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let path = req.uri().path().to_string();
    let method = req.method().clone();

    let response = match (method, path.as_str()) {
        (m @ (Method::GET | Method::HEAD), "/") => {
            if auth::has_permission(req.headers(), &state.config.admin) {
                actions::serve_page(&state, req.headers(), StatusCode::OK, None, m == Method::HEAD)
            } else {
                logger::log_admin_action("page", 401, "missing credentials");
                http::build_401_response(&state.config.site.name)
            }
        }
        (Method::POST, "/") => actions::save_settings(req, &state).await,
        (Method::POST, "/actions/upload") => actions::upload(req, &state).await,
        (Method::POST, "/actions/remove") => actions::remove(req, &state).await,
        (Method::POST, "/media") => actions::upload_media(req, &state).await,
        (Method::OPTIONS, _) => http::build_options_response("GET, HEAD, POST, OPTIONS"),
        (_, "/") => http::build_405_response("GET, HEAD, POST"),
        (_, "/actions/upload" | "/actions/remove" | "/media") => http::build_405_response("POST"),
        _ => http::build_404_response(),
    };
    Ok(response)
}
