//! Admin page, settings form and background actions

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, SET_COOKIE};
use hyper::{HeaderMap, Request, Response, StatusCode};
use std::collections::HashMap;

use super::auth::{self, AdminAction};
use super::page::{AdminPage, Banner, PageTokens};
use super::response;
use crate::config::AppState;
use crate::error::{PromoError, PromoResult};
use crate::http::{self, mime, BoxError};
use crate::logger;
use crate::settings::{now_label, FileRef};
use crate::storage::sanitize_file_name;

pub const TOKEN_HEADER: &str = "x-promo-token";

const TOO_LARGE: &str = "El archivo es demasiado grande.";

/// Render the admin page, opening a session cookie when needed
pub fn serve_page(
    state: &AppState,
    headers: &HeaderMap,
    status: StatusCode,
    banner: Option<&Banner>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let current = auth::session_from_headers(headers);
    let (session, created) = state.tokens.ensure_session(current.as_deref());
    let tokens = PageTokens {
        settings: state.tokens.issue(&session, AdminAction::Settings),
        upload: state.tokens.issue(&session, AdminAction::Upload),
        remove: state.tokens.issue(&session, AdminAction::Remove),
        media: state.tokens.issue(&session, AdminAction::Media),
    };

    let config = state.store.get();
    let promo_url = state.config.site.home_url(&config.slug);
    let url_prefix = state.config.site.home_url("");
    let html = AdminPage {
        config: &config,
        promo_url: &promo_url,
        url_prefix: &url_prefix,
        tokens: &tokens,
        banner,
    }
    .render();

    let mut resp = http::build_html_response(status, html, is_head);
    if created {
        match HeaderValue::from_str(&auth::session_cookie(&session)) {
            Ok(v) => {
                resp.headers_mut().insert(SET_COOKIE, v);
            }
            Err(e) => logger::log_error(&format!("Invalid session cookie: {e}")),
        }
    }
    resp
}

/// Read an urlencoded form body, `None` when it exceeds the size limit
async fn read_form<B>(body: B, headers: &HeaderMap, limit: u64) -> Option<HashMap<String, String>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    if http::content_length(headers).is_some_and(|len| len > limit) {
        return None;
    }
    let bytes = http::read_body(body, limit).await?;
    Some(http::parse_form(&bytes))
}

/// `POST /` settings form
///
/// Saves the slug only when it changed, then rebuilds the public routes.
pub async fn save_settings<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let (parts, body) = req.into_parts();
    if !auth::has_permission(&parts.headers, &state.config.admin) {
        logger::log_admin_action("settings", 401, "missing credentials");
        return http::build_401_response(&state.config.site.name);
    }
    let Some(form) = read_form(body, &parts.headers, state.config.http.max_body_size).await else {
        return http::build_413_response();
    };

    let session = auth::session_from_headers(&parts.headers);
    let token = form.get("_token").map(String::as_str);
    if !state
        .tokens
        .verify(session.as_deref(), AdminAction::Settings, token)
    {
        let err = PromoError::InvalidToken;
        logger::log_admin_action("settings", err.status().as_u16(), &err.to_string());
        let banner = Banner::Error(err.to_string());
        return serve_page(state, &parts.headers, err.status(), Some(&banner), false);
    }

    let new_slug = state.resolve_slug(form.get("slug").map_or("", String::as_str));
    let old_slug = state.store.get().slug;
    if new_slug == old_slug {
        return serve_page(state, &parts.headers, StatusCode::OK, None, false);
    }

    match state.store.update(&mut |cfg| cfg.slug.clone_from(&new_slug)) {
        Ok(_) => {
            state.flush_routes();
            logger::log_slug_changed(&old_slug, &new_slug);
            logger::log_admin_action("settings", 200, &format!("slug set to {new_slug}"));
            let banner = Banner::SlugSaved(state.config.site.home_url(&new_slug));
            serve_page(state, &parts.headers, StatusCode::OK, Some(&banner), false)
        }
        Err(e) => {
            logger::log_store_failure("saving slug", &e);
            let banner = Banner::Error(e.to_string());
            serve_page(state, &parts.headers, e.status(), Some(&banner), false)
        }
    }
}

/// Token first, then credentials; both must pass before any state change
fn authorize(
    state: &AppState,
    headers: &HeaderMap,
    action: AdminAction,
    token: Option<&str>,
) -> PromoResult<()> {
    let session = auth::session_from_headers(headers);
    if !state.tokens.verify(session.as_deref(), action, token) {
        return Err(PromoError::InvalidToken);
    }
    if !auth::has_permission(headers, &state.config.admin) {
        return Err(PromoError::PermissionDenied);
    }
    Ok(())
}

fn finish(action: AdminAction, result: PromoResult<&str>) -> Response<Full<Bytes>> {
    match result {
        Ok(message) => {
            logger::log_admin_action(action.as_str(), 200, message);
            response::success::<()>(message, None)
        }
        Err(e) => {
            logger::log_admin_action(action.as_str(), e.status().as_u16(), &e.to_string());
            response::failure(&e)
        }
    }
}

fn too_large(action: AdminAction) -> Response<Full<Bytes>> {
    logger::log_admin_action(action.as_str(), 413, TOO_LARGE);
    response::failure_with_status(StatusCode::PAYLOAD_TOO_LARGE, TOO_LARGE)
}

/// `POST /actions/upload`: point the promotion at a stored document
pub async fn upload<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let (parts, body) = req.into_parts();
    let Some(form) = read_form(body, &parts.headers, state.config.http.max_body_size).await else {
        return too_large(AdminAction::Upload);
    };

    let result = authorize(
        state,
        &parts.headers,
        AdminAction::Upload,
        form.get("_token").map(String::as_str),
    )
    .and_then(|()| validate_upload(&form))
    .and_then(|file| {
        let updated_at = now_label();
        state
            .store
            .update(&mut |cfg| cfg.attach_file(file.clone(), updated_at.clone()))
    })
    .map(|_| "PDF actualizado correctamente.");

    finish(AdminAction::Upload, result)
}

/// `POST /actions/remove`: drop the document, keep slug and counter
pub async fn remove<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let (parts, body) = req.into_parts();
    let Some(form) = read_form(body, &parts.headers, state.config.http.max_body_size).await else {
        return too_large(AdminAction::Remove);
    };

    let result = authorize(
        state,
        &parts.headers,
        AdminAction::Remove,
        form.get("_token").map(String::as_str),
    )
    .and_then(|()| state.store.update(&mut |cfg| cfg.clear_file()))
    .map(|_| "PDF eliminado.");

    finish(AdminAction::Remove, result)
}

/// `POST /media?filename=<name>`: store raw document bytes
pub async fn upload_media<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let (parts, body) = req.into_parts();
    let action = AdminAction::Media;

    let token = http::header_str(&parts.headers, TOKEN_HEADER);
    if let Err(e) = authorize(state, &parts.headers, action, token) {
        return finish(action, Err(e));
    }

    let limit = state.config.http.max_body_size;
    if http::content_length(&parts.headers).is_some_and(|len| len > limit) {
        return too_large(action);
    }
    let Some(data) = http::read_body(body, limit).await else {
        return too_large(action);
    };

    let query = http::parse_form(parts.uri.query().unwrap_or_default().as_bytes());
    let Some(filename) = query.get("filename").filter(|f| !f.trim().is_empty()) else {
        return finish(action, Err(PromoError::invalid("Falta el nombre del archivo.")));
    };

    match state.media.store(filename, &data).await {
        Ok(attachment) => {
            logger::log_admin_action(action.as_str(), 200, &attachment.url);
            response::success("Archivo subido.", Some(attachment))
        }
        Err(e) => finish(action, Err(e)),
    }
}

/// Validate the document reference sent by the upload action
pub fn validate_upload(form: &HashMap<String, String>) -> PromoResult<FileRef> {
    let invalid = || PromoError::invalid("Datos del PDF inválidos.");
    let field = |name: &str| form.get(name).map_or("", |v| v.trim());

    let id = field("file_id")
        .parse::<u64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(invalid)?;
    let url = field("file_url");
    if !is_http_url(url) {
        return Err(invalid());
    }

    let name = sanitize_file_name(field("file_name"));
    if !matches!(mime::check_filetype(&name), Some(("pdf", _))) {
        return Err(PromoError::invalid("El archivo debe ser un PDF."));
    }

    Ok(FileRef {
        id,
        url: url.to_string(),
        name,
        size_label: sanitize_text_field(field("file_size")),
    })
}

fn is_http_url(input: &str) -> bool {
    url::Url::parse(input)
        .is_ok_and(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
}

/// Plain single-line text: tags and control characters removed, whitespace collapsed
pub fn sanitize_text_field(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            c if c.is_whitespace() => {
                if !out.is_empty() && !out.ends_with(' ') {
                    out.push(' ');
                }
            }
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out.trim_end().to_string()
}
