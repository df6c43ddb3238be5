//! End-to-end flows through the public and admin dispatchers

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Method, Request, Response, StatusCode};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::admin;
use crate::config::{AppState, Config};
use crate::handler;
use crate::install;
use crate::settings::{MemorySettingsStore, SharedSettingsStore};

const PASSWORD: &str = "s3cret";
const PDF_URL: &str = "http://localhost:8080/uploads/promotions/promo.pdf";

struct Harness {
    state: Arc<AppState>,
    store: SharedSettingsStore,
    upload_dir: std::path::PathBuf,
    _dir: tempfile::TempDir,
}

/// Session cookie plus the tokens embedded in one admin page render
struct AdminSession {
    cookie: String,
    settings: String,
    upload: String,
    remove: String,
    media: String,
}

fn harness() -> Harness {
    harness_with(|_| {})
}

fn harness_with(adjust: impl FnOnce(&mut Config)) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let upload_dir = dir.path().join("uploads");

    let mut config = Config::load_from("does-not-exist-promo.toml").unwrap();
    config.site.base_url = "http://localhost:8080".to_string();
    config.storage.upload_dir = upload_dir.to_string_lossy().into_owned();
    config.admin.password = PASSWORD.to_string();
    adjust(&mut config);

    let store: SharedSettingsStore = Arc::new(MemorySettingsStore::new());
    install::run(&config, store.as_ref()).unwrap();
    let state = Arc::new(AppState::new(config, Arc::clone(&store)));
    state.cached_access_log.store(false, Ordering::Relaxed);

    Harness {
        state,
        store,
        upload_dir,
        _dir: dir,
    }
}

fn peer() -> SocketAddr {
    "203.0.113.9:51000".parse().unwrap()
}

fn basic_auth(password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("admin:{password}")))
}

async fn body_string(resp: Response<Full<Bytes>>) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(resp: Response<Full<Bytes>>) -> serde_json::Value {
    serde_json::from_str(&body_string(resp).await).unwrap()
}

fn attr(html: &str, prefix: &str) -> String {
    let start = html.find(prefix).unwrap() + prefix.len();
    let end = html[start..].find('"').unwrap() + start;
    html[start..end].to_string()
}

fn encode_form(pairs: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

impl Harness {
    async fn public(&self, method: Method, path: &str) -> Response<Full<Bytes>> {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .body(Full::new(Bytes::new()))
            .unwrap();
        handler::handle_request(req, Arc::clone(&self.state), peer())
            .await
            .unwrap()
    }

    async fn visit(&self, path: &str) -> (StatusCode, String) {
        let resp = self.public(Method::GET, path).await;
        (resp.status(), body_string(resp).await)
    }

    async fn admin(&self, req: Request<Full<Bytes>>) -> Response<Full<Bytes>> {
        admin::handle_admin_request(req, Arc::clone(&self.state))
            .await
            .unwrap()
    }

    async fn open_admin(&self) -> AdminSession {
        let req = Request::builder()
            .uri("/")
            .header("Authorization", basic_auth(PASSWORD))
            .body(Full::new(Bytes::new()))
            .unwrap();
        let resp = self.admin(req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = resp.headers()["Set-Cookie"]
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();
        let html = body_string(resp).await;

        AdminSession {
            cookie,
            settings: attr(&html, r#"name="_token" value=""#),
            upload: attr(&html, r#"data-upload-token=""#),
            remove: attr(&html, r#"data-remove-token=""#),
            media: attr(&html, r#"data-media-token=""#),
        }
    }

    async fn post_form(
        &self,
        path: &str,
        session: &AdminSession,
        password: &str,
        pairs: &[(&str, &str)],
    ) -> Response<Full<Bytes>> {
        let req = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header("Authorization", basic_auth(password))
            .header("Cookie", &session.cookie)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(Full::new(Bytes::from(encode_form(pairs))))
            .unwrap();
        self.admin(req).await
    }

    async fn upload(&self, session: &AdminSession, name: &str, url: &str) -> Response<Full<Bytes>> {
        self.post_form(
            "/actions/upload",
            session,
            PASSWORD,
            &[
                ("file_id", "5"),
                ("file_url", url),
                ("file_name", name),
                ("file_size", "1.2 MB"),
                ("_token", &session.upload),
            ],
        )
        .await
    }

    fn write_document(&self, relative: &str) {
        let path = self.upload_dir.join(relative);
        std::fs::create_dir_all(path.parent().unwrap_or(Path::new("."))).unwrap();
        std::fs::write(path, b"%PDF-1.4 promo").unwrap();
    }
}

#[tokio::test]
async fn test_full_promotion_lifecycle() {
    let h = harness();

    // Default install
    let cfg = h.store.get();
    assert_eq!(cfg.slug, "playas");
    assert_eq!(cfg.view_count, 0);
    assert!(!cfg.has_file());

    let (status, html) = h.visit("/playas").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("¡Próximamente!"));
    assert_eq!(h.store.get().view_count, 1);

    // Upload
    h.write_document("promotions/promo.pdf");
    let session = h.open_admin().await;
    let resp = h.upload(&session, "promo.pdf", PDF_URL).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "PDF actualizado correctamente.");

    let cfg = h.store.get();
    assert!(cfg.has_file());
    assert_eq!(cfg.file_id, 5);
    assert_eq!(cfg.file_url, PDF_URL);
    assert!(!cfg.last_updated.is_empty());

    let (_, html) = h.visit("/playas").await;
    assert!(html.contains(&format!("{PDF_URL}#toolbar=0")));
    assert_eq!(h.store.get().view_count, 2);

    // Remove
    let resp = h
        .post_form("/actions/remove", &session, PASSWORD, &[("_token", &session.remove)])
        .await;
    assert_eq!(body_json(resp).await["message"], "PDF eliminado.");
    let cfg = h.store.get();
    assert!(!cfg.has_file());
    assert_eq!(cfg.file_id, 0);
    assert_eq!(cfg.view_count, 2);
    assert_eq!(cfg.slug, "playas");

    // Slug change
    let resp = h
        .post_form(
            "/",
            &session,
            PASSWORD,
            &[("slug", "Ofertas"), ("_token", &session.settings)],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_string(resp).await;
    assert!(html.contains("La nueva URL es: <strong>http://localhost:8080/ofertas</strong>"));

    let (status, _) = h.visit("/playas").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, html) = h.visit("/ofertas/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("¡Próximamente!"));
    assert_eq!(h.store.get().view_count, 3);
}

#[tokio::test]
async fn test_missing_file_still_counts_view() {
    let h = harness();
    let session = h.open_admin().await;
    let resp = h.upload(&session, "promo.pdf", PDF_URL).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let (status, html) = h.visit("/playas").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("¡Oops!"));
    assert!(html.contains("El PDF no se encontró"));
    assert_eq!(h.store.get().view_count, 1);
}

#[tokio::test]
async fn test_actions_require_token_and_permission() {
    let h = harness();
    let session = h.open_admin().await;
    let before = h.store.get();

    // Missing token
    let resp = h
        .post_form(
            "/actions/upload",
            &session,
            PASSWORD,
            &[("file_id", "5"), ("file_url", PDF_URL), ("file_name", "promo.pdf")],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(resp).await["message"],
        "Sesión expirada. Recarga la página e intenta de nuevo."
    );

    // Token of another action
    let resp = h
        .post_form("/actions/remove", &session, PASSWORD, &[("_token", &session.upload)])
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Valid token, wrong credentials
    let resp = h
        .post_form("/actions/remove", &session, "wrong", &[("_token", &session.remove)])
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(resp).await["message"],
        "No tienes permisos para realizar esta acción."
    );

    // Settings form with a bad token re-renders without saving
    let resp = h
        .post_form("/", &session, PASSWORD, &[("slug", "ofertas"), ("_token", "nope")])
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(body_string(resp).await.contains("Sesión expirada"));

    assert_eq!(h.store.get(), before);
    assert_eq!(h.visit("/playas").await.0, StatusCode::OK);
}

#[tokio::test]
async fn test_upload_rejects_non_pdf() {
    let h = harness();
    let session = h.open_admin().await;
    let before = h.store.get();

    let resp = h
        .upload(&session, "photo.png", "http://localhost:8080/uploads/photo.png")
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "El archivo debe ser un PDF.");
    assert_eq!(h.store.get(), before);
}

#[tokio::test]
async fn test_admin_page_requires_credentials() {
    let h = harness();
    let req = Request::builder()
        .uri("/")
        .body(Full::new(Bytes::new()))
        .unwrap();
    let resp = h.admin(req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key("WWW-Authenticate"));
}

#[tokio::test]
async fn test_media_upload_then_attach_and_serve() {
    let h = harness();
    let session = h.open_admin().await;

    let req = Request::builder()
        .method(Method::POST)
        .uri("/media?filename=Promo%20Semana.pdf")
        .header("Authorization", basic_auth(PASSWORD))
        .header("Cookie", &session.cookie)
        .header("X-Promo-Token", &session.media)
        .body(Full::new(Bytes::from_static(b"%PDF-1.4 weekly")))
        .unwrap();
    let resp = h.admin(req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    let data = &json["data"];
    assert_eq!(data["id"], 1);
    assert_eq!(data["filename"], "Promo-Semana.pdf");
    let url = data["url"].as_str().unwrap().to_string();
    assert_eq!(url, "http://localhost:8080/uploads/promotions/Promo-Semana.pdf");

    let id = data["id"].to_string();
    let resp = h
        .post_form(
            "/actions/upload",
            &session,
            PASSWORD,
            &[
                ("file_id", &id),
                ("file_url", &url),
                ("file_name", data["filename"].as_str().unwrap()),
                ("file_size", data["size_label"].as_str().unwrap()),
                ("_token", &session.upload),
            ],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let (_, html) = h.visit("/playas").await;
    assert!(html.contains("Promo-Semana.pdf#toolbar=0"));

    let resp = h
        .public(Method::GET, "/uploads/promotions/Promo-Semana.pdf")
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["Content-Type"], "application/pdf");
    assert_eq!(body_string(resp).await, "%PDF-1.4 weekly");

    // Install marker and media index are never served
    let resp = h.public(Method::GET, "/uploads/promotions/.htaccess").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_public_server_only_serves_reads() {
    let h = harness();
    let resp = h.public(Method::POST, "/playas").await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(h.store.get().view_count, 0);

    let resp = h.public(Method::HEAD, "/playas").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(h.store.get().view_count, 1);

    let (status, body) = h.visit("/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"status":"ok"}"#);
}

#[tokio::test]
async fn test_media_upload_over_limit_is_refused() {
    let h = harness_with(|config| config.http.max_body_size = 16);
    let session = h.open_admin().await;
    let before = h.store.get();

    let req = Request::builder()
        .method(Method::POST)
        .uri("/media?filename=big.pdf")
        .header("Authorization", basic_auth(PASSWORD))
        .header("Cookie", &session.cookie)
        .header("X-Promo-Token", &session.media)
        .body(Full::new(Bytes::from(vec![b'%'; 64])))
        .unwrap();
    let resp = h.admin(req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let json = body_json(resp).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "El archivo es demasiado grande.");

    assert_eq!(h.store.get(), before);
    assert!(!h.upload_dir.join("promotions/big.pdf").exists());
}
