//! Admin settings page

use crate::handler::pages::escape_html;
use crate::settings::PromotionConfig;

const ADMIN_CSS: &str = include_str!("../../static/admin.css");
const ADMIN_JS: &str = include_str!("../../static/admin.js");

/// Message shown above the cards after a form submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    /// Slug saved; carries the new public URL
    SlugSaved(String),
    Error(String),
}

/// Tokens embedded in the page for the background actions
pub struct PageTokens {
    pub settings: String,
    pub upload: String,
    pub remove: String,
    pub media: String,
}

pub struct AdminPage<'a> {
    pub config: &'a PromotionConfig,
    pub promo_url: &'a str,
    /// Site origin shown in front of the slug input
    pub url_prefix: &'a str,
    pub tokens: &'a PageTokens,
    pub banner: Option<&'a Banner>,
}

/// `1234567` as `1,234,567`
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn render_banner(banner: Option<&Banner>) -> String {
    match banner {
        Some(Banner::SlugSaved(url)) => format!(
            r#"<div class="notice success">✅ ¡Configuración guardada! La nueva URL es: <strong>{}</strong></div>"#,
            escape_html(url)
        ),
        Some(Banner::Error(message)) => format!(
            r#"<div class="notice error">❌ {}</div>"#,
            escape_html(message)
        ),
        None => String::new(),
    }
}

fn render_current_file(config: &PromotionConfig) -> String {
    if !config.has_file() {
        return String::new();
    }
    let size = if config.file_size_label.is_empty() {
        String::new()
    } else {
        format!(" • {}", escape_html(&config.file_size_label))
    };
    format!(
        r#"<div class="current-file" id="current-file">
                <div class="file-icon">📕</div>
                <div class="file-info">
                    <div class="file-name">{name}</div>
                    <div class="file-meta">Actualizado: {updated}{size}</div>
                </div>
                <div class="file-actions">
                    <a href="{url}" target="_blank" class="button btn-view">👁️ Ver PDF</a>
                    <button type="button" class="btn-delete" id="delete-btn">🗑️ Eliminar</button>
                </div>
            </div>"#,
        name = escape_html(&config.file_name),
        updated = escape_html(&config.last_updated),
        url = escape_html(&config.file_url),
    )
}

impl AdminPage<'_> {
    pub fn render(&self) -> String {
        let cfg = self.config;
        let has_file = cfg.has_file();
        let last_updated = if cfg.last_updated.is_empty() {
            "-".to_string()
        } else {
            escape_html(&cfg.last_updated)
        };
        let (upload_icon, upload_text, upload_hint, upload_btn) = if has_file {
            (
                "✅",
                "¡PDF Activo!",
                "Haz clic para reemplazar el PDF actual",
                "🔄 Reemplazar PDF",
            )
        } else {
            (
                "📄",
                "Arrastra un PDF aquí o haz clic para seleccionar",
                "El PDF aparecerá automáticamente en la URL configurada",
                "📁 Seleccionar PDF",
            )
        };
        let promo_url = escape_html(self.promo_url);

        format!(
            r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="robots" content="noindex, nofollow">
    <title>Promociones - Administración</title>
    <style>{css}</style>
</head>
<body>
<div class="admin" id="promo-admin" data-media-token="{media_token}" data-upload-token="{upload_token}" data-remove-token="{remove_token}">
    <div class="admin-header">
        <span class="logo">🐷</span>
        <div>
            <h1>Promociones <span class="version">v{version}</span></h1>
        </div>
    </div>

    <div id="notice-area">{banner}</div>

    <div class="card">
        <h2>📊 Estadísticas</h2>
        <div class="stats">
            <div class="stat">
                <div class="stat-value">{views}</div>
                <div class="stat-label">Visitas totales</div>
            </div>
            <div class="stat">
                <div class="stat-value">{active}</div>
                <div class="stat-label">PDF Activo</div>
            </div>
            <div class="stat">
                <div class="stat-value">{last_updated}</div>
                <div class="stat-label">Última actualización</div>
            </div>
        </div>
    </div>

    <div class="card">
        <h2>📤 Subir PDF de Promociones</h2>
        <div class="upload-area{has_file_class}" id="upload-area">
            <div class="loading" id="upload-loading">
                <div class="spinner"></div>
                <p>Subiendo PDF...</p>
            </div>
            <div id="upload-content">
                <span class="upload-icon">{upload_icon}</span>
                <p class="upload-text">{upload_text}</p>
                <p class="upload-hint">{upload_hint}</p>
            </div>
            <button type="button" class="upload-btn" id="upload-btn">{upload_btn}</button>
        </div>
        <input type="file" id="file-input" accept="application/pdf,.pdf" hidden>
        {current_file}
    </div>

    <div class="card">
        <h2>🔗 URL Pública</h2>
        <div class="url-box">
            <a href="{promo_url}" target="_blank">{promo_url}</a>
            <button type="button" class="copy-btn" id="copy-btn" data-url="{promo_url}">📋 Copiar URL</button>
        </div>
        <p class="tip">💡 <strong>Tip:</strong> Usa esta URL para configurar el redirect del portal cautivo del WiFi de la tienda.</p>
    </div>

    <div class="card">
        <h2>⚙️ Configuración</h2>
        <form method="post" action="/" class="settings-form">
            <input type="hidden" name="_token" value="{settings_token}">
            <label for="slug">URL de la promoción</label>
            <div class="input-prefix">
                <span class="prefix">{url_prefix}</span>
                <input type="text" name="slug" id="slug" value="{slug}" placeholder="playas">
            </div>
            <p class="description">Define la última parte de la URL. Solo letras, números y guiones.</p>
            <button type="submit">💾 Guardar Configuración</button>
        </form>
    </div>

    <div class="admin-footer">🐷 Promociones v{version}</div>
</div>
<script>{js}</script>
</body>
</html>"#,
            css = ADMIN_CSS,
            js = ADMIN_JS,
            version = env!("CARGO_PKG_VERSION"),
            media_token = escape_html(&self.tokens.media),
            upload_token = escape_html(&self.tokens.upload),
            remove_token = escape_html(&self.tokens.remove),
            settings_token = escape_html(&self.tokens.settings),
            banner = render_banner(self.banner),
            views = format_thousands(cfg.view_count),
            active = if has_file { "✅" } else { "❌" },
            has_file_class = if has_file { " has-file" } else { "" },
            current_file = render_current_file(cfg),
            url_prefix = escape_html(self.url_prefix),
            slug = escape_html(&cfg.slug),
        )
    }
}
