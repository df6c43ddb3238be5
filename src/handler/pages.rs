//! Public promotion pages
//!
//! Three states: the viewer with the document embedded, the "coming soon"
//! placeholder, and the error page shown when the stored file vanished.

/// Escape text for HTML element content and quoted attribute values
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

const BASE_STYLE: &str = r"
* { margin: 0; padding: 0; box-sizing: border-box; }
body {
    min-height: 100vh;
    display: flex;
    align-items: center;
    justify-content: center;
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    padding: 20px;
}
.card {
    background: #fff;
    padding: 48px;
    border-radius: 20px;
    text-align: center;
    max-width: 500px;
    box-shadow: 0 20px 60px rgba(0, 0, 0, 0.3);
}
.icon { font-size: 72px; margin-bottom: 20px; }
h1 { margin-bottom: 15px; font-size: 1.8rem; }
p { color: #666; font-size: 1.1rem; line-height: 1.6; }
.footer { margin-top: 28px; padding-top: 18px; border-top: 1px solid #eee; color: #999; font-size: 0.85rem; }
";

const VIEWER_STYLE: &str = r"
* { margin: 0; padding: 0; box-sizing: border-box; }
html, body {
    height: 100%;
    width: 100%;
    overflow: hidden;
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
}
.viewer { display: flex; flex-direction: column; height: 100%; background: #f0f0f0; }
.viewer header {
    display: flex;
    justify-content: space-between;
    align-items: center;
    padding: 14px 20px;
    color: #fff;
    background: linear-gradient(135deg, #1e3a5f 0%, #2d5a87 100%);
    box-shadow: 0 2px 10px rgba(0, 0, 0, 0.2);
    z-index: 10;
}
.viewer h1 { font-size: 1.3rem; font-weight: 600; }
.download {
    display: flex;
    gap: 8px;
    padding: 10px 20px;
    border-radius: 25px;
    color: #fff;
    font-weight: 600;
    text-decoration: none;
    background: linear-gradient(135deg, #e63946 0%, #c1121f 100%);
}
.frame { flex: 1; position: relative; background: #525659; }
.frame iframe { width: 100%; height: 100%; border: none; }
.loading { position: absolute; top: 50%; left: 50%; transform: translate(-50%, -50%); color: #fff; text-align: center; }
.spinner {
    width: 50px;
    height: 50px;
    margin: 0 auto 15px;
    border: 4px solid rgba(255, 255, 255, 0.3);
    border-top-color: #fff;
    border-radius: 50%;
    animation: spin 1s linear infinite;
}
@keyframes spin { to { transform: rotate(360deg); } }
.viewer footer { padding: 8px 20px; text-align: center; font-size: 0.75rem; color: rgba(255, 255, 255, 0.7); background: #1e3a5f; }
@media (max-width: 768px) {
    .viewer h1 { font-size: 1rem; }
    .download span { display: none; }
}
";

fn document(title: &str, style: &str, extra_style: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="robots" content="noindex, nofollow">
    <title>{title}</title>
    <style>{style}{extra_style}</style>
</head>
<body>
{body}
</body>
</html>"#
    )
}

/// Page embedding the active document
pub fn viewer_page(site_name: &str, file_url: &str) -> String {
    let site = escape_html(site_name);
    let url = escape_html(file_url);
    let body = format!(
        r#"<div class="viewer">
    <header>
        <h1>🐷 ¡Promociones de la Semana!</h1>
        <a href="{url}" download class="download">📥 <span>Descargar</span></a>
    </header>
    <div class="frame">
        <div class="loading" id="loading">
            <div class="spinner"></div>
            <p>Cargando promociones...</p>
        </div>
        <iframe src="{url}#toolbar=0&amp;navpanes=0&amp;scrollbar=1" title="Promociones"
            onload="document.getElementById('loading').style.display='none';"></iframe>
    </div>
    <footer>{site}</footer>
</div>"#
    );
    document(&format!("Promociones - {site}"), VIEWER_STYLE, "", &body)
}

/// Page shown while no document is configured
pub fn placeholder_page(site_name: &str) -> String {
    let site = escape_html(site_name);
    let body = format!(
        r#"<div class="card">
    <div class="icon">🐷</div>
    <h1>¡Próximamente!</h1>
    <p>Las promociones de esta semana estarán disponibles muy pronto. ¡Vuelve a visitarnos!</p>
    <div class="footer">{site}</div>
</div>"#
    );
    document(
        &format!("Promociones - {site}"),
        BASE_STYLE,
        "body { background: linear-gradient(135deg, #1e3a5f 0%, #2d5a87 100%); } h1 { color: #1e3a5f; }",
        &body,
    )
}

/// Friendly error page; the message is shown verbatim (escaped)
pub fn error_page(site_name: &str, message: &str) -> String {
    let site = escape_html(site_name);
    let body = format!(
        r#"<div class="card">
    <div class="icon">🐷💔</div>
    <h1>¡Oops!</h1>
    <p>{}</p>
</div>"#,
        escape_html(message)
    );
    document(
        &format!("Error - {site}"),
        BASE_STYLE,
        "body { background: linear-gradient(135deg, #c1121f 0%, #e63946 100%); } h1 { color: #c1121f; }",
        &body,
    )
}
