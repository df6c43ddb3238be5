//! Slug sanitization
//!
//! Turns free text from the settings form into a URL-safe path segment.

use crate::settings::DEFAULT_SLUG;

/// Sanitize free text into a lowercase `[a-z0-9-]` token
///
/// Tags are stripped, accents folded, separators turned into `-`,
/// everything else dropped. May return an empty string.
pub fn sanitize_slug(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;

    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            c if c.is_whitespace() || matches!(c, '_' | '.' | '/' | '-') => push_dash(&mut out),
            c if c.is_ascii_alphanumeric() => out.push(c.to_ascii_lowercase()),
            c => {
                if let Some(folded) = fold_accent(c) {
                    out.push_str(folded);
                }
            }
        }
    }

    out.trim_matches('-').to_string()
}

/// Sanitized slug, or the default when the result is empty or reserved
///
/// `reserved` holds the first path segments of the fixed public routes,
/// see [`super::RouteTable::reserved_segments`].
pub fn resolve_slug(input: &str, reserved: &[String]) -> String {
    let slug = sanitize_slug(input);
    if slug.is_empty() || reserved.iter().any(|r| *r == slug) {
        DEFAULT_SLUG.to_string()
    } else {
        slug
    }
}

fn push_dash(out: &mut String) {
    if !out.is_empty() && !out.ends_with('-') {
        out.push('-');
    }
}

/// Fold Latin-1 / Latin Extended-A letters to ASCII
const fn fold_accent(c: char) -> Option<&'static str> {
    let folded = match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'ā' | 'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Å' | 'Ā' => "a",
        'é' | 'è' | 'ê' | 'ë' | 'ē' | 'É' | 'È' | 'Ê' | 'Ë' | 'Ē' => "e",
        'í' | 'ì' | 'î' | 'ï' | 'ī' | 'Í' | 'Ì' | 'Î' | 'Ï' | 'Ī' => "i",
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ø' | 'ō' | 'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' | 'Ø' | 'Ō' => "o",
        'ú' | 'ù' | 'û' | 'ü' | 'ū' | 'Ú' | 'Ù' | 'Û' | 'Ü' | 'Ū' => "u",
        'ñ' | 'Ñ' => "n",
        'ç' | 'Ç' => "c",
        'ý' | 'ÿ' | 'Ý' => "y",
        'ß' => "ss",
        'æ' | 'Æ' => "ae",
        'œ' | 'Œ' => "oe",
        _ => return None,
    };
    Some(folded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_basic() {
        assert_eq!(sanitize_slug("playas"), "playas");
        assert_eq!(sanitize_slug("Ofertas De Verano"), "ofertas-de-verano");
        assert_eq!(sanitize_slug("  --Hola__Mundo--  "), "hola-mundo");
    }

    #[test]
    fn test_sanitize_accents_and_symbols() {
        assert_eq!(sanitize_slug("Promoción Año"), "promocion-ano");
        assert_eq!(sanitize_slug("50% off!!"), "50-off");
        assert_eq!(sanitize_slug("a.b/c"), "a-b-c");
    }

    #[test]
    fn test_sanitize_strips_tags() {
        assert_eq!(sanitize_slug("<b>bold</b> move"), "bold-move");
        assert_eq!(sanitize_slug("<script>"), "");
    }

    fn reserved(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        let fixed = reserved(&["healthz", "readyz", "uploads"]);
        assert_eq!(resolve_slug("", &fixed), DEFAULT_SLUG);
        assert_eq!(resolve_slug("!!!", &fixed), DEFAULT_SLUG);
        assert_eq!(resolve_slug("uploads", &fixed), DEFAULT_SLUG);
        assert_eq!(resolve_slug("Healthz", &fixed), DEFAULT_SLUG);
        assert_eq!(resolve_slug("Ofertas", &fixed), "ofertas");
    }

    #[test]
    fn test_resolve_follows_configured_prefix() {
        let fixed = reserved(&["healthz", "readyz", "files"]);
        assert_eq!(resolve_slug("Files", &fixed), DEFAULT_SLUG);
        assert_eq!(resolve_slug("uploads", &fixed), "uploads");
    }
}
