//! Admin permission and request-forgery tokens
//!
//! Permission is plain HTTP Basic against the configured credentials.
//! Tokens are bound to a browser session (cookie) and to one action, so a
//! token lifted from the upload script cannot be replayed against remove.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hyper::HeaderMap;
use rand::RngCore;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::config::AdminConfig;

pub const SESSION_COOKIE: &str = "promo_admin_session";

/// State-changing operations that need their own token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminAction {
    Settings,
    Upload,
    Remove,
    Media,
}

impl AdminAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Settings => "settings",
            Self::Upload => "upload",
            Self::Remove => "remove",
            Self::Media => "media",
        }
    }
}

/// Check HTTP Basic credentials against the admin config
///
/// An empty configured password refuses everyone.
pub fn has_permission(headers: &HeaderMap, admin: &AdminConfig) -> bool {
    if admin.password.is_empty() {
        return false;
    }
    let Some((user, pass)) = basic_credentials(headers) else {
        return false;
    };
    // Evaluate both so timing does not reveal which half was wrong
    let user_ok = constant_time_eq(user.as_bytes(), admin.username.as_bytes());
    let pass_ok = constant_time_eq(pass.as_bytes(), admin.password.as_bytes());
    user_ok & pass_ok
}

fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(hyper::header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Session id carried by the admin cookie, if any
pub fn session_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(hyper::header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value for a fresh session
pub fn session_cookie(session: &str) -> String {
    format!("{SESSION_COOKIE}={session}; Path=/; HttpOnly; SameSite=Strict")
}

fn random_hex() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().fold(String::with_capacity(64), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

struct IssuedToken {
    value: String,
    expires: Instant,
}

#[derive(Default)]
struct Session {
    tokens: HashMap<AdminAction, IssuedToken>,
    expires: Option<Instant>,
}

/// In-memory session and token table
///
/// Restarting the process invalidates every session; the admin page just
/// has to be reloaded.
pub struct TokenRegistry {
    ttl: Duration,
    sessions: Mutex<HashMap<String, Session>>,
}

impl TokenRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Reuse a live session or open a new one
    ///
    /// Returns the session id and whether it was newly created.
    pub fn ensure_session(&self, current: Option<&str>) -> (String, bool) {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.retain(|_, s| s.expires.is_none_or(|e| e > now));

        if let Some(id) = current {
            if let Some(session) = sessions.get_mut(id) {
                session.expires = Some(now + self.ttl);
                return (id.to_string(), false);
            }
        }

        let id = random_hex();
        sessions.insert(
            id.clone(),
            Session {
                tokens: HashMap::new(),
                expires: Some(now + self.ttl),
            },
        );
        drop(sessions);
        (id, true)
    }

    /// Token for `action` in `session`, stable until it expires
    pub fn issue(&self, session: &str, action: AdminAction) -> String {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = sessions.entry(session.to_string()).or_default();
        entry.expires = Some(now + self.ttl);

        match entry.tokens.get(&action) {
            Some(token) if token.expires > now => token.value.clone(),
            _ => {
                let value = random_hex();
                entry.tokens.insert(
                    action,
                    IssuedToken {
                        value: value.clone(),
                        expires: now + self.ttl,
                    },
                );
                value
            }
        }
    }

    /// Check a submitted token for `action` in `session`
    pub fn verify(&self, session: Option<&str>, action: AdminAction, token: Option<&str>) -> bool {
        let (Some(session), Some(token)) = (session, token) else {
            return false;
        };
        let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions
            .get(session)
            .and_then(|s| s.tokens.get(&action))
            .is_some_and(|issued| {
                issued.expires > Instant::now()
                    && constant_time_eq(issued.value.as_bytes(), token.as_bytes())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::{HeaderValue, AUTHORIZATION, COOKIE};

    fn admin(password: &str) -> AdminConfig {
        AdminConfig {
            username: "admin".to_string(),
            password: password.to_string(),
            token_ttl_secs: 60,
        }
    }

    fn basic(user_pass: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let value = format!("Basic {}", STANDARD.encode(user_pass));
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&value).unwrap());
        headers
    }

    #[test]
    fn test_basic_auth() {
        assert!(has_permission(&basic("admin:s3cret"), &admin("s3cret")));
        assert!(!has_permission(&basic("admin:wrong"), &admin("s3cret")));
        assert!(!has_permission(&basic("root:s3cret"), &admin("s3cret")));
        assert!(!has_permission(&HeaderMap::new(), &admin("s3cret")));
    }

    #[test]
    fn test_empty_password_denies_everyone() {
        assert!(!has_permission(&basic("admin:"), &admin("")));
    }

    #[test]
    fn test_session_cookie_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; promo_admin_session=abc123"),
        );
        assert_eq!(session_from_headers(&headers).as_deref(), Some("abc123"));
        assert_eq!(session_from_headers(&HeaderMap::new()), None);
    }

    #[test]
    fn test_tokens_are_bound_to_session_and_action() {
        let registry = TokenRegistry::new(Duration::from_secs(60));
        let (session, created) = registry.ensure_session(None);
        assert!(created);
        assert_eq!(session.len(), 64);

        let upload = registry.issue(&session, AdminAction::Upload);
        assert_eq!(upload, registry.issue(&session, AdminAction::Upload));

        assert!(registry.verify(Some(&session), AdminAction::Upload, Some(&upload)));
        assert!(!registry.verify(Some(&session), AdminAction::Remove, Some(&upload)));
        assert!(!registry.verify(Some("other"), AdminAction::Upload, Some(&upload)));
        assert!(!registry.verify(Some(&session), AdminAction::Upload, None));
        assert!(!registry.verify(None, AdminAction::Upload, Some(&upload)));
    }

    #[test]
    fn test_expired_tokens_fail() {
        let registry = TokenRegistry::new(Duration::ZERO);
        let (session, _) = registry.ensure_session(None);
        let token = registry.issue(&session, AdminAction::Settings);
        assert!(!registry.verify(Some(&session), AdminAction::Settings, Some(&token)));
    }

    #[test]
    fn test_known_session_is_reused() {
        let registry = TokenRegistry::new(Duration::from_secs(60));
        let (session, _) = registry.ensure_session(None);
        let (again, created) = registry.ensure_session(Some(&session));
        assert_eq!(again, session);
        assert!(!created);
    }
}
