//! Cookie-backed in-memory sessions.
//!
//! Sessions carry the login state plus one-shot data (flash messages,
//! validation errors, old form input) that is consumed by the next
//! page render. Session IDs travel in the `meridian_session` cookie.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use axum::http::{HeaderMap, header};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::forms::ValidationErrors;

/// Cookie that carries the session ID.
pub const SESSION_COOKIE: &str = "meridian_session";

/// Idle timeout before a session is discarded.
pub const SESSION_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

const FLASH_KEY_PREFIX: &str = "_flash.";
const ERRORS_KEY: &str = "_errors";
const OLD_INPUT_KEY: &str = "_old_input";
const AUTH_EMAIL_KEY: &str = "_auth.email";

/// Session data with expiration.
/// Values are stored as JSON so the store stays type-agnostic.
#[derive(Debug, Clone)]
struct Session {
    data: HashMap<String, JsonValue>,
    last_accessed: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            data: HashMap::new(),
            last_accessed: Instant::now(),
        }
    }

    fn touch(&mut self) {
        self.last_accessed = Instant::now();
    }

    fn is_expired(&self, max_age: Duration) -> bool {
        self.last_accessed.elapsed() > max_age
    }
}

/// Session ID plus the `Set-Cookie` value to attach when the ID is new.
#[derive(Debug, Clone)]
pub struct SessionTicket {
    pub id: String,
    pub set_cookie: Option<String>,
}

/// Thread-safe in-memory session store.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    max_age: Duration,
}

impl SessionStore {
    /// Creates an empty store with the given idle timeout.
    pub fn new(max_age: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            max_age,
        }
    }

    /// Returns the ID of the live session named by the request cookie.
    ///
    /// Expired sessions are removed on sight and report as absent.
    pub fn resolve(&self, headers: &HeaderMap) -> Option<String> {
        let id = session_id_from_headers(headers)?;
        let mut sessions = self.lock_write();

        if let Some(session) = sessions.get_mut(&id) {
            if !session.is_expired(self.max_age) {
                session.touch();
                return Some(id);
            }
            sessions.remove(&id);
        }
        None
    }

    /// Resolves the request session, creating one when absent or expired.
    ///
    /// The ticket carries a `Set-Cookie` value only when a new session
    /// was created. Creating a session also sweeps expired entries, so
    /// cookie-less traffic cannot grow the store without bound.
    pub fn ensure(&self, headers: &HeaderMap) -> SessionTicket {
        if let Some(id) = self.resolve(headers) {
            return SessionTicket {
                id,
                set_cookie: None,
            };
        }

        let id = Uuid::new_v4().to_string();
        let mut sessions = self.lock_write();
        sessions.retain(|_, session| !session.is_expired(self.max_age));
        sessions.insert(id.clone(), Session::new());
        let set_cookie = Some(session_cookie(&id, self.max_age));
        SessionTicket { id, set_cookie }
    }

    /// Moves a session under a fresh ID (for security after login).
    pub fn rotate(&self, old_id: &str) -> SessionTicket {
        let mut sessions = self.lock_write();
        let new_id = Uuid::new_v4().to_string();

        let session = sessions.remove(old_id).unwrap_or_else(Session::new);
        sessions.insert(new_id.clone(), session);

        let set_cookie = Some(session_cookie(&new_id, self.max_age));
        SessionTicket {
            id: new_id,
            set_cookie,
        }
    }

    /// Destroys a session.
    pub fn destroy(&self, id: &str) {
        self.lock_write().remove(id);
    }

    /// Stores a one-shot flash message under the given key.
    pub fn flash(&self, id: &str, key: &str, message: &str) {
        self.insert_value(id, &format!("{FLASH_KEY_PREFIX}{key}"), message.into());
    }

    /// Takes a flash message, clearing it from the session.
    pub fn take_flash(&self, id: &str, key: &str) -> Option<String> {
        match self.take_value(id, &format!("{FLASH_KEY_PREFIX}{key}")) {
            Some(JsonValue::String(message)) => Some(message),
            _ => None,
        }
    }

    /// Stores the validation error bag for the next render.
    pub fn put_errors(&self, id: &str, errors: &ValidationErrors) {
        let value = serde_json::to_value(errors).expect("error bag serializes to JSON");
        self.insert_value(id, ERRORS_KEY, value);
    }

    /// Takes the validation error bag, clearing it from the session.
    pub fn take_errors(&self, id: &str) -> Option<ValidationErrors> {
        self.take_value(id, ERRORS_KEY)
            .and_then(|value| serde_json::from_value(value).ok())
    }

    /// Stores submitted form input for repopulation on the next render.
    pub fn put_old_input(&self, id: &str, old: &HashMap<String, String>) {
        let value = serde_json::to_value(old).expect("old input serializes to JSON");
        self.insert_value(id, OLD_INPUT_KEY, value);
    }

    /// Takes the stored form input, clearing it from the session.
    pub fn take_old_input(&self, id: &str) -> Option<HashMap<String, String>> {
        self.take_value(id, OLD_INPUT_KEY)
            .and_then(|value| serde_json::from_value(value).ok())
    }

    /// Marks the session as logged in for the given account email.
    pub fn set_user(&self, id: &str, email: &str) {
        self.insert_value(id, AUTH_EMAIL_KEY, email.into());
    }

    /// Returns the logged-in account email, if any.
    pub fn user_email(&self, id: &str) -> Option<String> {
        match self.get_value(id, AUTH_EMAIL_KEY) {
            Some(JsonValue::String(email)) => Some(email),
            _ => None,
        }
    }

    fn insert_value(&self, id: &str, key: &str, value: JsonValue) {
        let mut sessions = self.lock_write();
        if let Some(session) = sessions.get_mut(id) {
            session.touch();
            session.data.insert(key.to_string(), value);
        }
    }

    fn take_value(&self, id: &str, key: &str) -> Option<JsonValue> {
        let mut sessions = self.lock_write();
        let session = sessions.get_mut(id)?;
        session.touch();
        session.data.remove(key)
    }

    fn get_value(&self, id: &str, key: &str) -> Option<JsonValue> {
        let sessions = self.sessions.read().expect("session store lock poisoned");
        sessions.get(id).and_then(|s| s.data.get(key).cloned())
    }

    fn lock_write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Session>> {
        self.sessions.write().expect("session store lock poisoned")
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SESSION_MAX_AGE)
    }
}

/// Extracts the session ID from the request `Cookie` header.
fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    for cookie in cookies.split(';') {
        if let Some((name, value)) = cookie.trim().split_once('=') {
            if name == SESSION_COOKIE && !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Builds the `Set-Cookie` value carrying a session ID.
fn session_cookie(id: &str, max_age: Duration) -> String {
    format!(
        "{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        max_age.as_secs()
    )
}

/// Builds the `Set-Cookie` value that removes the session cookie.
pub fn cleared_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("{SESSION_COOKIE}={id}")).unwrap(),
        );
        headers
    }

    #[test]
    fn ensure_issues_cookie_for_fresh_request() {
        let store = SessionStore::default();
        let ticket = store.ensure(&HeaderMap::new());

        let cookie = ticket.set_cookie.expect("new session sets a cookie");
        assert!(cookie.starts_with(&format!("{SESSION_COOKIE}={}", ticket.id)));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
    }

    #[test]
    fn ensure_reuses_live_session() {
        let store = SessionStore::default();
        let first = store.ensure(&HeaderMap::new());
        let second = store.ensure(&headers_with_cookie(&first.id));

        assert_eq!(first.id, second.id);
        assert!(second.set_cookie.is_none());
    }

    #[test]
    fn resolve_ignores_unknown_ids() {
        let store = SessionStore::default();
        assert!(store.resolve(&headers_with_cookie("bogus")).is_none());
    }

    #[test]
    fn expired_session_is_replaced() {
        let store = SessionStore::new(Duration::ZERO);
        let first = store.ensure(&HeaderMap::new());
        std::thread::sleep(Duration::from_millis(5));

        let headers = headers_with_cookie(&first.id);
        assert!(store.resolve(&headers).is_none());

        let second = store.ensure(&headers);
        assert_ne!(first.id, second.id);
        assert!(second.set_cookie.is_some());
    }

    #[test]
    fn creating_a_session_sweeps_expired_ones() {
        let store = SessionStore::new(Duration::ZERO);
        store.ensure(&HeaderMap::new());
        store.ensure(&HeaderMap::new());
        std::thread::sleep(Duration::from_millis(5));

        // Cookie-less requests must not accumulate dead entries.
        let ticket = store.ensure(&HeaderMap::new());

        let sessions = store.sessions.read().unwrap();
        assert_eq!(sessions.len(), 1);
        assert!(sessions.contains_key(&ticket.id));
    }

    #[test]
    fn flash_is_consumed_on_first_read() {
        let store = SessionStore::default();
        let ticket = store.ensure(&HeaderMap::new());

        store.flash(&ticket.id, "success", "saved");
        assert_eq!(store.take_flash(&ticket.id, "success").as_deref(), Some("saved"));
        assert!(store.take_flash(&ticket.id, "success").is_none());
    }

    #[test]
    fn errors_round_trip_and_clear() {
        let store = SessionStore::default();
        let ticket = store.ensure(&HeaderMap::new());

        let mut errors = ValidationErrors::default();
        errors.add("email", "The email field is required.");
        store.put_errors(&ticket.id, &errors);

        let restored = store.take_errors(&ticket.id).expect("errors stored");
        assert_eq!(restored.first("email"), Some("The email field is required."));
        assert!(store.take_errors(&ticket.id).is_none());
    }

    #[test]
    fn old_input_round_trips_and_clears() {
        let store = SessionStore::default();
        let ticket = store.ensure(&HeaderMap::new());

        let mut old = HashMap::new();
        old.insert("name".to_string(), "Jo".to_string());
        store.put_old_input(&ticket.id, &old);

        let restored = store.take_old_input(&ticket.id).expect("old input stored");
        assert_eq!(restored.get("name").map(String::as_str), Some("Jo"));
        assert!(store.take_old_input(&ticket.id).is_none());
    }

    #[test]
    fn rotate_moves_data_to_new_id() {
        let store = SessionStore::default();
        let ticket = store.ensure(&HeaderMap::new());
        store.set_user(&ticket.id, "demo@meridian.dev");

        let rotated = store.rotate(&ticket.id);
        assert_ne!(ticket.id, rotated.id);
        assert!(rotated.set_cookie.is_some());
        assert_eq!(
            store.user_email(&rotated.id).as_deref(),
            Some("demo@meridian.dev")
        );
        assert!(store.resolve(&headers_with_cookie(&ticket.id)).is_none());
    }

    #[test]
    fn destroy_forgets_the_session() {
        let store = SessionStore::default();
        let ticket = store.ensure(&HeaderMap::new());
        store.set_user(&ticket.id, "demo@meridian.dev");

        store.destroy(&ticket.id);
        assert!(store.user_email(&ticket.id).is_none());
        assert!(store.resolve(&headers_with_cookie(&ticket.id)).is_none());
    }

    #[test]
    fn cookie_parsing_handles_multiple_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; meridian_session=abc123; lang=en"),
        );
        assert_eq!(session_id_from_headers(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn cleared_cookie_expires_immediately() {
        let cookie = cleared_session_cookie();
        assert!(cookie.starts_with(&format!("{SESSION_COOKIE}=;")));
        assert!(cookie.contains("Max-Age=0"));
    }
}
