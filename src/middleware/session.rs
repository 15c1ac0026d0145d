use axum::http::HeaderMap;
use axum_extra::extract::PrivateCookieJar;
use axum_extra::extract::cookie::Cookie;
use time::OffsetDateTime;

use super::config::AuthSettings;
use super::cookies;
use crate::error::AuthError;
use crate::types::{CodeVerifier, OAuthState};

/// Clock skew tolerated for credentials issued "in the future".
const ISSUE_SKEW_SECS: i64 = 60;

/// Per-browser login state: the pending `(state, verifier)` pair and the
/// durable session credential.
///
/// The edge filter and the page guard both decide through
/// [`has_credential`](SessionStore::has_credential), so they always agree.
pub trait SessionStore {
    /// Store a pending attempt, replacing any previous one.
    fn begin(&mut self, state: &OAuthState, verifier: &CodeVerifier);

    /// Take the pending verifier if `received_state` matches.
    ///
    /// The pending pair is deleted on every call, matched or not.
    ///
    /// # Errors
    ///
    /// - [`AuthError::MissingVerifier`] if nothing is pending or the verifier is gone
    /// - [`AuthError::StateMismatch`] if `received_state` differs from the stored state
    fn consume(&mut self, received_state: &str) -> Result<CodeVerifier, AuthError>;

    /// Drop any pending attempt without checking it.
    fn discard_pending(&mut self);

    fn has_credential(&self) -> bool;

    fn set_credential(&mut self);

    fn clear_credential(&mut self);
}

fn check_pending(
    stored_state: Option<String>,
    stored_verifier: Option<String>,
    received_state: &str,
) -> Result<CodeVerifier, AuthError> {
    let stored_state = stored_state
        .filter(|s| !s.is_empty())
        .ok_or(AuthError::MissingVerifier)?;
    if stored_state != received_state {
        return Err(AuthError::StateMismatch);
    }
    stored_verifier
        .filter(|v| !v.is_empty())
        .map(CodeVerifier)
        .ok_or(AuthError::MissingVerifier)
}

fn credential_is_live(issued_at: i64, ttl_days: i64, now: i64) -> bool {
    let age = now - issued_at;
    age > -ISSUE_SKEW_SECS && age < ttl_days.saturating_mul(86_400)
}

/// [`SessionStore`] backed by encrypted cookies.
///
/// Mutations accumulate in the wrapped jar; return
/// [`into_jar`](CookieSession::into_jar) from the handler to emit them.
pub struct CookieSession {
    jar: PrivateCookieJar,
    settings: AuthSettings,
}

impl CookieSession {
    #[must_use]
    pub fn new(jar: PrivateCookieJar, settings: &AuthSettings) -> Self {
        Self {
            jar,
            settings: settings.clone(),
        }
    }

    /// Read-only view over an incoming request's cookies.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap, settings: &AuthSettings) -> Self {
        let jar = PrivateCookieJar::from_headers(headers, settings.cookie_key.clone());
        Self::new(jar, settings)
    }

    #[must_use]
    pub fn into_jar(self) -> PrivateCookieJar {
        self.jar
    }

    /// Remember where to go once the pending attempt completes.
    pub fn set_return_to(&mut self, target: &str) {
        let cookie = cookies::pending_cookie(
            cookies::RETURN_TO_COOKIE_NAME,
            target,
            self.settings.secure_cookies,
            &self.settings.auth_path,
        );
        self.add(cookie);
    }

    /// Take the remembered target, clearing it.
    pub fn take_return_to(&mut self) -> Option<String> {
        let target = self.value(cookies::RETURN_TO_COOKIE_NAME);
        self.remove_pending(cookies::RETURN_TO_COOKIE_NAME);
        target.filter(|t| !t.is_empty())
    }

    fn value(&self, name: &str) -> Option<String> {
        self.jar.get(name).map(|c| c.value().to_string())
    }

    fn update(&mut self, f: impl FnOnce(PrivateCookieJar) -> PrivateCookieJar) {
        let empty = PrivateCookieJar::new(self.settings.cookie_key.clone());
        let jar = std::mem::replace(&mut self.jar, empty);
        self.jar = f(jar);
    }

    fn add(&mut self, cookie: Cookie<'static>) {
        self.update(|jar| jar.add(cookie));
    }

    fn remove(&mut self, cookie: Cookie<'static>) {
        self.update(|jar| jar.remove(cookie));
    }

    fn remove_pending(&mut self, name: &'static str) {
        self.remove(cookies::clear_pending_cookie(name, &self.settings.auth_path));
    }
}

impl SessionStore for CookieSession {
    fn begin(&mut self, state: &OAuthState, verifier: &CodeVerifier) {
        let secure = self.settings.secure_cookies;
        let path = self.settings.auth_path.clone();
        self.add(cookies::pending_cookie(
            cookies::STATE_COOKIE_NAME,
            state.as_str(),
            secure,
            &path,
        ));
        self.add(cookies::pending_cookie(
            cookies::VERIFIER_COOKIE_NAME,
            verifier.as_str(),
            secure,
            &path,
        ));
    }

    fn consume(&mut self, received_state: &str) -> Result<CodeVerifier, AuthError> {
        let stored_state = self.value(cookies::STATE_COOKIE_NAME);
        let stored_verifier = self.value(cookies::VERIFIER_COOKIE_NAME);
        self.discard_pending();
        check_pending(stored_state, stored_verifier, received_state)
    }

    fn discard_pending(&mut self) {
        self.remove_pending(cookies::STATE_COOKIE_NAME);
        self.remove_pending(cookies::VERIFIER_COOKIE_NAME);
    }

    fn has_credential(&self) -> bool {
        self.value(&self.settings.credential_cookie_name)
            .and_then(|v| v.parse::<i64>().ok())
            .is_some_and(|issued_at| {
                credential_is_live(
                    issued_at,
                    self.settings.session_ttl_days,
                    OffsetDateTime::now_utc().unix_timestamp(),
                )
            })
    }

    fn set_credential(&mut self) {
        let cookie = cookies::credential_cookie(
            &self.settings.credential_cookie_name,
            OffsetDateTime::now_utc().unix_timestamp(),
            self.settings.session_ttl_days,
            self.settings.secure_cookies,
        );
        self.add(cookie);
    }

    fn clear_credential(&mut self) {
        let cookie = cookies::clear_credential_cookie(&self.settings.credential_cookie_name);
        self.remove(cookie);
    }
}

/// In-memory [`SessionStore`] for tests and non-browser callers.
#[derive(Debug, Default, Clone)]
pub struct MemorySession {
    state: Option<String>,
    verifier: Option<String>,
    credential: bool,
}

impl MemorySession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.state.is_some() || self.verifier.is_some()
    }
}

impl SessionStore for MemorySession {
    fn begin(&mut self, state: &OAuthState, verifier: &CodeVerifier) {
        self.state = Some(state.as_str().to_string());
        self.verifier = Some(verifier.as_str().to_string());
    }

    fn consume(&mut self, received_state: &str) -> Result<CodeVerifier, AuthError> {
        check_pending(self.state.take(), self.verifier.take(), received_state)
    }

    fn discard_pending(&mut self) {
        self.state = None;
        self.verifier = None;
    }

    fn has_credential(&self) -> bool {
        self.credential
    }

    fn set_credential(&mut self) {
        self.credential = true;
    }

    fn clear_credential(&mut self) {
        self.credential = false;
    }
}
