use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::response::Redirect;

use super::config::AuthSettings;
use super::session::{CookieSession, SessionStore};

/// Page-level login guard.
///
/// Use as an extractor on page handlers. Without a live session credential
/// the handler never runs and the browser is sent to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn summary(_guard: LoginGuard) -> Html<&'static str> {
///     Html("<h1>Summary</h1>")
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LoginGuard;

impl<S> FromRequestParts<S> for LoginGuard
where
    S: Send + Sync,
    AuthSettings: FromRef<S>,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let settings = AuthSettings::from_ref(state);
        if CookieSession::from_headers(&parts.headers, &settings).has_credential() {
            Ok(Self)
        } else {
            tracing::debug!(path = %parts.uri.path(), "Page guard redirecting to login");
            Err(Redirect::to(settings.login_path()))
        }
    }
}
