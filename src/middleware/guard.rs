use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use super::config::AuthSettings;
use super::session::{CookieSession, SessionStore};

const API_PREFIX: &str = "/api";
const STATIC_PREFIXES: [&str; 2] = ["/static/", "/assets/"];

/// Edge filter: every request to a protected path needs a live session
/// credential, otherwise it is redirected to the login page with the
/// original path and query in `redirect`.
///
/// ```rust,ignore
/// let app = router.layer(axum::middleware::from_fn_with_state(settings, edge_filter));
/// ```
pub async fn edge_filter(
    State(settings): State<AuthSettings>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if is_exempt(path, &settings) {
        return next.run(request).await;
    }

    if CookieSession::from_headers(request.headers(), &settings).has_credential() {
        return next.run(request).await;
    }

    let original = request
        .uri()
        .path_and_query()
        .map_or(path, |pq| pq.as_str());
    tracing::debug!(path = %original, "Edge filter redirecting to login");
    Redirect::to(&login_redirect_url(settings.login_path(), original)).into_response()
}

/// Login URL carrying the originally requested location.
#[must_use]
pub fn login_redirect_url(login_path: &str, original: &str) -> String {
    format!("{login_path}?redirect={}", urlencoding::encode(original))
}

/// Paths served without a credential: API routes, static assets and the
/// configured public pages.
#[must_use]
pub fn is_exempt(path: &str, settings: &AuthSettings) -> bool {
    is_api_path(path)
        || is_static_asset(path)
        || settings
            .public_paths
            .iter()
            .any(|public| path == public || path.starts_with(&format!("{public}/")))
}

fn is_api_path(path: &str) -> bool {
    path == API_PREFIX || path.starts_with(&format!("{API_PREFIX}/"))
}

fn is_static_asset(path: &str) -> bool {
    STATIC_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
        || path
            .rsplit('/')
            .next()
            .is_some_and(|segment| segment.contains('.'))
}
