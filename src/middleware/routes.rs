use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::PrivateCookieJar;
use serde::Deserialize;

use super::session::{CookieSession, SessionStore};
use super::state::AppState;
use crate::error::AuthError;
use crate::ledger::LedgerStore;
use crate::oauth;
use crate::redirect::RedirectQuery;

/// Login, callback, token exchange and logout routes under the auth path.
pub(super) fn auth_routes<L: LedgerStore>(auth_path: &str) -> Router<AppState<L>> {
    Router::new()
        .route(&format!("{auth_path}/login"), get(login::<L>))
        .route(&format!("{auth_path}/callback"), get(callback::<L>))
        .route(&format!("{auth_path}/token"), post(token::<L>))
        .route(
            &format!("{auth_path}/logout"),
            get(logout::<L>).post(logout::<L>),
        )
}

// ── Login ──────────────────────────────────────────────────────────

async fn login<L: LedgerStore>(
    State(state): State<AppState<L>>,
    jar: PrivateCookieJar,
    Query(query): Query<RedirectQuery>,
) -> Response {
    let auth_req = match oauth::start_authorization(state.gateway.config()) {
        Ok(req) => req,
        Err(e) => {
            tracing::error!(error = %e, "Cannot start login");
            return login_error(state.settings.login_path(), &e);
        }
    };

    let mut session = CookieSession::new(jar, &state.settings);
    session.begin(&auth_req.state, &auth_req.code_verifier);
    session.set_return_to(&state.redirect.resolve_query(&query));

    (session.into_jar(), Redirect::to(auth_req.url.as_str())).into_response()
}

// ── Callback ───────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

async fn callback<L: LedgerStore>(
    State(state): State<AppState<L>>,
    jar: PrivateCookieJar,
    Query(params): Query<CallbackParams>,
) -> Response {
    let mut session = CookieSession::new(jar, &state.settings);
    let return_to = session.take_return_to();

    if let Some(error) = &params.error {
        let desc = params.error_description.as_deref().unwrap_or("Unknown error");
        tracing::warn!(error = %error, description = %desc, "OAuth2 error from provider");
        session.discard_pending();
        return (
            session.into_jar(),
            login_error_code(state.settings.login_path(), "provider_error"),
        )
            .into_response();
    }

    let verifier = match session.consume(params.state.as_deref().unwrap_or_default()) {
        Ok(verifier) => verifier,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected OAuth callback");
            return (session.into_jar(), login_error(state.settings.login_path(), &e))
                .into_response();
        }
    };

    let code = params.code.unwrap_or_default();
    if let Err(e) = state.gateway.exchange(&code, verifier.as_str()).await {
        tracing::error!(error = %e, "Token exchange failed");
        return (session.into_jar(), login_error(state.settings.login_path(), &e)).into_response();
    }

    session.set_credential();
    let target = state.redirect.resolve(return_to.as_deref());
    tracing::info!(target = %target, "Login successful");

    (session.into_jar(), Redirect::to(&target)).into_response()
}

// ── Token exchange ─────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest {
    code: Option<String>,
    code_verifier: Option<String>,
}

/// JSON relay for browser clients that hold the verifier themselves.
///
/// The provider's status and JSON body are passed through unchanged; a
/// successful exchange also issues the session credential.
async fn token<L: LedgerStore>(
    State(state): State<AppState<L>>,
    jar: PrivateCookieJar,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> Response {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    let code = payload.code.unwrap_or_default();
    let verifier = payload.code_verifier.unwrap_or_default();

    match state.gateway.exchange(&code, &verifier).await {
        Ok(tokens) => {
            let mut session = CookieSession::new(jar, &state.settings);
            session.set_credential();
            tracing::info!("Token exchange relayed");
            (tokens.status, session.into_jar(), Json(tokens.body)).into_response()
        }
        Err(e) => {
            if !matches!(e, AuthError::InvalidRequest(_)) {
                tracing::warn!(error = %e, "Token exchange relay failed");
            }
            e.into_response()
        }
    }
}

// ── Logout ─────────────────────────────────────────────────────────

async fn logout<L: LedgerStore>(
    State(state): State<AppState<L>>,
    jar: PrivateCookieJar,
) -> (PrivateCookieJar, Redirect) {
    let mut session = CookieSession::new(jar, &state.settings);
    session.clear_credential();
    session.discard_pending();
    tracing::info!("Logged out");
    (session.into_jar(), Redirect::to(state.settings.login_path()))
}

// ── Helpers ────────────────────────────────────────────────────────

fn login_error(login_path: &str, error: &AuthError) -> Response {
    login_error_code(login_path, error.code()).into_response()
}

fn login_error_code(login_path: &str, code: &str) -> Redirect {
    let encoded = urlencoding::encode(code);
    Redirect::to(&format!("{login_path}?error={encoded}"))
}
