use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

pub(super) const STATE_COOKIE_NAME: &str = "kakeibo_state";
pub(super) const VERIFIER_COOKIE_NAME: &str = "kakeibo_verifier";
pub(super) const RETURN_TO_COOKIE_NAME: &str = "kakeibo_return_to";

/// Short-lived cookie holding one half of a pending login attempt.
pub(super) fn pending_cookie(
    name: &'static str,
    value: &str,
    secure: bool,
    auth_path: &str,
) -> Cookie<'static> {
    Cookie::build((name, value.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path(auth_path.to_string())
        .max_age(Duration::minutes(5))
        .build()
}

/// Removal cookie for a pending-attempt cookie.
pub(super) fn clear_pending_cookie(name: &'static str, auth_path: &str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path(auth_path.to_string())
        .max_age(Duration::ZERO)
        .build()
}

/// Session credential cookie; the value is the issuance time in unix seconds.
pub(super) fn credential_cookie(
    name: &str,
    issued_at: i64,
    ttl_days: i64,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name.to_string(), issued_at.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::days(ttl_days))
        .build()
}

/// Removal cookie for the session credential.
pub(super) fn clear_credential_cookie(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), ""))
        .path("/".to_string())
        .max_age(Duration::ZERO)
        .build()
}
