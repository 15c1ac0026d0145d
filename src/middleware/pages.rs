use axum::Router;
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum_extra::extract::PrivateCookieJar;
use serde::Deserialize;

use super::extractor::LoginGuard;
use super::session::{CookieSession, SessionStore};
use super::state::AppState;
use crate::ledger::LedgerStore;

/// Login page plus the guarded application pages.
///
/// Page bodies are shells; the calendar and list views are rendered client-side.
pub(super) fn page_routes<L: LedgerStore>() -> Router<AppState<L>> {
    Router::new()
        .route("/login", get(login_page::<L>))
        .route("/", get(home))
        .route("/summary", get(summary))
        .route("/details", get(details))
        .route("/memo", get(memo))
        .route("/health", get(health_check))
}

#[derive(Deserialize)]
struct LoginPageParams {
    redirect: Option<String>,
    error: Option<String>,
}

async fn login_page<L: LedgerStore>(
    State(state): State<AppState<L>>,
    jar: PrivateCookieJar,
    Query(params): Query<LoginPageParams>,
) -> Response {
    if CookieSession::new(jar, &state.settings).has_credential() {
        let target = state.redirect.resolve(params.redirect.as_deref());
        return Redirect::to(&target).into_response();
    }

    let mut href = format!("{}/login", state.settings.auth_path);
    if let Some(redirect) = params.redirect.as_deref().filter(|r| !r.is_empty()) {
        href.push_str("?redirect=");
        href.push_str(&urlencoding::encode(redirect));
    }
    let notice = params
        .error
        .as_deref()
        .map(|code| format!(r#"<p class="login-error">{}</p>"#, error_message(code)))
        .unwrap_or_default();

    Html(format!(
        r#"<!doctype html>
<html lang="ja">
<head><meta charset="utf-8"><title>家計簿にログイン</title></head>
<body>
<main class="login-screen">
<h1>家計簿にログイン</h1>
{notice}<a class="primary" href="{href}">ログインする</a>
</main>
</body>
</html>"#
    ))
    .into_response()
}

/// Fixed text per error code; the query value itself is never echoed.
fn error_message(code: &str) -> &'static str {
    match code {
        "state_mismatch" | "missing_verifier" => "ログインの有効期限が切れました。もう一度ログインしてください。",
        "configuration_error" => "認証の設定が不足しています。",
        "exchange_timeout" => "認証サーバーが応答しませんでした。もう一度お試しください。",
        _ => "ログインに失敗しました。もう一度お試しください。",
    }
}

fn shell(title: &str) -> Html<String> {
    Html(format!(
        r#"<!doctype html>
<html lang="ja">
<head><meta charset="utf-8"><title>{title}</title></head>
<body><div id="app" data-page="{title}"></div></body>
</html>"#
    ))
}

async fn home(_guard: LoginGuard) -> Html<String> {
    shell("home")
}

async fn summary(_guard: LoginGuard) -> Html<String> {
    shell("summary")
}

async fn details(_guard: LoginGuard) -> Html<String> {
    shell("details")
}

async fn memo(_guard: LoginGuard) -> Html<String> {
    shell("memo")
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        assert_eq!(health_check().await, "OK");
    }

    #[test]
    fn test_error_message_never_echoes_input() {
        let msg = error_message("<script>alert(1)</script>");
        assert!(!msg.contains("script"));
    }
}
