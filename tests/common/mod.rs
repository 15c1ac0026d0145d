//! Shared helpers for driving the assembled router in-process.

#![allow(dead_code)]

use std::collections::BTreeMap;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::header::{COOKIE, CONTENT_TYPE, LOCATION, SET_COOKIE};
use axum::http::{Request, Response, StatusCode};
use axum_extra::extract::cookie::Cookie;
use kakeibo::ProviderConfig;
use kakeibo::ledger::MemoryLedger;
use kakeibo::middleware::{AppConfig, app_router};
use serde_json::Value;
use tower::ServiceExt;

pub const REDIRECT_URI: &str = "http://localhost:3000/api/auth/callback";

pub fn provider_for(token_url: &str) -> ProviderConfig {
    ProviderConfig::new("auth.example.com", "kakeibo-client", REDIRECT_URI, "top-secret")
        .with_token_url(token_url)
}

pub fn config_for(token_url: &str) -> AppConfig {
    AppConfig::new(provider_for(token_url)).with_secure_cookies(false)
}

pub fn app(config: AppConfig) -> Router {
    let ledger = MemoryLedger::new(config.tables().clone());
    app_router(config, ledger)
}

/// Minimal browser cookie store: applies `Set-Cookie` and replays as `Cookie`.
#[derive(Debug, Default, Clone)]
pub struct Browser {
    cookies: BTreeMap<String, String>,
}

impl Browser {
    pub fn absorb(&mut self, response: &Response<Body>) {
        for header in response.headers().get_all(SET_COOKIE) {
            let Ok(raw) = header.to_str() else { continue };
            let Ok(cookie) = Cookie::parse(raw.to_string()) else {
                continue;
            };
            let expired = cookie
                .max_age()
                .is_some_and(|age| age.is_zero() || age.is_negative());
            if expired || cookie.value().is_empty() {
                self.cookies.remove(cookie.name());
            } else {
                self.cookies
                    .insert(cookie.name().to_string(), cookie.value().to_string());
            }
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    pub fn header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    pub fn get(&self, uri: &str) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = self.header() {
            builder = builder.header(COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    pub fn post_json(&self, uri: &str, body: &Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json");
        if let Some(cookie) = self.header() {
            builder = builder.header(COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    /// Send `request`, remember its cookies, return the response.
    pub async fn send(&mut self, app: &Router, request: Request<Body>) -> Response<Body> {
        let response = app.clone().oneshot(request).await.unwrap();
        self.absorb(&response);
        response
    }
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub fn assert_redirect(response: &Response<Body>, expected: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(response), expected);
}

pub fn query_value(url: &str, key: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()?
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
