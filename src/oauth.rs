use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde_json::{Value, json};
use url::Url;

use crate::error::AuthError;
use crate::pkce;
use crate::types::{CodeChallenge, CodeVerifier, OAuthState};

/// Default bound on a single token exchange round trip.
pub const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Identity provider settings, read once at startup.
///
/// Fields may be empty: operations that need them fail closed at call time
/// instead of deferring to the provider's error page.
///
/// ```rust,ignore
/// let config = ProviderConfig::new("auth.example.com", "client", "https://app/api/auth/callback", "secret")
///     .with_scopes(vec!["openid".into()]);
/// ```
#[derive(Clone)]
#[non_exhaustive]
pub struct ProviderConfig {
    pub(crate) domain: String,
    pub(crate) client_id: String,
    pub(crate) redirect_uri: String,
    pub(crate) client_secret: String,
    pub(crate) token_url: Option<String>,
    pub(crate) scopes: Vec<String>,
}

impl ProviderConfig {
    #[must_use]
    pub fn new(
        domain: impl Into<String>,
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            client_secret: client_secret.into(),
            token_url: None,
            scopes: vec!["openid".into(), "email".into(), "profile".into()],
        }
    }

    /// Override the token endpoint (default: `https://{domain}/oauth2/token`).
    #[must_use]
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = Some(url.into());
        self
    }

    /// Override the requested scopes (default: `["openid", "email", "profile"]`).
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Whether everything needed to start a login is present.
    #[must_use]
    pub fn can_authorize(&self) -> bool {
        self.missing_authorize_fields().is_empty()
    }

    fn missing_authorize_fields(&self) -> Vec<&'static str> {
        [
            ("domain", &self.domain),
            ("client_id", &self.client_id),
            ("redirect_uri", &self.redirect_uri),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| k)
        .collect()
    }

    fn missing_exchange_fields(&self) -> Vec<&'static str> {
        let mut missing: Vec<&'static str> = [
            ("client_id", &self.client_id),
            ("redirect_uri", &self.redirect_uri),
            ("client_secret", &self.client_secret),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| k)
        .collect();
        if self.token_url.is_none() && self.domain.trim().is_empty() {
            missing.push("domain");
        }
        missing
    }

    fn token_url(&self) -> Result<Url, AuthError> {
        let raw = match &self.token_url {
            Some(url) => url.clone(),
            None => format!("https://{}/oauth2/token", self.domain),
        };
        raw.parse()
            .map_err(|e| AuthError::ServerMisconfigured(format!("token endpoint: {e}")))
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("domain", &self.domain)
            .field("client_id", &self.client_id)
            .field("redirect_uri", &self.redirect_uri)
            .field("client_secret", &"<redacted>")
            .field("token_url", &self.token_url)
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// Builds the provider authorization URL for one login attempt.
///
/// # Errors
///
/// Returns [`AuthError::Config`] if `domain`, `client_id` or `redirect_uri`
/// is empty, or the domain does not form a valid URL.
pub fn build_authorize_url(
    config: &ProviderConfig,
    state: &OAuthState,
    challenge: &CodeChallenge,
) -> Result<Url, AuthError> {
    let missing = config.missing_authorize_fields();
    if !missing.is_empty() {
        return Err(AuthError::Config(format!(
            "missing provider settings: {}",
            missing.join(", ")
        )));
    }

    let mut url: Url = format!("https://{}/oauth2/authorize", config.domain)
        .parse()
        .map_err(|e| AuthError::Config(format!("provider domain: {e}")))?;
    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", &config.client_id)
        .append_pair("redirect_uri", &config.redirect_uri)
        .append_pair("scope", &config.scopes.join(" "))
        .append_pair("state", state.as_str())
        .append_pair("code_challenge_method", "S256")
        .append_pair("code_challenge", challenge.as_str());

    Ok(url)
}

/// A fresh login attempt: the redirect URL plus the values to keep until the callback.
#[non_exhaustive]
pub struct AuthorizationRequest {
    pub url: Url,
    pub state: OAuthState,
    pub code_verifier: CodeVerifier,
}

/// Generates state + verifier and builds the matching authorization URL.
///
/// # Errors
///
/// Same as [`build_authorize_url`].
pub fn start_authorization(config: &ProviderConfig) -> Result<AuthorizationRequest, AuthError> {
    let state = pkce::generate_state();
    let code_verifier = pkce::generate_verifier();
    let challenge = pkce::derive_challenge(&code_verifier);
    let url = build_authorize_url(config, &state, &challenge)?;
    Ok(AuthorizationRequest {
        url,
        state,
        code_verifier,
    })
}

/// Successful token endpoint answer, kept verbatim for pass-through.
#[derive(Debug, Clone)]
pub struct TokenSet {
    pub status: StatusCode,
    pub body: Value,
}

impl TokenSet {
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.body.get("access_token").and_then(Value::as_str)
    }

    #[must_use]
    pub fn id_token(&self) -> Option<&str> {
        self.body.get("id_token").and_then(Value::as_str)
    }
}

/// Server-side relay for the authorization-code grant.
///
/// Holds the client secret; nothing here is ever sent to the browser.
#[derive(Clone)]
pub struct TokenGateway {
    config: ProviderConfig,
    http: reqwest::Client,
    timeout: Duration,
}

impl TokenGateway {
    #[must_use]
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            timeout: DEFAULT_EXCHANGE_TIMEOUT,
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Exchange an authorization code for tokens using PKCE.
    ///
    /// JSON bodies from the provider are returned verbatim with the
    /// provider's status. Non-JSON bodies become `{"error": <trimmed text>}`,
    /// empty ones `{"error": "Unknown error"}`.
    ///
    /// # Errors
    ///
    /// - [`AuthError::ServerMisconfigured`] if client id, redirect URI,
    ///   client secret or token endpoint is missing
    /// - [`AuthError::InvalidRequest`] if `code` or `verifier` is empty
    /// - [`AuthError::Provider`] for a non-2xx provider status
    /// - [`AuthError::ExchangeTimeout`] / [`AuthError::Network`] if the call fails
    pub async fn exchange(&self, code: &str, verifier: &str) -> Result<TokenSet, AuthError> {
        let missing = self.config.missing_exchange_fields();
        if !missing.is_empty() {
            return Err(AuthError::ServerMisconfigured(format!(
                "missing provider settings: {}",
                missing.join(", ")
            )));
        }
        if code.is_empty() || verifier.is_empty() {
            return Err(AuthError::InvalidRequest(
                "code and codeVerifier are required".into(),
            ));
        }

        let token_url = self.config.token_url()?;
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code_verifier", verifier),
        ];

        let response = self
            .http
            .post(token_url)
            .form(&params)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));
        let text = response.text().await.map_err(classify)?;
        let body = provider_body(is_json, &text);

        if status.is_success() {
            tracing::debug!(status = %status, "Token exchange succeeded");
            Ok(TokenSet { status, body })
        } else {
            tracing::warn!(status = %status, "Provider rejected token exchange");
            Err(AuthError::Provider { status, body })
        }
    }
}

fn classify(e: reqwest::Error) -> AuthError {
    if e.is_timeout() {
        AuthError::ExchangeTimeout
    } else {
        AuthError::Network(e)
    }
}

fn provider_body(is_json: bool, text: &str) -> Value {
    if is_json {
        if let Ok(value) = serde_json::from_str::<Value>(text) {
            return value;
        }
    }
    let trimmed = text.trim();
    if trimmed.is_empty() {
        json!({ "error": "Unknown error" })
    } else {
        json!({ "error": trimmed })
    }
}
