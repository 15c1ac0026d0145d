use std::time::Duration;

use axum_extra::extract::cookie::Key;

use super::error::ConfigError;
use crate::ledger::LedgerTables;
use crate::oauth::{DEFAULT_EXCHANGE_TIMEOUT, ProviderConfig};
use crate::redirect::RedirectResolver;

/// Upper bound for the credential lifetime (ten years).
pub const MAX_SESSION_TTL_DAYS: i64 = 3650;

/// Cookie and routing settings shared by the guard, the extractor and the auth routes.
#[derive(Clone)]
pub struct AuthSettings {
    pub(crate) cookie_key: Key,
    pub(crate) credential_cookie_name: String,
    pub(crate) session_ttl_days: i64,
    pub(crate) secure_cookies: bool,
    pub(crate) auth_path: String,
    pub(crate) login_path: String,
    pub(crate) public_paths: Vec<String>,
}

impl AuthSettings {
    pub(crate) fn defaults() -> Self {
        Self {
            cookie_key: Key::generate(),
            credential_cookie_name: "kakeibo_auth".into(),
            session_ttl_days: 7,
            secure_cookies: true,
            auth_path: "/api/auth".into(),
            login_path: "/login".into(),
            public_paths: vec!["/login".into(), "/health".into()],
        }
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    #[must_use]
    pub fn credential_cookie_name(&self) -> &str {
        &self.credential_cookie_name
    }
}

/// Application configuration.
///
/// Use [`from_env()`](AppConfig::from_env) for deployment, or
/// [`new()`](AppConfig::new) with `with_*` methods in tests.
pub struct AppConfig {
    pub(super) provider: ProviderConfig,
    pub(super) settings: AuthSettings,
    pub(super) redirect: RedirectResolver,
    pub(super) exchange_timeout: Duration,
    pub(super) tables: LedgerTables,
    pub(super) bind_address: String,
}

impl AppConfig {
    #[must_use]
    pub fn new(provider: ProviderConfig) -> Self {
        Self {
            provider,
            settings: AuthSettings::defaults(),
            redirect: RedirectResolver::new("/summary"),
            exchange_timeout: DEFAULT_EXCHANGE_TIMEOUT,
            tables: LedgerTables::default(),
            bind_address: "0.0.0.0:3000".into(),
        }
    }

    /// Create config from environment variables.
    ///
    /// # Provider env vars
    /// - `COGNITO_DOMAIN`, `COGNITO_CLIENT_ID`, `COGNITO_REDIRECT_URI`,
    ///   `COGNITO_CLIENT_SECRET`: may be unset; login fails closed until they are
    /// - `COGNITO_TOKEN_URL`: override the token endpoint
    /// - `COGNITO_SCOPES`: comma-separated scopes
    ///
    /// # Optional env vars
    /// - `LOGIN_REDIRECT_PATH`: default post-login target (`/summary`)
    /// - `REDIRECT_ALLOWED_HOSTS`: comma-separated hosts allowed as absolute redirect targets
    /// - `COOKIE_KEY`: cookie encryption key bytes
    /// - `DEV_AUTH`: `"1"` or `"true"` disables secure cookies
    /// - `EXCHANGE_TIMEOUT_SECS`, `SESSION_TTL_DAYS`
    /// - `DYNAMODB_TRANSACTIONS_TABLE`, `DYNAMODB_MEMOS_TABLE`
    /// - `BIND_ADDRESS`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `COOKIE_KEY` is invalid or a numeric
    /// variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let var = |name: &str| std::env::var(name).unwrap_or_default();

        let mut provider = ProviderConfig::new(
            var("COGNITO_DOMAIN"),
            var("COGNITO_CLIENT_ID"),
            var("COGNITO_REDIRECT_URI"),
            var("COGNITO_CLIENT_SECRET"),
        );
        if let Ok(url) = std::env::var("COGNITO_TOKEN_URL") {
            provider = provider.with_token_url(url);
        }
        if let Ok(scopes) = std::env::var("COGNITO_SCOPES") {
            provider = provider.with_scopes(split_list(&scopes));
        }
        if !provider.can_authorize() {
            tracing::warn!("Identity provider settings incomplete; login will be refused");
        }

        let dev_auth = matches!(
            std::env::var("DEV_AUTH").as_deref(),
            Ok("1") | Ok("true"),
        );

        let cookie_key = match std::env::var("COOKIE_KEY") {
            Ok(k) => Key::try_from(k.as_bytes()).map_err(|_| {
                ConfigError::Invalid(
                    "COOKIE_KEY is set but invalid (must be at least 64 bytes). \
                     Remove the env var to use an ephemeral key, or provide a valid key."
                        .into(),
                )
            })?,
            Err(_) => {
                tracing::warn!("COOKIE_KEY not set; sessions will not survive a restart");
                Key::generate()
            }
        };

        let mut config = Self::new(provider)
            .with_cookie_key(cookie_key)
            .with_secure_cookies(!dev_auth);

        if let Ok(path) = std::env::var("LOGIN_REDIRECT_PATH") {
            if !path.trim().is_empty() {
                config.redirect = RedirectResolver::new(path);
            }
        }
        if let Ok(hosts) = std::env::var("REDIRECT_ALLOWED_HOSTS") {
            config.redirect = config.redirect.with_allowed_hosts(split_list(&hosts));
        }
        if let Some(secs) = parse_var::<u64>("EXCHANGE_TIMEOUT_SECS")? {
            config = config.with_exchange_timeout(Duration::from_secs(secs));
        }
        if let Some(days) = parse_var::<i64>("SESSION_TTL_DAYS")? {
            config = config.with_session_ttl_days(check_ttl_days(days)?);
        }
        if let Ok(table) = std::env::var("DYNAMODB_TRANSACTIONS_TABLE") {
            config.tables.transactions = table;
        }
        if let Ok(table) = std::env::var("DYNAMODB_MEMOS_TABLE") {
            config.tables.memos = table;
        }
        if let Ok(addr) = std::env::var("BIND_ADDRESS") {
            config.bind_address = addr;
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_cookie_key(mut self, key: Key) -> Self {
        self.settings.cookie_key = key;
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.settings.secure_cookies = secure;
        self
    }

    /// Credential lifetime, clamped to `1..=MAX_SESSION_TTL_DAYS`.
    #[must_use]
    pub fn with_session_ttl_days(mut self, days: i64) -> Self {
        self.settings.session_ttl_days = days.clamp(1, MAX_SESSION_TTL_DAYS);
        self
    }

    #[must_use]
    pub fn with_redirect_resolver(mut self, resolver: RedirectResolver) -> Self {
        self.redirect = resolver;
        self
    }

    #[must_use]
    pub fn with_exchange_timeout(mut self, timeout: Duration) -> Self {
        self.exchange_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_tables(mut self, tables: LedgerTables) -> Self {
        self.tables = tables;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &AuthSettings {
        &self.settings
    }

    #[must_use]
    pub fn tables(&self) -> &LedgerTables {
        &self.tables
    }

    #[must_use]
    pub fn bind_address(&self) -> &str {
        &self.bind_address
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn check_ttl_days(days: i64) -> Result<i64, ConfigError> {
    if (1..=MAX_SESSION_TTL_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(ConfigError::Invalid(format!(
            "SESSION_TTL_DAYS must be between 1 and {MAX_SESSION_TTL_DAYS}, got {days}"
        )))
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(format!("{name} must be a number, got {raw:?}"))),
        Err(_) => Ok(None),
    }
}
