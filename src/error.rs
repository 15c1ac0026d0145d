use reqwest::StatusCode;

/// Failures of the login flow.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AuthError {
    /// Provider settings needed to start a login are missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider settings needed for the server-side exchange are missing.
    #[error("Server misconfigured: {0}")]
    ServerMisconfigured(String),

    /// The caller omitted a required value.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The callback `state` does not match the pending login attempt.
    #[error("OAuth state mismatch")]
    StateMismatch,

    /// No pending login attempt, or its verifier is gone.
    #[error("PKCE verifier missing")]
    MissingVerifier,

    /// The provider answered with a non-success status.
    #[error("Provider returned {status}")]
    Provider {
        status: StatusCode,
        body: serde_json::Value,
    },

    /// The token exchange did not complete within the configured timeout.
    #[error("Token exchange timed out")]
    ExchangeTimeout,

    #[error("HTTP error: {0}")]
    Network(#[from] reqwest::Error),
}

impl AuthError {
    /// Short machine-readable code used in login error redirects.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) | Self::ServerMisconfigured(_) => "configuration_error",
            Self::InvalidRequest(_) => "invalid_request",
            Self::StateMismatch => "state_mismatch",
            Self::MissingVerifier => "missing_verifier",
            Self::Provider { .. } => "token_exchange_failed",
            Self::ExchangeTimeout => "exchange_timeout",
            Self::Network(_) => "network_error",
        }
    }
}

/// Rejected ledger field values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("month must be YYYY-MM")]
    InvalidMonth(String),
    #[error("date must be YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Invalid payload: {0} is required")]
    MissingField(&'static str),
}
