use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::{AuthError, ValidationError};
use crate::ledger::StoreError;

/// Startup configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Invalid(String),
}

/// JSON error body shared by every API endpoint: `{"error": "..."}`.
fn error_body(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            Self::Provider { status, body } => (status, Json(body)).into_response(),
            Self::Config(_) | Self::ServerMisconfigured(_) => {
                tracing::error!(error = %self, "Auth configuration error");
                error_body(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Identity provider is not fully configured",
                )
            }
            Self::InvalidRequest(ref msg) => error_body(StatusCode::BAD_REQUEST, msg.clone()),
            Self::StateMismatch | Self::MissingVerifier => {
                error_body(StatusCode::BAD_REQUEST, "Please log in again")
            }
            Self::ExchangeTimeout => {
                error_body(StatusCode::GATEWAY_TIMEOUT, "Token exchange timed out")
            }
            Self::Network(ref e) => {
                tracing::error!(error = %e, "Token exchange request failed");
                error_body(StatusCode::BAD_GATEWAY, "Token exchange failed")
            }
        }
    }
}

/// Errors of the ledger endpoints.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self::Validation(format!("Invalid payload: {}", e.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(msg) => error_body(StatusCode::BAD_REQUEST, msg),
            Self::Store(e) => {
                tracing::error!(error = %e, "Ledger store failure");
                error_body(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::Value;

    use super::*;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn provider_error_passes_through() {
        let response = AuthError::Provider {
            status: StatusCode::BAD_REQUEST,
            body: json!({ "error": "invalid_grant" }),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({ "error": "invalid_grant" }));
    }

    #[tokio::test]
    async fn misconfiguration_is_500() {
        let response = AuthError::ServerMisconfigured("client_secret".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn timeout_is_504() {
        assert_eq!(
            AuthError::ExchangeTimeout.into_response().status(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[tokio::test]
    async fn validation_is_400_with_message() {
        let response = ApiError::from(ValidationError::MissingField("payer")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Invalid payload: payer is required" })
        );
    }

    #[tokio::test]
    async fn store_failure_is_500() {
        let response = ApiError::from(StoreError::TableNotConfigured("memo")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
