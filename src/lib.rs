#![doc = include_str!("../README.md")]

pub mod error;
pub mod ledger;
pub mod middleware;
pub mod oauth;
pub mod pkce;
pub mod redirect;
pub mod types;

// Re-exports for convenient access
pub use error::{AuthError, ValidationError};
pub use middleware::{AppConfig, app_router};
pub use oauth::{
    AuthorizationRequest, ProviderConfig, TokenGateway, TokenSet, build_authorize_url,
    start_authorization,
};
pub use pkce::{derive_challenge, generate_state, generate_verifier};
pub use redirect::{RedirectQuery, RedirectResolver, is_external_url};
pub use types::{CodeChallenge, CodeVerifier, EntryDate, Month, OAuthState, RecordId};
