//! Axum surface of the ledger: login gate, ledger API and page shells.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use kakeibo::ledger::MemoryLedger;
//! use kakeibo::middleware::{AppConfig, app_router};
//!
//! let config = AppConfig::from_env()?;
//! let ledger = MemoryLedger::new(config.tables().clone());
//! let app = app_router(config, ledger);
//! ```

mod api;
mod config;
mod cookies;
mod error;
mod extractor;
mod guard;
mod pages;
mod routes;
mod session;
mod state;

use axum::Router;

pub use config::{AppConfig, AuthSettings};
pub use error::{ApiError, ConfigError};
pub use extractor::LoginGuard;
pub use guard::{edge_filter, is_exempt, login_redirect_url};
pub use session::{CookieSession, MemorySession, SessionStore};

use crate::ledger::LedgerStore;
use state::AppState;

/// Assemble the full application router with the edge filter in front.
pub fn app_router<L: LedgerStore>(config: AppConfig, ledger: L) -> Router {
    let state = AppState::new(config, ledger);
    let settings = state.settings.clone();

    Router::new()
        .merge(routes::auth_routes::<L>(&settings.auth_path))
        .merge(api::ledger_routes::<L>())
        .merge(pages::page_routes::<L>())
        .with_state(state)
        .layer(axum::middleware::from_fn_with_state(
            settings,
            guard::edge_filter,
        ))
}
