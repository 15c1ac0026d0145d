use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use super::config::{AppConfig, AuthSettings};
use crate::ledger::LedgerStore;
use crate::oauth::TokenGateway;
use crate::redirect::RedirectResolver;

/// Shared state for route handlers.
pub(super) struct AppState<L> {
    pub(super) gateway: Arc<TokenGateway>,
    pub(super) redirect: Arc<RedirectResolver>,
    pub(super) ledger: Arc<L>,
    pub(super) settings: AuthSettings,
}

impl<L: LedgerStore> AppState<L> {
    pub(super) fn new(config: AppConfig, ledger: L) -> Self {
        let gateway = TokenGateway::new(config.provider).with_timeout(config.exchange_timeout);
        Self {
            gateway: Arc::new(gateway),
            redirect: Arc::new(config.redirect),
            ledger: Arc::new(ledger),
            settings: config.settings,
        }
    }
}

// Manual Clone: avoid derive adding an `L: Clone` bound.
impl<L> Clone for AppState<L> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            redirect: self.redirect.clone(),
            ledger: self.ledger.clone(),
            settings: self.settings.clone(),
        }
    }
}

// PrivateCookieJar requires Key to be extractable from state
impl<L: LedgerStore> FromRef<AppState<L>> for Key {
    fn from_ref(state: &AppState<L>) -> Self {
        state.settings.cookie_key.clone()
    }
}

impl<L: LedgerStore> FromRef<AppState<L>> for AuthSettings {
    fn from_ref(state: &AppState<L>) -> Self {
        state.settings.clone()
    }
}
