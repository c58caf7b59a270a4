//! Application-lifetime wiring of the session components.
//!
//! `AuthContext` is built once at startup and passed around by reference.
//! It owns the shared `SessionState` and hands the same `Arc` to the
//! authenticator and the route guard.

use std::sync::Arc;

use tracing::info;

use crate::api::{ApiError, LoginClient, SessionInfo};
use crate::auth::{
    AuthError, Authenticator, CredentialStore, SessionSnapshot, SessionState, Storage,
    TokenAuthenticator,
};
use crate::config::Config;
use crate::routes::{Admission, RouteGuard};

pub struct AuthContext {
    state: Arc<SessionState>,
    authenticator: Arc<TokenAuthenticator>,
    guard: RouteGuard<TokenAuthenticator>,
}

impl AuthContext {
    /// Wire up the session components and restore any persisted session.
    pub fn new(config: &Config, storage: Arc<dyn Storage>) -> Result<Self, ApiError> {
        let state = Arc::new(SessionState::new());
        let store = CredentialStore::with_slot(storage, config.storage_key.clone());
        let client = LoginClient::with_timeout(config.api_base.clone(), config.request_timeout())?;
        let routes = config.route_table();

        let authenticator = Arc::new(TokenAuthenticator::new(
            Arc::clone(&state),
            store,
            client,
            routes.clone(),
        ));
        let guard = RouteGuard::new(Arc::clone(&authenticator), Arc::clone(&state), routes);

        authenticator.reconcile();
        info!(
            api_base = %config.api_base,
            storage_available = authenticator.store().is_available(),
            authenticated = state.is_authenticated(),
            "Session context started"
        );

        Ok(Self {
            state,
            authenticator,
            guard,
        })
    }

    pub fn state(&self) -> &Arc<SessionState> {
        &self.state
    }

    pub fn authenticator(&self) -> &Arc<TokenAuthenticator> {
        &self.authenticator
    }

    pub fn guard(&self) -> &RouteGuard<TokenAuthenticator> {
        &self.guard
    }

    pub fn session(&self) -> SessionSnapshot {
        self.state.read()
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<SessionInfo, AuthError> {
        self.authenticator.login(username, password).await
    }

    pub fn logout(&self) {
        self.authenticator.logout();
    }

    /// Admission decision for a navigation to `destination`
    pub fn navigate(&self, destination: &str) -> Admission {
        self.guard.evaluate(destination)
    }

    /// Tear down the context. The persisted credential stays for the next start.
    pub fn shutdown(self) {
        info!(
            authenticated = self.state.is_authenticated(),
            "Session context shut down"
        );
    }
}
