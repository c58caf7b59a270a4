//! Login, logout and startup reconciliation.
//!
//! The authenticator is the only writer of [`SessionState`] and of the
//! [`CredentialStore`]. Every other component reads state through a shared
//! `Arc<SessionState>`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use super::credentials::CredentialStore;
use super::error::AuthError;
use super::session::SessionState;
use crate::api::{LoginClient, SessionInfo};
use crate::routes::RouteTable;

/// Capability set shared by every authenticator deployment.
///
/// The route guard depends only on this trait, so a deployment can swap the
/// storage-backed [`TokenAuthenticator`] for one that delegates to an
/// external sign-in provider.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Exchange a username and password for a session.
    async fn login(&self, username: &str, password: &str) -> Result<SessionInfo, AuthError>;

    /// End the session. Idempotent.
    fn logout(&self);

    /// Bring session state in line with persisted storage.
    fn reconcile(&self);

    fn is_route_protected(&self, route: &str) -> bool;
}

/// Authenticator backed by a persisted bearer token.
pub struct TokenAuthenticator {
    state: Arc<SessionState>,
    store: CredentialStore,
    client: LoginClient,
    routes: RouteTable,
    // Held across every paired store/state write so the two never diverge
    write_lock: Mutex<()>,
}

impl TokenAuthenticator {
    pub fn new(
        state: Arc<SessionState>,
        store: CredentialStore,
        client: LoginClient,
        routes: RouteTable,
    ) -> Self {
        Self {
            state,
            store,
            client,
            routes,
            write_lock: Mutex::new(()),
        }
    }

    pub fn state(&self) -> &Arc<SessionState> {
        &self.state
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }
}

#[async_trait]
impl Authenticator for TokenAuthenticator {
    async fn login(&self, username: &str, password: &str) -> Result<SessionInfo, AuthError> {
        if username.is_empty() || password.is_empty() {
            warn!("Login attempted without username or password");
            return Err(AuthError::MissingCredentials);
        }

        let info = match self.client.request_token(username, password).await {
            Ok(info) => info,
            Err(e) => {
                error!(username = username, error = %e, "Login failed");
                return Err(AuthError::AuthenticationFailed(e));
            }
        };

        {
            let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
            // Persist first, then publish; readers only ever see the finished state
            self.store.save(&info.access_token);
            self.state.set(info.access_token.clone());
        }

        info!(username = username, "Login successful");
        Ok(info)
    }

    fn logout(&self) {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.state.clear();
        self.store.clear();
        info!("Logged out");
    }

    fn reconcile(&self) {
        if !self.store.is_available() {
            return;
        }
        // Trusts the persisted token as-is; it is not revalidated remotely.
        if self.state.is_authenticated() {
            return;
        }
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(credential) = self.store.load() {
            if self.state.set_if_unauthenticated(credential) {
                debug!("Session restored from stored credential");
            }
        }
    }

    fn is_route_protected(&self, route: &str) -> bool {
        self.routes.is_protected(route)
    }
}
