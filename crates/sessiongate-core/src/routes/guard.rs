use std::sync::Arc;

use tracing::debug;

use super::table::RouteTable;
use crate::auth::{Authenticator, SessionState};

/// Outcome of a single navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Navigation proceeds to the destination unchanged
    Admitted,
    /// Navigation is sent to another route instead
    Redirected(String),
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Admission::Admitted => None,
            Admission::Redirected(target) => Some(target),
        }
    }
}

/// Per-navigation admission check.
///
/// Holds no state of its own between evaluations; each decision re-reads the
/// shared session after reconciling it with storage.
pub struct RouteGuard<A: Authenticator> {
    authenticator: Arc<A>,
    state: Arc<SessionState>,
    routes: RouteTable,
}

impl<A: Authenticator> RouteGuard<A> {
    pub fn new(authenticator: Arc<A>, state: Arc<SessionState>, routes: RouteTable) -> Self {
        Self {
            authenticator,
            state,
            routes,
        }
    }

    /// Decide whether navigation to `destination` may proceed.
    ///
    /// Rules, first match wins:
    /// 1. reconcile session state with storage
    /// 2. protected route without a session: redirect to login
    /// 3. login route with a session: redirect home
    /// 4. otherwise admit
    pub fn evaluate(&self, destination: &str) -> Admission {
        self.authenticator.reconcile();
        let authenticated = self.state.is_authenticated();

        let decision = if self.authenticator.is_route_protected(destination) && !authenticated {
            Admission::Redirected(self.routes.login_route().to_string())
        } else if self.routes.is_login_route(destination) && authenticated {
            Admission::Redirected(self.routes.home_route().to_string())
        } else {
            Admission::Admitted
        };

        debug!(
            destination = destination,
            authenticated = authenticated,
            decision = ?decision,
            "Route admission"
        );
        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{LoginClient, SessionInfo};
    use crate::auth::{AuthError, Credential, CredentialStore, MemoryStorage, Storage, TokenAuthenticator};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn token_guard(storage: Arc<MemoryStorage>) -> (RouteGuard<TokenAuthenticator>, Arc<SessionState>) {
        let state = Arc::new(SessionState::new());
        let auth = Arc::new(TokenAuthenticator::new(
            Arc::clone(&state),
            CredentialStore::new(storage),
            LoginClient::new("http://127.0.0.1:9").unwrap(),
            RouteTable::default(),
        ));
        (RouteGuard::new(auth, Arc::clone(&state), RouteTable::default()), state)
    }

    #[test]
    fn test_protected_route_unauthenticated_redirects_to_login() {
        let (guard, _) = token_guard(Arc::new(MemoryStorage::new()));
        assert_eq!(
            guard.evaluate("/dashboard"),
            Admission::Redirected("/login".to_string())
        );
        assert_eq!(
            guard.evaluate("/"),
            Admission::Redirected("/login".to_string())
        );
    }

    #[test]
    fn test_login_route_unauthenticated_is_admitted() {
        let (guard, _) = token_guard(Arc::new(MemoryStorage::new()));
        assert_eq!(guard.evaluate("/login"), Admission::Admitted);
    }

    #[test]
    fn test_login_route_authenticated_redirects_home() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item("auth_token", "T1").unwrap();
        let (guard, _) = token_guard(storage);

        assert_eq!(guard.evaluate("/login"), Admission::Redirected("/".to_string()));
        assert_eq!(guard.evaluate("/dashboard"), Admission::Admitted);
    }

    #[test]
    fn test_evaluate_reconciles_from_storage_first() {
        let storage = Arc::new(MemoryStorage::new());
        let (guard, state) = token_guard(storage.clone());
        assert!(!guard.evaluate("/dashboard").is_admitted());

        // Another part of the app persisted a token between navigations
        storage.set_item("auth_token", "T2").unwrap();
        assert!(guard.evaluate("/dashboard").is_admitted());
        assert_eq!(state.credential(), Credential::new("T2"));
    }

    #[test]
    fn test_admission_helpers() {
        assert!(Admission::Admitted.is_admitted());
        assert_eq!(Admission::Admitted.redirect_target(), None);
        let redirect = Admission::Redirected("/login".to_string());
        assert!(!redirect.is_admitted());
        assert_eq!(redirect.redirect_target(), Some("/login"));
    }

    /// Stand-in for a provider-delegated authenticator.
    struct FakeAuthenticator {
        state: Arc<SessionState>,
        reconciles: AtomicUsize,
    }

    #[async_trait]
    impl Authenticator for FakeAuthenticator {
        async fn login(&self, _username: &str, _password: &str) -> Result<SessionInfo, AuthError> {
            Err(AuthError::MissingCredentials)
        }

        fn logout(&self) {
            self.state.clear();
        }

        fn reconcile(&self) {
            self.reconciles.fetch_add(1, Ordering::SeqCst);
        }

        fn is_route_protected(&self, route: &str) -> bool {
            route != "/login" && route != "/about"
        }
    }

    #[test]
    fn test_guard_works_with_any_authenticator() {
        let state = Arc::new(SessionState::new());
        let auth = Arc::new(FakeAuthenticator {
            state: Arc::clone(&state),
            reconciles: AtomicUsize::new(0),
        });
        let guard = RouteGuard::new(Arc::clone(&auth), Arc::clone(&state), RouteTable::default());

        assert_eq!(guard.evaluate("/about"), Admission::Admitted);
        assert_eq!(
            guard.evaluate("/settings"),
            Admission::Redirected("/login".to_string())
        );
        assert_eq!(auth.reconciles.load(Ordering::SeqCst), 2);

        state.set(Credential::new("T1").unwrap());
        assert_eq!(guard.evaluate("/login"), Admission::Redirected("/".to_string()));
        auth.logout();
        assert_eq!(guard.evaluate("/login"), Admission::Admitted);
    }
}
