use std::fmt;
use std::sync::RwLock;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Opaque session token issued by the remote endpoint.
///
/// Never empty. `Debug` output is redacted so tokens stay out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a token, returning `None` for an empty string
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(<redacted, {} bytes>)", self.0.len())
    }
}

impl Serialize for Credential {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Credential {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Credential::new(token).ok_or_else(|| de::Error::custom("credential is empty"))
    }
}

/// Point-in-time view of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub is_authenticated: bool,
    pub credential: Option<Credential>,
}

/// Process-wide authentication flag and credential.
///
/// Shared by `Arc` with every reader. The flag is derived from the presence
/// of a credential, and both live behind one lock, so no reader can see one
/// updated without the other. Only the authenticator mutates it.
#[derive(Debug, Default)]
pub struct SessionState {
    credential: RwLock<Option<Credential>>,
}

impl SessionState {
    /// Fresh, unauthenticated state
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set(&self, credential: Credential) {
        let mut slot = self.credential.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(credential);
    }

    pub(crate) fn clear(&self) {
        let mut slot = self.credential.write().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }

    /// Set the credential only if no session is held; returns whether it was set.
    pub(crate) fn set_if_unauthenticated(&self, credential: Credential) -> bool {
        let mut slot = self.credential.write().unwrap_or_else(|e| e.into_inner());
        if slot.is_some() {
            return false;
        }
        *slot = Some(credential);
        true
    }

    pub fn read(&self) -> SessionSnapshot {
        let credential = self
            .credential
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        SessionSnapshot {
            is_authenticated: credential.is_some(),
            credential,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.credential
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    pub fn credential(&self) -> Option<Credential> {
        self.read().credential
    }
}
