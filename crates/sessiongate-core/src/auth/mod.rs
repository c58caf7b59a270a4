//! Authentication module for managing the user session.
//!
//! This module provides:
//! - `Storage`: key-value storage capability (file, keychain, memory, none)
//! - `CredentialStore`: the single persisted credential slot
//! - `SessionState`: shared, always-consistent authentication status
//! - `Authenticator` / `TokenAuthenticator`: login, logout and reconciliation
//!
//! Credentials persist until logout; there is no expiry or refresh.

pub mod authenticator;
pub mod credentials;
pub mod error;
pub mod session;
pub mod storage;

pub use authenticator::{Authenticator, TokenAuthenticator};
pub use credentials::CredentialStore;
pub use error::AuthError;
pub use session::{Credential, SessionSnapshot, SessionState};
pub use storage::{
    FileStorage, KeyringStorage, MemoryStorage, Storage, StorageError, UnavailableStorage,
};
