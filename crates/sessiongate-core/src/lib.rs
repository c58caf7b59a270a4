//! Core library for sessiongate.
//!
//! Establishes a user session against a remote token endpoint, persists the
//! issued credential across restarts, exposes the current authentication
//! status, and decides whether a navigation to a given route is admitted.
//!
//! The pieces, leaves first:
//! - [`auth::Storage`] / [`auth::CredentialStore`]: durable single-slot persistence
//! - [`auth::SessionState`]: shared authentication flag and credential
//! - [`auth::TokenAuthenticator`]: login, logout and reconciliation
//! - [`routes::RouteGuard`]: per-navigation admission decision
//!
//! [`AuthContext`] wires them together for the lifetime of an application.

pub mod api;
pub mod auth;
pub mod config;
pub mod context;
pub mod routes;

pub use config::{Config, StorageBackend};
pub use context::AuthContext;
