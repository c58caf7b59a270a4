//! HTTP client module for the remote token endpoint.
//!
//! This module provides the `LoginClient` that exchanges a username and
//! password for an opaque access token. The endpoint accepts a
//! form-encoded `POST {api_base}/token` and answers with a JSON body
//! carrying `access_token`.

pub mod client;
pub mod error;

pub use client::{LoginClient, SessionInfo};
pub use error::ApiError;
