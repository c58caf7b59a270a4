use thiserror::Error;

use crate::api::ApiError;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(#[source] ApiError),

    #[error("Username and password required")]
    MissingCredentials,
}

impl AuthError {
    /// The underlying cause of a failed login exchange
    pub fn cause(&self) -> Option<&ApiError> {
        match self {
            AuthError::AuthenticationFailed(cause) => Some(cause),
            AuthError::MissingCredentials => None,
        }
    }

    /// Success status but no usable credential in the body
    pub fn is_malformed_response(&self) -> bool {
        self.cause().map(ApiError::is_malformed).unwrap_or(false)
    }

    /// Message suitable for showing on the login view
    pub fn user_message(&self) -> String {
        match self {
            AuthError::MissingCredentials => "Username and password required".to_string(),
            AuthError::AuthenticationFailed(cause) => match cause {
                ApiError::Unauthorized => "Invalid username or password".to_string(),
                ApiError::RateLimited => {
                    "Too many login attempts. Please wait and try again.".to_string()
                }
                ApiError::Network(e) if e.is_timeout() => {
                    "Connection timed out. Please try again.".to_string()
                }
                ApiError::Network(_) => {
                    "Unable to connect to server. Check your connection.".to_string()
                }
                ApiError::MalformedResponse(_) => {
                    "The server returned an unexpected response.".to_string()
                }
                other => format!("Login failed: {}", other),
            },
        }
    }
}
