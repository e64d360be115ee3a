//! Domain-specific error types and error handling.

use thiserror::Error;

/// Token lifecycle errors
///
/// These errors represent the failure modes of token creation, verification,
/// refresh and revocation. Each variant maps to a distinct caller action:
/// an expired access token calls for a refresh, an invalid or expired
/// refresh token calls for re-authentication, and a missing cipher list is
/// a fatal misconfiguration.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("ciphers list can't be empty")]
    NoCiphersConfigured,

    #[error("invalid token: {message}")]
    Invalid { message: String },

    #[error("the token is no longer valid")]
    Expired,

    #[error("the given refresh token is no longer valid")]
    InvalidRefresh,

    #[error("the given refresh token has expired")]
    ExpiredRefresh,
}

/// Core domain errors (general purpose)
///
/// Collaborator failures (repository or cache unreachable, subject lookup
/// broken) surface through `NotFound` and `Internal` without wrapping or
/// retry; the core has no recovery strategy for infrastructure faults.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Token(#[from] TokenError),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Returns the inner token error, if this is a token failure.
    pub fn as_token_error(&self) -> Option<&TokenError> {
        match self {
            DomainError::Token(e) => Some(e),
            _ => None,
        }
    }
}
