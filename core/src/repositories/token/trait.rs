//! Opaque token repository trait defining the interface for refresh token storage.

use async_trait::async_trait;

use crate::domain::entities::token::OpaqueToken;
use crate::errors::DomainError;

/// Repository trait for opaque refresh token persistence
///
/// This trait defines the contract for tracking issued refresh tokens,
/// keyed by their serialized string. Implementations must make `find`,
/// `create` and `delete` appear atomic per key: two concurrent refresh
/// calls presenting the same token string must not both observe it as
/// present. A deleted token must never be resolvable again.
#[async_trait]
pub trait OpaqueTokenRepository: Send + Sync {
    /// Find a refresh token by its serialized string
    ///
    /// # Returns
    /// * `Ok(Some(OpaqueToken))` - Token found
    /// * `Ok(None)` - No token stored under the given string
    /// * `Err(DomainError)` - Storage error occurred
    async fn find(&self, token: &str) -> Result<Option<OpaqueToken>, DomainError>;

    /// Persist a newly issued refresh token
    ///
    /// # Returns
    /// * `Ok(())` - Token stored
    /// * `Err(DomainError)` - Storage failed (e.g. duplicate token string)
    async fn create(&self, token: &OpaqueToken) -> Result<(), DomainError>;

    /// Delete a refresh token, consuming it
    ///
    /// Deleting a token that is already gone is not an error; the
    /// single-use guarantee is enforced by the lookup that precedes it.
    async fn delete(&self, token: &OpaqueToken) -> Result<(), DomainError>;
}
