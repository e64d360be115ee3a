//! Subject repository trait defining the interface for subject resolution.

use async_trait::async_trait;

use crate::errors::DomainError;

/// Repository trait for resolving subjects from their identity string
///
/// The core never assumes a subject's shape; it only needs to resolve the
/// identity stored alongside a refresh token back to whatever subject type
/// the caller works with. The identity/claims mapping itself lives in the
/// caller's `ClaimsHandler`.
#[async_trait]
pub trait SubjectRepository<S>: Send + Sync {
    /// Find a subject by its stable identity string
    ///
    /// # Returns
    /// * `Ok(Some(S))` - Subject found
    /// * `Ok(None)` - No subject known under the given identity
    /// * `Err(DomainError)` - Lookup error occurred
    async fn find(&self, id: &str) -> Result<Option<S>, DomainError>;
}
