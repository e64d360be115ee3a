//! Collaborator traits consumed by the token provider.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::entities::token::JsonWebToken;
use crate::domain::events::TokenEvent;
use crate::errors::DomainResult;

/// Maps between the caller's subject model and token claims.
///
/// The provider never assumes a subject's shape; it only needs the
/// subject's stable identity string and whatever extra claims the caller
/// wants packed into the access token. `unpack` is the inverse used by
/// callers to rebuild a subject from a decoded token.
pub trait ClaimsHandler<S>: Send + Sync {
    /// Extra claims to merge into the signed payload. Null values are
    /// dropped before signing.
    fn pack(&self, subject: &S) -> Map<String, Value>;

    /// Rebuilds a subject from a decoded access token.
    fn unpack(&self, jwt: &JsonWebToken) -> DomainResult<S>;

    /// The subject's stable identity string (the `sub` claim).
    fn subject_key(&self, subject: &S) -> String;
}

/// Time-bucketed cache holding revocation markers.
///
/// A marker under `jwtInvalidated:<subject>` records "access tokens for
/// this subject expiring at or before the marker value are no longer
/// honored". `get`/`set` must be immediately consistent for a single
/// subject key within a process; no cross-process guarantee is required
/// beyond eventual visibility before the next decode call.
#[async_trait]
pub trait RevocationCache: Send + Sync {
    /// Reads a marker value, if one is present and unexpired.
    async fn get(&self, key: &str) -> DomainResult<Option<i64>>;

    /// Writes a marker that lapses at `expires_at` (unix timestamp).
    async fn set(&self, key: &str, value: i64, expires_at: i64) -> DomainResult<()>;
}

/// Receives lifecycle events.
///
/// Dispatch is fire-and-forget from the provider's perspective: failures
/// are the dispatcher's concern and are never retried by the core.
#[async_trait]
pub trait EventDispatcher<S>: Send + Sync {
    async fn dispatch(&self, event: TokenEvent<S>);
}
