//! Domain entities representing the credential objects.

pub mod token;

// Re-export commonly used types
pub use token::{JsonWebToken, OpaqueToken, TokenSet, INVALIDATED_CACHE_PREFIX};
