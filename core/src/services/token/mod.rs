//! Token lifecycle service
//!
//! This module implements the paired-credential lifecycle:
//! - JWT access token issuance and verification
//! - Opaque refresh token generation, rotation and revocation
//! - Signing key selection over multiple ciphers (staged rollout)
//! - Post-revoke invalidation of outstanding access tokens via cache markers

mod cipher;
mod config;
mod generator;
mod provider;
mod traits;

#[cfg(test)]
mod tests;

pub use cipher::{
    Cipher, CipherRegistry, EdDsaKeys, FixedKeyIndex, KeyIndexPicker, RandomKeyIndex,
};
pub use config::{Audience, TimeOffset, TokenProviderConfig};
pub use generator::{OpaqueTokenFactory, StringGenerator, DEFAULT_TOKEN_LENGTH};
pub use provider::JwtTokenProvider;
pub use traits::{ClaimsHandler, EventDispatcher, RevocationCache};
