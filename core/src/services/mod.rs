//! Business services containing the token lifecycle logic.

pub mod token;

// Re-export commonly used types
pub use token::{
    Audience, Cipher, CipherRegistry, ClaimsHandler, EdDsaKeys, EventDispatcher,
    JwtTokenProvider, OpaqueTokenFactory, RevocationCache, StringGenerator, TimeOffset,
    TokenProviderConfig,
};
