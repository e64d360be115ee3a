//! Opaque refresh token generation.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::domain::entities::token::OpaqueToken;

/// Factory producing unguessable opaque refresh tokens.
///
/// Implementations must derive the token string from a cryptographically
/// secure random source; the string doubles as the repository key, so it
/// has to be stable and carry enough entropy that guessing is infeasible.
/// Swappable with a deterministic factory in tests.
pub trait OpaqueTokenFactory: Send + Sync {
    /// Creates a refresh token bound to a subject with the given expiry.
    fn create(&self, subject: &str, expires_at: i64) -> OpaqueToken;
}

/// Default factory: `base64url(subject) . base64url(random bytes)`.
///
/// The subject prefix is an operational aid for log correlation; the random
/// suffix from the OS RNG is the actual source of uniqueness.
#[derive(Debug, Clone)]
pub struct StringGenerator {
    token_length: usize,
}

/// Default number of random bytes in a generated token.
pub const DEFAULT_TOKEN_LENGTH: usize = 30;

impl StringGenerator {
    pub fn new(token_length: usize) -> Self {
        Self { token_length }
    }
}

impl Default for StringGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_LENGTH)
    }
}

impl OpaqueTokenFactory for StringGenerator {
    fn create(&self, subject: &str, expires_at: i64) -> OpaqueToken {
        let mut random = vec![0u8; self.token_length];
        OsRng.fill_bytes(&mut random);

        let token = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(subject.as_bytes()),
            URL_SAFE_NO_PAD.encode(&random),
        );

        OpaqueToken::new(token, subject.to_string(), expires_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_token_shape() {
        let generator = StringGenerator::default();
        let token = generator.create("qwerty", 2000);

        assert_eq!(token.subject(), "qwerty");
        assert_eq!(token.expires_at(), 2000);

        let (prefix, suffix) = token.token().split_once('.').unwrap();
        assert_eq!(URL_SAFE_NO_PAD.decode(prefix).unwrap(), b"qwerty");
        // 30 random bytes encode to 40 base64url characters.
        assert_eq!(suffix.len(), 40);
    }

    #[test]
    fn test_tokens_are_unique_per_call() {
        let generator = StringGenerator::default();
        let first = generator.create("qwerty", 2000);
        let second = generator.create("qwerty", 2000);

        assert_ne!(first.token(), second.token());
    }

    #[test]
    fn test_configurable_length() {
        let generator = StringGenerator::new(16);
        let token = generator.create("s", 0);

        let (_, suffix) = token.token().split_once('.').unwrap();
        // 16 random bytes encode to 22 base64url characters.
        assert_eq!(suffix.len(), 22);
    }
}
