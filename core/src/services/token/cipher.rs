//! Signing ciphers and the registry that selects among them.

use std::fmt;
use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use rand::Rng;

use crate::errors::{DomainError, DomainResult, TokenError};

/// A signing key descriptor: algorithm, optional key id, and the key
/// material for both signing and verification.
///
/// Immutable; owned by the [`CipherRegistry`] for the process lifetime.
pub trait Cipher: fmt::Debug + Send + Sync {
    /// JWT algorithm this cipher signs with.
    fn algorithm(&self) -> Algorithm;

    /// Key id written into the token header (`kid`), if any.
    fn key_id(&self) -> Option<&str>;

    /// JWK key type tag (`kty`).
    fn key_type(&self) -> &str;

    /// Private key material for signing.
    fn encoding_key(&self) -> &EncodingKey;

    /// Public key material for verification.
    fn decoding_key(&self) -> &DecodingKey;
}

/// Ed25519 key pair signing with EdDSA.
#[derive(Clone)]
pub struct EdDsaKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    key_id: Option<String>,
}

impl fmt::Debug for EdDsaKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EdDsaKeys")
            .field("key_id", &self.key_id)
            .finish()
    }
}

impl EdDsaKeys {
    /// Creates a cipher from PEM-encoded Ed25519 keys
    ///
    /// # Arguments
    ///
    /// * `public_key_pem` - PEM-encoded public key (SPKI)
    /// * `private_key_pem` - PEM-encoded private key (PKCS#8)
    /// * `key_id` - Optional key id echoed into token headers
    ///
    /// # Returns
    ///
    /// * `Ok(EdDsaKeys)` - Cipher ready for signing and verification
    /// * `Err(DomainError)` - Key material could not be parsed
    pub fn from_pem(
        public_key_pem: &str,
        private_key_pem: &str,
        key_id: Option<String>,
    ) -> Result<Self, DomainError> {
        let encoding_key =
            EncodingKey::from_ed_pem(private_key_pem.as_bytes()).map_err(|e| {
                DomainError::Internal {
                    message: format!("invalid Ed25519 private key: {e}"),
                }
            })?;

        let decoding_key =
            DecodingKey::from_ed_pem(public_key_pem.as_bytes()).map_err(|e| {
                DomainError::Internal {
                    message: format!("invalid Ed25519 public key: {e}"),
                }
            })?;

        Ok(Self {
            encoding_key,
            decoding_key,
            key_id,
        })
    }

    /// Elliptic curve name of the underlying key pair.
    pub fn curve(&self) -> &'static str {
        "Ed25519"
    }
}

impl Cipher for EdDsaKeys {
    fn algorithm(&self) -> Algorithm {
        Algorithm::EdDSA
    }

    fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    fn key_type(&self) -> &str {
        "OKP"
    }

    fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

/// Source of the random draw used to pick a signing key.
///
/// Injected so tests can pin the selection; production uses the
/// thread-local CSPRNG. Implementations return a 1-based index in
/// `[1, max]`.
pub trait KeyIndexPicker: Send + Sync {
    fn pick(&self, max: usize) -> usize;
}

/// Default picker drawing uniformly from the thread RNG.
pub struct RandomKeyIndex;

impl KeyIndexPicker for RandomKeyIndex {
    fn pick(&self, max: usize) -> usize {
        rand::thread_rng().gen_range(1..=max)
    }
}

/// Deterministic picker for tests: always returns the configured index.
pub struct FixedKeyIndex(pub usize);

impl KeyIndexPicker for FixedKeyIndex {
    fn pick(&self, _max: usize) -> usize {
        self.0
    }
}

/// Ordered collection of signing ciphers with the key-selection policy.
///
/// New tokens are signed by one of the first `available` ciphers (staged
/// rollout); verification accepts every registered cipher, so tokens
/// signed under a rolled-off key still verify until they expire.
pub struct CipherRegistry {
    ciphers: Vec<Arc<dyn Cipher>>,
    picker: Box<dyn KeyIndexPicker>,
}

impl fmt::Debug for CipherRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherRegistry")
            .field("ciphers", &self.ciphers.len())
            .finish()
    }
}

impl CipherRegistry {
    /// Creates a registry drawing signing keys from the thread RNG.
    pub fn new(ciphers: Vec<Arc<dyn Cipher>>) -> Self {
        Self {
            ciphers,
            picker: Box::new(RandomKeyIndex),
        }
    }

    /// Replaces the randomness source, for deterministic tests.
    pub fn with_picker(mut self, picker: Box<dyn KeyIndexPicker>) -> Self {
        self.picker = picker;
        self
    }

    /// Selects the cipher to sign a new token with
    ///
    /// # Arguments
    ///
    /// * `available` - Operator cap on how many of the configured ciphers
    ///   are eligible to sign (staged rollout); `None` means all of them
    ///
    /// # Returns
    ///
    /// * `Ok(&Arc<dyn Cipher>)` - The selected cipher
    /// * `Err(DomainError)` - No ciphers are configured
    pub fn select(&self, available: Option<usize>) -> DomainResult<&Arc<dyn Cipher>> {
        if self.ciphers.is_empty() {
            return Err(TokenError::NoCiphersConfigured.into());
        }

        if self.ciphers.len() == 1 {
            return Ok(&self.ciphers[0]);
        }

        let cap = available
            .unwrap_or(self.ciphers.len())
            .min(self.ciphers.len())
            .max(1);
        let draw = self.picker.pick(cap).clamp(1, cap);

        Ok(&self.ciphers[draw - 1])
    }

    /// All registered ciphers, in configuration order.
    pub fn all(&self) -> &[Arc<dyn Cipher>] {
        &self.ciphers
    }

    /// Verification-side lookup by the token header's key id.
    ///
    /// A header without a `kid` matches the sole configured cipher, or the
    /// first cipher registered without an id.
    pub fn find(&self, kid: Option<&str>) -> Option<&Arc<dyn Cipher>> {
        match kid {
            Some(id) => self.ciphers.iter().find(|c| c.key_id() == Some(id)),
            None => {
                if self.ciphers.len() == 1 {
                    self.ciphers.first()
                } else {
                    self.ciphers.iter().find(|c| c.key_id().is_none())
                }
            }
        }
    }

    /// Accepted algorithms, collected from every registered cipher.
    pub fn algorithms(&self) -> Vec<Algorithm> {
        let mut algorithms = Vec::new();
        for cipher in &self.ciphers {
            if !algorithms.contains(&cipher.algorithm()) {
                algorithms.push(cipher.algorithm());
            }
        }
        algorithms
    }

    /// Number of registered ciphers.
    pub fn len(&self) -> usize {
        self.ciphers.len()
    }

    /// Whether the registry holds no ciphers at all.
    pub fn is_empty(&self) -> bool {
        self.ciphers.is_empty()
    }
}
