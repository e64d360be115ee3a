//! Token entities for paired-credential authentication.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Cache key prefix under which revocation markers are stored per subject.
pub const INVALIDATED_CACHE_PREFIX: &str = "jwtInvalidated:";

/// A signed JSON Web Token together with its decoded claim set.
///
/// Instances are only produced by the token provider, either freshly minted
/// (in which case the exposed claims also echo the `alg` and `kid` of the
/// cipher that signed it) or decoded from an incoming serialized token.
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonWebToken {
    /// Compact serialized form (`header.payload.signature`)
    token: String,

    /// Full claim set, including any extra claims packed by the caller
    claims: Map<String, Value>,
}

impl JsonWebToken {
    /// Creates a token from its serialized form and decoded claims.
    pub fn new(token: String, claims: Map<String, Value>) -> Self {
        Self { token, claims }
    }

    /// Returns the compact serialized form.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the full claim set.
    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    /// Looks up a single claim by name.
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    fn int_claim(&self, name: &str) -> Option<i64> {
        self.claims.get(name).and_then(Value::as_i64)
    }

    fn str_claim(&self, name: &str) -> Option<&str> {
        self.claims.get(name).and_then(Value::as_str)
    }

    /// Subject identity (`sub`).
    pub fn subject(&self) -> Option<&str> {
        self.str_claim("sub")
    }

    /// Issuer (`iss`).
    pub fn issuer(&self) -> Option<&str> {
        self.str_claim("iss")
    }

    /// Issued-at unix timestamp (`iat`).
    pub fn issued_at(&self) -> Option<i64> {
        self.int_claim("iat")
    }

    /// Expiry unix timestamp (`exp`).
    pub fn expires_at(&self) -> Option<i64> {
        self.int_claim("exp")
    }

    /// Not-before unix timestamp (`nbf`).
    pub fn not_before(&self) -> Option<i64> {
        self.int_claim("nbf")
    }

    /// Seconds-to-expiry claim (`exi`), present only when the provider is
    /// configured to emit it.
    pub fn expires_in(&self) -> Option<i64> {
        self.int_claim("exi")
    }

    /// Signing algorithm echo (`alg`). Only available on freshly minted tokens.
    pub fn algorithm(&self) -> Option<&str> {
        self.str_claim("alg")
    }

    /// Signing key id echo (`kid`). Only available on freshly minted tokens.
    pub fn key_id(&self) -> Option<&str> {
        self.str_claim("kid")
    }
}

/// An opaque refresh token tracked server-side.
///
/// The serialized form doubles as the repository key. The token always
/// carries the subject identity it was issued for and its own expiry;
/// arbitrary extra properties may ride along. Owned by the repository
/// until deleted, and a deleted token must never resolve again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpaqueToken {
    token: String,
    subject: String,
    expires_at: i64,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    properties: Map<String, Value>,
}

impl OpaqueToken {
    /// Creates an opaque token for a subject with the given expiry.
    pub fn new(token: String, subject: String, expires_at: i64) -> Self {
        Self {
            token,
            subject,
            expires_at,
            properties: Map::new(),
        }
    }

    /// Attaches extra properties to the token.
    pub fn with_properties(mut self, properties: Map<String, Value>) -> Self {
        self.properties = properties;
        self
    }

    /// Returns the opaque token string (also the store key).
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the subject identity the token was issued for.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the expiry unix timestamp.
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    /// Returns the extra properties attached at creation time.
    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }
}

/// An access/refresh token pair returned to the caller.
///
/// Transient: the core hands it out and retains nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSet {
    jwt: JsonWebToken,
    refresh_token: OpaqueToken,
}

impl TokenSet {
    pub fn new(jwt: JsonWebToken, refresh_token: OpaqueToken) -> Self {
        Self { jwt, refresh_token }
    }

    pub fn jwt(&self) -> &JsonWebToken {
        &self.jwt
    }

    pub fn refresh_token(&self) -> &OpaqueToken {
        &self.refresh_token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_claims() -> Map<String, Value> {
        let mut claims = Map::new();
        claims.insert("sub".to_string(), json!("qwerty"));
        claims.insert("iat".to_string(), json!(1000));
        claims.insert("nbf".to_string(), json!(1000));
        claims.insert("exp".to_string(), json!(1120));
        claims.insert("exi".to_string(), json!(120));
        claims.insert("email".to_string(), json!("john@google.com"));
        claims
    }

    #[test]
    fn test_jwt_claim_accessors() {
        let jwt = JsonWebToken::new("a.b.c".to_string(), sample_claims());

        assert_eq!(jwt.token(), "a.b.c");
        assert_eq!(jwt.subject(), Some("qwerty"));
        assert_eq!(jwt.issued_at(), Some(1000));
        assert_eq!(jwt.not_before(), Some(1000));
        assert_eq!(jwt.expires_at(), Some(1120));
        assert_eq!(jwt.expires_in(), Some(120));
        assert_eq!(jwt.claim("email"), Some(&json!("john@google.com")));
    }

    #[test]
    fn test_jwt_missing_claims_are_none() {
        let jwt = JsonWebToken::new("a.b.c".to_string(), Map::new());

        assert_eq!(jwt.subject(), None);
        assert_eq!(jwt.expires_at(), None);
        assert_eq!(jwt.algorithm(), None);
        assert_eq!(jwt.key_id(), None);
    }

    #[test]
    fn test_opaque_token_fields() {
        let token = OpaqueToken::new("abc123".to_string(), "qwerty".to_string(), 2000);

        assert_eq!(token.token(), "abc123");
        assert_eq!(token.subject(), "qwerty");
        assert_eq!(token.expires_at(), 2000);
        assert!(token.properties().is_empty());
    }

    #[test]
    fn test_opaque_token_extra_properties() {
        let mut properties = Map::new();
        properties.insert("device".to_string(), json!("mobile"));
        let token = OpaqueToken::new("abc123".to_string(), "qwerty".to_string(), 2000)
            .with_properties(properties);

        assert_eq!(token.properties().get("device"), Some(&json!("mobile")));
    }

    #[test]
    fn test_token_set_serialization() {
        let set = TokenSet::new(
            JsonWebToken::new("a.b.c".to_string(), sample_claims()),
            OpaqueToken::new("abc123".to_string(), "qwerty".to_string(), 2000),
        );

        let json = serde_json::to_string(&set).unwrap();
        let deserialized: TokenSet = serde_json::from_str(&json).unwrap();

        assert_eq!(set, deserialized);
    }
}
