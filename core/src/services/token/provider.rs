//! Token lifecycle provider implementation

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, decode_header, encode, Header, Validation};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::domain::entities::token::{
    JsonWebToken, OpaqueToken, TokenSet, INVALIDATED_CACHE_PREFIX,
};
use crate::domain::events::{InvalidateAction, TokenEvent};
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::{OpaqueTokenRepository, SubjectRepository};

use super::cipher::CipherRegistry;
use super::config::TokenProviderConfig;
use super::generator::OpaqueTokenFactory;
use super::traits::{ClaimsHandler, EventDispatcher, RevocationCache};

/// Provider managing the lifecycle of paired credentials: a signed JWT
/// access token and an opaque, server-tracked refresh token.
///
/// The provider itself is a stateless coordinator; all mutable state lives
/// in the injected repositories and cache, so a single instance is safe
/// for concurrent use. Collaborator failures propagate to the caller
/// unchanged; nothing is retried internally.
pub struct JwtTokenProvider<S> {
    ciphers: CipherRegistry,
    token_factory: Arc<dyn OpaqueTokenFactory>,
    token_repository: Arc<dyn OpaqueTokenRepository>,
    subject_repository: Arc<dyn SubjectRepository<S>>,
    claims_handler: Arc<dyn ClaimsHandler<S>>,
    dispatcher: Arc<dyn EventDispatcher<S>>,
    invalidate_cache: Arc<dyn RevocationCache>,
    config: TokenProviderConfig,
}

impl<S> JwtTokenProvider<S>
where
    S: Clone + Send + Sync,
{
    /// Creates a new token provider from its collaborators
    ///
    /// # Arguments
    ///
    /// * `ciphers` - Registry of signing keys
    /// * `token_factory` - Generator for opaque refresh token strings
    /// * `token_repository` - Store tracking issued refresh tokens
    /// * `subject_repository` - Resolves subject identities back to subjects
    /// * `claims_handler` - Maps subjects to and from token claims
    /// * `dispatcher` - Receives lifecycle events
    /// * `invalidate_cache` - Holds post-revoke invalidation markers
    /// * `config` - Scalar provider configuration
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        ciphers: CipherRegistry,
        token_factory: Arc<dyn OpaqueTokenFactory>,
        token_repository: Arc<dyn OpaqueTokenRepository>,
        subject_repository: Arc<dyn SubjectRepository<S>>,
        claims_handler: Arc<dyn ClaimsHandler<S>>,
        dispatcher: Arc<dyn EventDispatcher<S>>,
        invalidate_cache: Arc<dyn RevocationCache>,
        config: TokenProviderConfig,
    ) -> Self {
        Self {
            ciphers,
            token_factory,
            token_repository,
            subject_repository,
            claims_handler,
            dispatcher,
            invalidate_cache,
            config,
        }
    }

    /// Issues a new access/refresh token pair for a subject
    ///
    /// Dispatches a `Created` event after the pair is built.
    ///
    /// # Returns
    ///
    /// * `Ok(TokenSet)` - The freshly issued pair
    /// * `Err(DomainError)` - No cipher configured, signing failed, or a
    ///   collaborator call failed
    pub async fn create(&self, subject: &S) -> DomainResult<TokenSet> {
        let set = self.new_token_set(subject).await?;

        debug!(
            subject = set.refresh_token().subject(),
            "issued new token set"
        );
        self.dispatcher
            .dispatch(TokenEvent::Created {
                set: set.clone(),
                subject: subject.clone(),
            })
            .await;

        Ok(set)
    }

    /// Issues an access token alone, without a refresh token or event.
    pub fn create_jwt(&self, subject: &S) -> DomainResult<JsonWebToken> {
        self.new_jwt(self.now(), subject)
    }

    /// Verifies a serialized access token and returns it with its claims
    ///
    /// Signature verification accepts any registered cipher, so tokens
    /// signed under rolled-off keys remain valid until they expire. After
    /// the signature and time claims check out, the revocation cache is
    /// consulted: a marker at or after the token's `exp` means the subject
    /// was revoked after issuance and the token is rejected as expired.
    ///
    /// # Returns
    ///
    /// * `Ok(JsonWebToken)` - Verified token with the full claim set
    /// * `Err(DomainError)` - `Expired` past its own expiry or a revocation
    ///   marker; `Invalid` for any structural or signature failure
    pub async fn decode(&self, token: &str) -> DomainResult<JsonWebToken> {
        let header = decode_header(token).map_err(|e| TokenError::Invalid {
            message: e.to_string(),
        })?;

        let cipher = self
            .ciphers
            .find(header.kid.as_deref())
            .ok_or_else(|| TokenError::Invalid {
                message: "unknown key id".to_string(),
            })?;

        if header.alg != cipher.algorithm() {
            return Err(TokenError::Invalid {
                message: "algorithm not allowed".to_string(),
            }
            .into());
        }

        // Time claims are checked below against the provider clock so the
        // test-clock override applies to verification as well.
        let mut validation = Validation::new(cipher.algorithm());
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;

        let data = decode::<Map<String, Value>>(token, cipher.decoding_key(), &validation)
            .map_err(|e| TokenError::Invalid {
                message: e.to_string(),
            })?;
        let claims = data.claims;

        let now = self.now().timestamp();
        let leeway = self.config.leeway;

        if let Some(nbf) = claims.get("nbf").and_then(Value::as_i64) {
            if nbf > now + leeway {
                return Err(TokenError::Invalid {
                    message: "the token is not yet valid".to_string(),
                }
                .into());
            }
        }

        let expires_at = claims.get("exp").and_then(Value::as_i64);
        if let Some(exp) = expires_at {
            if exp <= now - leeway {
                return Err(TokenError::Expired.into());
            }
        }

        let sub = claims
            .get("sub")
            .and_then(Value::as_str)
            .ok_or_else(|| TokenError::Invalid {
                message: "missing sub claim".to_string(),
            })?;

        let cache_key = format!("{INVALIDATED_CACHE_PREFIX}{sub}");
        if let (Some(invalidated), Some(exp)) =
            (self.invalidate_cache.get(&cache_key).await?, expires_at)
        {
            if exp <= invalidated {
                warn!(subject = sub, "rejected token invalidated by revocation");
                return Err(TokenError::Expired.into());
            }
        }

        Ok(JsonWebToken::new(token.to_string(), claims))
    }

    /// Rotates a refresh token: consumes the presented token and issues a
    /// fresh pair for the same subject
    ///
    /// Dispatches `Invalidating` before the old token is deleted and
    /// `Refreshed` once the new pair exists; no `Created` event fires.
    ///
    /// # Returns
    ///
    /// * `Ok(TokenSet)` - The replacement pair
    /// * `Err(DomainError)` - `InvalidRefresh` for an unknown or already
    ///   consumed token, `ExpiredRefresh` past its expiry plus leeway
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<TokenSet> {
        let (subject, old_refresh_token) = self
            .invalidate_token(refresh_token, InvalidateAction::Refresh)
            .await?;
        let new_set = self.new_token_set(&subject).await?;

        debug!(
            subject = old_refresh_token.subject(),
            "refresh token rotated"
        );
        self.dispatcher
            .dispatch(TokenEvent::Refreshed {
                new_set: new_set.clone(),
                old_refresh_token,
                subject,
            })
            .await;

        Ok(new_set)
    }

    /// Revokes a refresh token and invalidates the subject's outstanding
    /// access tokens
    ///
    /// Consumes the presented refresh token, then writes a revocation
    /// marker covering the same horizon as a freshly issued access token:
    /// any access token for the subject whose `exp` falls at or before the
    /// marker is henceforth rejected by `decode`, while tokens issued after
    /// the revoke carry a later `exp` and stay valid.
    pub async fn revoke(&self, refresh_token: &str) -> DomainResult<()> {
        let (subject, old_refresh_token) = self
            .invalidate_token(refresh_token, InvalidateAction::Revoke)
            .await?;

        let key = format!(
            "{}{}",
            INVALIDATED_CACHE_PREFIX,
            self.claims_handler.subject_key(&subject)
        );
        let ttl = self.config.time_to_live.apply(self.now()).timestamp();
        self.invalidate_cache.set(&key, ttl, ttl).await?;

        debug!(subject = old_refresh_token.subject(), "refresh token revoked");
        self.dispatcher
            .dispatch(TokenEvent::Revoked {
                old_refresh_token,
                subject,
            })
            .await;

        Ok(())
    }

    /// Consumes a refresh token: resolves its subject, announces the
    /// invalidation, and deletes it from the store. Deletion is what makes
    /// the token single-use; a second call with the same string fails the
    /// initial lookup.
    async fn invalidate_token(
        &self,
        refresh_token: &str,
        action: InvalidateAction,
    ) -> DomainResult<(S, OpaqueToken)> {
        let token = self.get_refresh_token(refresh_token).await?;

        let subject = self
            .subject_repository
            .find(token.subject())
            .await?
            .ok_or_else(|| DomainError::NotFound {
                resource: format!("subject {}", token.subject()),
            })?;

        self.dispatcher
            .dispatch(TokenEvent::Invalidating {
                refresh_token: token.clone(),
                subject: subject.clone(),
                action,
            })
            .await;

        self.token_repository.delete(&token).await?;

        Ok((subject, token))
    }

    async fn get_refresh_token(&self, refresh_token: &str) -> DomainResult<OpaqueToken> {
        let token = self
            .token_repository
            .find(refresh_token)
            .await?
            .ok_or(TokenError::InvalidRefresh)?;

        if token.expires_at() + self.config.leeway <= self.now().timestamp() {
            // Expired entries are cleaned up opportunistically on the way out.
            self.token_repository.delete(&token).await?;
            warn!(subject = token.subject(), "expired refresh token presented");
            return Err(TokenError::ExpiredRefresh.into());
        }

        Ok(token)
    }

    async fn new_token_set(&self, subject: &S) -> DomainResult<TokenSet> {
        let now = self.now();
        let jwt = self.new_jwt(now, subject)?;
        let refresh_token = self.new_opaque_token(now, subject).await?;

        Ok(TokenSet::new(jwt, refresh_token))
    }

    fn new_jwt(&self, now: DateTime<Utc>, subject: &S) -> DomainResult<JsonWebToken> {
        let key = self.claims_handler.subject_key(subject);
        let cipher = self.ciphers.select(self.config.available_keys)?;

        let not_before = self.config.not_before.apply(now).timestamp();
        let expires_at = self.config.time_to_live.apply(now).timestamp();

        let mut payload = Map::new();
        if let Some(issuer) = &self.config.issuer {
            payload.insert("iss".to_string(), Value::String(issuer.clone()));
        }
        if let Some(audience) = &self.config.audience {
            payload.insert(
                "aud".to_string(),
                serde_json::to_value(audience).unwrap_or(Value::Null),
            );
        }
        payload.insert("iat".to_string(), Value::from(now.timestamp()));
        payload.insert("sub".to_string(), Value::String(key));
        payload.insert("exp".to_string(), Value::from(expires_at));
        payload.insert("nbf".to_string(), Value::from(not_before));

        if self.config.add_expires_in {
            payload.insert("exi".to_string(), Value::from(expires_at - now.timestamp()));
        }

        for (claim, value) in self.claims_handler.pack(subject) {
            payload.insert(claim, value);
        }
        payload.retain(|_, value| !value.is_null());

        let mut header = Header::new(cipher.algorithm());
        header.kid = cipher.key_id().map(str::to_string);

        let jwt = encode(&header, &payload, cipher.encoding_key()).map_err(|e| {
            DomainError::Internal {
                message: format!("failed to sign token: {e}"),
            }
        })?;

        // The exposed claims echo which key signed the token; the signed
        // payload itself only carries them through the header.
        let mut claims = payload;
        claims.insert(
            "alg".to_string(),
            serde_json::to_value(cipher.algorithm()).unwrap_or(Value::Null),
        );
        if let Some(kid) = cipher.key_id() {
            claims.insert("kid".to_string(), Value::String(kid.to_string()));
        }

        Ok(JsonWebToken::new(jwt, claims))
    }

    async fn new_opaque_token(
        &self,
        now: DateTime<Utc>,
        subject: &S,
    ) -> DomainResult<OpaqueToken> {
        let key = self.claims_handler.subject_key(subject);
        let expires_at = self
            .config
            .refresh_token_time_to_live
            .apply(now)
            .timestamp();

        let token = self.token_factory.create(&key, expires_at);
        self.token_repository.create(&token).await?;

        Ok(token)
    }

    fn now(&self) -> DateTime<Utc> {
        self.config
            .test_timestamp
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
            .unwrap_or_else(Utc::now)
    }
}
