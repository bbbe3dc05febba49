// src/services/token_signer.rs
//! IDTOKEN signing service.
//!
//! Assembles a [`ClaimSet`] and signs it with HMAC-SHA256 under a derived
//! master key. The key id travels in the JWT header so verifiers know which
//! pool password to derive the key from.

use crate::error::Result;
use crate::models::claims::ClaimSet;
use crate::providers::clock::{Clock, SystemClock};
use crate::utils::crypto::MasterKey;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

/// Signs IDTOKENs.
///
/// Holds only the clock used to stamp `iat`; keys are passed per call and
/// never retained.
#[derive(Clone)]
pub struct TokenSigner {
    clock: Arc<dyn Clock>,
}

impl TokenSigner {
    /// Creates a signer stamping tokens with the given clock.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Builds the claim set for a token issued now.
    ///
    /// `exp` is set only for a non-zero `duration`; `scope` only when it is
    /// present and non-empty.
    pub fn claims(
        &self,
        identity: &str,
        issuer: &str,
        duration: Option<u64>,
        scope: Option<&str>,
    ) -> ClaimSet {
        let iat = self.clock.now();
        let exp = duration
            .filter(|seconds| *seconds > 0)
            .map(|seconds| iat.saturating_add(i64::try_from(seconds).unwrap_or(i64::MAX)));

        ClaimSet {
            sub: identity.to_string(),
            iat,
            nbf: iat,
            jti: Uuid::new_v4().simple().to_string(),
            iss: issuer.to_string(),
            exp,
            scope: scope.filter(|s| !s.is_empty()).map(str::to_string),
        }
    }

    /// Assembles and signs an IDTOKEN.
    ///
    /// # Arguments
    /// * `identity` - Subject of the token
    /// * `issuer` - Issuer, typically the trust domain of the collector. May be empty
    /// * `kid` - Key id written to the JWT header
    /// * `key` - Master key derived for `kid`
    /// * `duration` - Lifetime in seconds. `None` or `0` means the token never expires
    /// * `scope` - Space-separated permissions. `None` means no restriction
    ///
    /// # Returns
    /// The compact `header.payload.signature` string
    ///
    /// # Errors
    /// `TokenError::Encoding` if serialization or signing fails
    pub fn sign(
        &self,
        identity: &str,
        issuer: &str,
        kid: &str,
        key: &MasterKey,
        duration: Option<u64>,
        scope: Option<&str>,
    ) -> Result<String> {
        let claims = self.claims(identity, issuer, duration, scope);
        self.sign_claims(&claims, kid, key)
    }

    /// Signs an already assembled claim set.
    pub fn sign_claims(&self, claims: &ClaimSet, kid: &str, key: &MasterKey) -> Result<String> {
        let header = Header {
            kid: Some(kid.to_string()),
            ..Header::new(Algorithm::HS256)
        };

        let token = encode(&header, claims, &EncodingKey::from_secret(key.as_bytes()))?;
        debug!(
            "Signed token jti={} sub={} kid={} exp={:?}",
            claims.jti, claims.sub, kid, claims.exp
        );
        Ok(token)
    }
}

impl Default for TokenSigner {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}
