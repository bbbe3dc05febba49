// src/services/issuance.rs
//! End-to-end IDTOKEN issuance from a pool password file.
//!
//! Pipeline: read password → scramble → (double for `POOL`) → HKDF → sign.
//! Missing optional inputs are defaulted from the injected providers.

use crate::config::IdtokenSettings;
use crate::error::{Result, TokenError};
use crate::providers::clock::{Clock, SystemClock};
use crate::providers::identity::{IdentityProvider, SystemIdentity};
use crate::providers::trust_domain::{CommandTrustDomain, TrustDomainProvider};
use crate::services::token_signer::TokenSigner;
use crate::utils::crypto::{derive_master_key, key_material, simple_scramble};
use log::{debug, warn};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Optional parameters of an issuance; `None` fields are defaulted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenRequest {
    /// Defaults to the first word of the pool's trust domain
    pub issuer: Option<String>,
    /// Defaults to `<user>@<hostname>`
    pub identity: Option<String>,
    /// Defaults to the file name of the password file
    pub kid: Option<String>,
    /// Lifetime in seconds; `None` or `0` never expires
    pub duration: Option<u64>,
    /// Space-separated permissions
    pub scope: Option<String>,
}

/// Returns the first word of a `TRUST_DOMAIN` value.
///
/// Words are separated by single spaces, commas or tabs. An empty first
/// word (e.g. `",a.org"`) yields `None`; later words are never promoted.
pub fn first_issuer(trust_domain: &str) -> Option<&str> {
    trust_domain
        .split(|c: char| matches!(c, ' ' | ',' | '\t'))
        .next()
        .filter(|word| !word.is_empty())
}

/// Composes scrambling, key derivation and signing.
#[derive(Clone)]
pub struct IssuanceOrchestrator {
    signer: TokenSigner,
    identity: Arc<dyn IdentityProvider>,
    trust_domain: Arc<dyn TrustDomainProvider>,
}

impl IssuanceOrchestrator {
    pub fn new(
        clock: Arc<dyn Clock>,
        identity: Arc<dyn IdentityProvider>,
        trust_domain: Arc<dyn TrustDomainProvider>,
    ) -> Self {
        Self {
            signer: TokenSigner::new(clock),
            identity,
            trust_domain,
        }
    }

    /// Uses the system clock, the login environment and the configured trust domain command.
    pub fn from_settings(settings: &IdtokenSettings) -> Self {
        Self::new(
            Arc::new(SystemClock),
            Arc::new(SystemIdentity),
            Arc::new(CommandTrustDomain::new(settings.trust_domain_command.clone())),
        )
    }

    /// Resolves the issuer: explicit value, else the trust domain, else empty.
    fn resolve_issuer(&self, issuer: Option<String>) -> String {
        if let Some(issuer) = issuer.filter(|i| !i.is_empty()) {
            return issuer;
        }

        match self.trust_domain.trust_domain() {
            Some(full_issuer) => match first_issuer(&full_issuer) {
                Some(first) => first.to_string(),
                None => {
                    warn!("TRUST_DOMAIN '{}' has no usable value: token will have empty 'iss'.", full_issuer);
                    String::new()
                }
            },
            None => {
                warn!("Unable to retrieve TRUST_DOMAIN and no issuer provided: token will have empty 'iss'.");
                String::new()
            }
        }
    }

    /// Creates and signs an HTCondor IDTOKEN.
    ///
    /// # Arguments
    /// * `secret_path` - File holding the pool password, read as raw bytes
    /// * `request` - Optional issuer, identity, key id, duration and scope
    ///
    /// # Errors
    /// - `TokenError::SecretUnavailable` if the password file cannot be read
    /// - `TokenError::IdentityUnavailable` if no identity was given and none can be resolved
    /// - `TokenError::Encoding` if signing fails
    pub fn create_and_sign_token(
        &self,
        secret_path: impl AsRef<Path>,
        request: TokenRequest,
    ) -> Result<String> {
        let secret_path = secret_path.as_ref();

        let kid = match request.kid.filter(|k| !k.is_empty()) {
            Some(kid) => kid,
            None => secret_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };
        let issuer = self.resolve_issuer(request.issuer);
        let identity = match request.identity.filter(|i| !i.is_empty()) {
            Some(identity) => identity,
            None => self.identity.identity()?,
        };

        let password = fs::read(secret_path).map_err(|source| TokenError::SecretUnavailable {
            path: secret_path.to_path_buf(),
            source,
        })?;

        // POOL keys are derived from the scrambled password written twice.
        let material = key_material(simple_scramble(&password), &kid);
        let master_key = derive_master_key(&material)?;

        debug!(
            "Issuing token for '{}' from '{}' with kid '{}'",
            identity,
            secret_path.display(),
            kid
        );
        self.signer.sign(
            &identity,
            &issuer,
            &kid,
            &master_key,
            request.duration,
            request.scope.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::clock::FixedClock;
    use crate::providers::identity::StaticIdentity;
    use crate::providers::trust_domain::StaticTrustDomain;
    use crate::utils::crypto::MasterKey;
    use crate::utils::serialization::{decode_claims_unverified, decode_header_unverified};
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
    use serde_json::Value;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const NOW: i64 = 1_700_000_000;

    fn orchestrator(trust_domain: StaticTrustDomain) -> IssuanceOrchestrator {
        IssuanceOrchestrator::new(
            Arc::new(FixedClock(NOW)),
            Arc::new(StaticIdentity::new("alice", "submit.example.org")),
            Arc::new(trust_domain),
        )
    }

    fn secret_file(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn verifies_with(token: &str, key: &MasterKey) -> bool {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        decode::<Value>(token, &DecodingKey::from_secret(key.as_bytes()), &validation).is_ok()
    }

    #[test]
    fn test_first_issuer() {
        assert_eq!(first_issuer("pool.example.org"), Some("pool.example.org"));
        assert_eq!(first_issuer("a.org, b.org"), Some("a.org"));
        assert_eq!(first_issuer("a.org\tb.org"), Some("a.org"));
        assert_eq!(first_issuer("a.org,b.org"), Some("a.org"));
        assert_eq!(first_issuer(",a.org"), None);
        assert_eq!(first_issuer("\ta.org"), None);
        assert_eq!(first_issuer(""), None);
    }

    #[test]
    fn test_leading_separator_gives_empty_issuer() {
        let dir = tempfile::tempdir().unwrap();
        let path = secret_file(&dir, "worker1", b"hunter2");

        let token = orchestrator(StaticTrustDomain::new(",a.org"))
            .create_and_sign_token(&path, TokenRequest::default())
            .unwrap();

        assert_eq!(decode_claims_unverified(&token).unwrap()["iss"], "");
    }

    #[test]
    fn test_hunter2_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let path = secret_file(&dir, "worker1", b"hunter2");

        let token = orchestrator(StaticTrustDomain::new("pool.example.org other.org"))
            .create_and_sign_token(
                &path,
                TokenRequest {
                    duration: Some(3600),
                    scope: Some("condor:/READ".to_string()),
                    ..TokenRequest::default()
                },
            )
            .unwrap();

        let claims = decode_claims_unverified(&token).unwrap();
        assert_eq!(claims["sub"], "alice@submit.example.org");
        assert_eq!(claims["iss"], "pool.example.org");
        assert_eq!(claims["scope"], "condor:/READ");
        assert_eq!(claims["iat"], NOW);
        assert_eq!(claims["nbf"], NOW);
        assert_eq!(claims["exp"], NOW + 3600);

        let header = decode_header_unverified(&token).unwrap();
        assert_eq!(header["kid"], "worker1");

        let key = derive_master_key(&simple_scramble(b"hunter2")).unwrap();
        assert!(verifies_with(&token, &key));
    }

    #[test]
    fn test_pool_kid_uses_doubled_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = secret_file(&dir, "secret", b"hunter2");
        let orchestrator = orchestrator(StaticTrustDomain::new("pool.example.org"));

        let pool_token = orchestrator
            .create_and_sign_token(
                &path,
                TokenRequest {
                    kid: Some("POOL".to_string()),
                    ..TokenRequest::default()
                },
            )
            .unwrap();
        let worker_token = orchestrator
            .create_and_sign_token(
                &path,
                TokenRequest {
                    kid: Some("worker1".to_string()),
                    ..TokenRequest::default()
                },
            )
            .unwrap();

        let scrambled = simple_scramble(b"hunter2");
        let single_key = derive_master_key(&scrambled).unwrap();
        let doubled_key = derive_master_key(&[scrambled.clone(), scrambled].concat()).unwrap();
        assert_ne!(single_key, doubled_key);

        assert!(verifies_with(&pool_token, &doubled_key));
        assert!(!verifies_with(&pool_token, &single_key));
        assert!(verifies_with(&worker_token, &single_key));
        assert!(!verifies_with(&worker_token, &doubled_key));
    }

    #[test]
    fn test_missing_secret_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let err = orchestrator(StaticTrustDomain::new("pool"))
            .create_and_sign_token(&missing, TokenRequest::default())
            .unwrap_err();
        match err {
            TokenError::SecretUnavailable { path, source } => {
                assert_eq!(path, missing);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_trust_domain_gives_empty_issuer() {
        let dir = tempfile::tempdir().unwrap();
        let path = secret_file(&dir, "worker1", b"hunter2");

        let token = orchestrator(StaticTrustDomain::unavailable())
            .create_and_sign_token(&path, TokenRequest::default())
            .unwrap();

        let claims = decode_claims_unverified(&token).unwrap();
        assert_eq!(claims["iss"], "");
        assert!(claims.get("exp").is_none());
        assert!(claims.get("scope").is_none());
    }

    #[test]
    fn test_explicit_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = secret_file(&dir, "worker1", b"hunter2");

        let token = orchestrator(StaticTrustDomain::new("pool.example.org"))
            .create_and_sign_token(
                &path,
                TokenRequest {
                    issuer: Some("collector.example.org".to_string()),
                    identity: Some("condor@execute.example.org".to_string()),
                    kid: Some("custom".to_string()),
                    ..TokenRequest::default()
                },
            )
            .unwrap();

        let claims = decode_claims_unverified(&token).unwrap();
        assert_eq!(claims["iss"], "collector.example.org");
        assert_eq!(claims["sub"], "condor@execute.example.org");
        assert_eq!(decode_header_unverified(&token).unwrap()["kid"], "custom");
    }

    #[test]
    fn test_empty_secret_file_still_signs() {
        let dir = tempfile::tempdir().unwrap();
        let path = secret_file(&dir, "empty", b"");

        let token = orchestrator(StaticTrustDomain::new("pool"))
            .create_and_sign_token(&path, TokenRequest::default())
            .unwrap();
        assert_eq!(token.split('.').count(), 3);
    }
}
