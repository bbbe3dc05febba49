// src/error.rs
//! Error types for IDTOKEN issuance.
//!
//! Only the issuance path returns errors. The validity checker never does:
//! every failure there collapses into an "expired" answer.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures that can stop a token from being issued.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The pool secret could not be read. Issuance never proceeds without it.
    #[error("unable to read secret file '{}': {source}", path.display())]
    SecretUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The current user or host name could not be resolved for the default identity.
    #[error("unable to resolve default identity: {0}")]
    IdentityUnavailable(String),

    /// HKDF expansion failed.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// The claim set could not be encoded or signed.
    #[error("token encoding failed: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),

    /// The token text does not have the compact three-segment shape.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// Settings could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),
}

pub type Result<T> = std::result::Result<T, TokenError>;
