// src/lib.rs
//! # idtoken
//!
//! Issues and pre-checks HTCondor IDTOKENs.
//!
//! ## Layout
//! 1. **Key material** (`utils::crypto`): password scrambling and HKDF key derivation
//! 2. **Signing** (`services::token_signer`): claim assembly and HS256 signing
//! 3. **Issuance** (`services::issuance`): defaults plus the full password-to-token pipeline
//! 4. **Freshness** (`services::validity`): `exp`/`nbf` checks without signature verification
//! 5. **Providers** (`providers`): clock, identity and trust domain sources
//!
//! The library only emits through the `log` facade; installing a logger is
//! left to the binary.

pub mod config;
pub mod error;
pub mod models;
pub mod providers;
pub mod services;
pub mod utils;

pub use error::{Result, TokenError};
pub use models::claims::ClaimSet;
pub use services::issuance::{IssuanceOrchestrator, TokenRequest};
pub use services::token_signer::TokenSigner;
pub use services::validity::{token_file_expired, token_str_expired, Freshness, ValidityChecker};
pub use utils::crypto::{derive_master_key, simple_scramble, MasterKey, POOL_KEY_ID};
