// src/utils/crypto.rs
//! Key material handling for HTCondor-compatible IDTOKENs.
//!
//! Two steps turn a pool password into a signing key:
//! 1. [`simple_scramble`] applies HTCondor's legacy XOR obfuscation
//! 2. [`derive_master_key`] runs HKDF-SHA256 over the scrambled bytes
//!
//! Every constant in this module is shared with the collectors and schedds
//! that verify the tokens. Changing any of them produces keys no pool
//! daemon will accept.

use crate::error::{Result, TokenError};
use ring::hkdf;
use std::fmt;

/// Repeating XOR pattern of HTCondor's password scrambling.
const SCRAMBLE_PATTERN: [u8; 4] = [0xDE, 0xAD, 0xBE, 0xEF];

/// HKDF salt used by HTCondor when deriving the master JWT key.
pub const KDF_SALT: &[u8] = b"htcondor";

/// HKDF info string used by HTCondor when deriving the master JWT key.
pub const KDF_INFO: &[u8] = b"master jwt";

/// Length in bytes of a derived master key.
pub const MASTER_KEY_LEN: usize = 32;

/// Key id of the pool password.
///
/// HTCondor derives the pool key from the scrambled password concatenated
/// with itself. Tokens signed under this key id must do the same.
pub const POOL_KEY_ID: &str = "POOL";

/// A 32-byte HMAC-SHA256 signing key derived from a pool password.
#[derive(Clone, PartialEq, Eq)]
pub struct MasterKey([u8; MASTER_KEY_LEN]);

impl MasterKey {
    pub fn as_bytes(&self) -> &[u8; MASTER_KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey(..)")
    }
}

/// Output length marker for `ring`'s HKDF expansion.
struct MasterKeyLen;

impl hkdf::KeyType for MasterKeyLen {
    fn len(&self) -> usize {
        MASTER_KEY_LEN
    }
}

/// XORs each byte with HTCondor's `DEADBEEF` pattern.
///
/// The transform is its own inverse: scrambling a scrambled buffer returns
/// the original bytes. Defined for any input, including an empty one.
pub fn simple_scramble(data: &[u8]) -> Vec<u8> {
    data.iter()
        .enumerate()
        .map(|(idx, byte)| byte ^ SCRAMBLE_PATTERN[idx % SCRAMBLE_PATTERN.len()])
        .collect()
}

/// Builds the HKDF input for a given key id.
///
/// For [`POOL_KEY_ID`] the scrambled password is doubled, otherwise it is
/// used as-is.
pub fn key_material(scrambled: Vec<u8>, kid: &str) -> Vec<u8> {
    if kid == POOL_KEY_ID {
        let mut doubled = Vec::with_capacity(scrambled.len() * 2);
        doubled.extend_from_slice(&scrambled);
        doubled.extend_from_slice(&scrambled);
        doubled
    } else {
        scrambled
    }
}

/// Derives the master JWT key from a scrambled HTCondor password.
///
/// # Arguments
/// * `password` - Scrambled password bytes (see [`simple_scramble`])
///
/// # Returns
/// The 32-byte key produced by HKDF-SHA256 with salt `htcondor` and info
/// `master jwt`.
///
/// # Errors
/// `TokenError::KeyDerivation` if `ring` refuses the expansion, which cannot
/// happen for a 32-byte output.
pub fn derive_master_key(password: &[u8]) -> Result<MasterKey> {
    let salt = hkdf::Salt::new(hkdf::HKDF_SHA256, KDF_SALT);
    let prk = salt.extract(password);
    let info = [KDF_INFO];
    let okm = prk
        .expand(&info, MasterKeyLen)
        .map_err(|e| TokenError::KeyDerivation(e.to_string()))?;

    let mut key = [0u8; MASTER_KEY_LEN];
    okm.fill(&mut key)
        .map_err(|e| TokenError::KeyDerivation(e.to_string()))?;
    Ok(MasterKey(key))
}
