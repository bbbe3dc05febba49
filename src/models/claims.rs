// src/models/claims.rs
//! Claim sets carried by HTCondor IDTOKENs.

use serde::{Deserialize, Deserializer, Serialize};

/// Payload of an IDTOKEN.
///
/// Field order matches the order in which HTCondor tooling writes the
/// claims. `exp` and `scope` are omitted entirely when absent; a token
/// without `exp` never expires.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClaimSet {
    /// Identity the token asserts, usually `user@host`
    pub sub: String,

    /// Issued-at time (Unix seconds)
    pub iat: i64,

    /// Not-before time, always equal to `iat`
    pub nbf: i64,

    /// Unique token identifier (32 lowercase hex characters)
    pub jti: String,

    /// Issuer, normally the pool's trust domain. May be empty.
    pub iss: String,

    /// Expiry time (Unix seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Space-separated permissions, e.g. `condor:/READ condor:/WRITE`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// The only claims the validity checker looks at.
///
/// Floats are accepted because some issuers write fractional timestamps.
/// A missing claim is `None`; a claim present as `null` or a non-number
/// fails to deserialize.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct TimeClaims {
    #[serde(default, deserialize_with = "present_number")]
    pub exp: Option<f64>,
    #[serde(default, deserialize_with = "present_number")]
    pub nbf: Option<f64>,
}

/// Only invoked for keys present in the payload, so `null` is rejected.
fn present_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    f64::deserialize(deserializer).map(Some)
}
