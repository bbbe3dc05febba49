// src/utils/serialization.rs
//! Unverified inspection of compact JWTs.
//!
//! These helpers only decode; they never check a signature or any claim.
//! Use them to look at a token, never to trust one.

use crate::error::{Result, TokenError};
use serde_json::Value;

/// Splits a compact JWT into its header, payload and signature segments.
fn segments(token: &str) -> Result<[&str; 3]> {
    let parts: Vec<&str> = token.trim().split('.').collect();
    match parts.as_slice() {
        [header, payload, signature] => Ok([*header, *payload, *signature]),
        _ => Err(TokenError::Malformed(format!(
            "expected 3 segments, found {}",
            parts.len()
        ))),
    }
}

/// Decodes one base64url (unpadded) segment as a JSON value.
fn decode_segment(segment: &str) -> Result<Value> {
    let bytes = base64::decode_config(segment, base64::URL_SAFE_NO_PAD)
        .map_err(|e| TokenError::Malformed(format!("base64 decoding failed: {}", e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| TokenError::Malformed(format!("JSON decoding failed: {}", e)))
}

/// Decodes the header segment of a token without verification.
pub fn decode_header_unverified(token: &str) -> Result<Value> {
    let [header, _, _] = segments(token)?;
    decode_segment(header)
}

/// Decodes the claims (payload segment) of a token without verification.
///
/// # Returns
/// - `Ok(Value)` holding the JSON claims object
/// - `Err(TokenError::Malformed)` if the token shape, base64 or JSON is invalid
pub fn decode_claims_unverified(token: &str) -> Result<Value> {
    let [_, payload, _] = segments(token)?;
    decode_segment(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(json: &str) -> String {
        base64::encode_config(json, base64::URL_SAFE_NO_PAD)
    }

    #[test]
    fn test_decode_claims() {
        let token = format!(
            "{}.{}.sig",
            encode(r#"{"alg":"HS256","kid":"worker1"}"#),
            encode(r#"{"sub":"alice@host","iat":10}"#)
        );

        let claims = decode_claims_unverified(&token).unwrap();
        assert_eq!(claims["sub"], "alice@host");
        assert_eq!(claims["iat"], 10);

        let header = decode_header_unverified(&token).unwrap();
        assert_eq!(header["kid"], "worker1");
    }

    #[test]
    fn test_wrong_segment_count() {
        assert!(matches!(
            decode_claims_unverified("not-a-credential"),
            Err(TokenError::Malformed(_))
        ));
        assert!(decode_claims_unverified("a.b.c.d").is_err());
    }

    #[test]
    fn test_bad_payload() {
        assert!(decode_claims_unverified("a.!!!.c").is_err());
        let token = format!("x.{}.y", encode("not json"));
        assert!(decode_claims_unverified(&token).is_err());
    }
}
