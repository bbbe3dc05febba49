// src/services/validity.rs
//! Cheap freshness pre-check for IDTOKENs.
//!
//! Looks only at the `exp` and `nbf` claims. The signature, issuer and
//! audience are never verified, so a "not expired" answer is no proof of
//! authenticity. It only tells the caller that a network authentication
//! attempt with this token is not doomed before it starts.
//!
//! Every failure, known or not, answers "expired".

use crate::models::claims::TimeClaims;
use crate::providers::clock::{Clock, SystemClock};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use log::{debug, error, warn};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

/// Outcome of inspecting a token.
///
/// Callers of the public API only ever see the boolean from
/// [`Freshness::is_expired`]; the variants exist for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub enum Freshness {
    /// All present time claims are satisfied
    Fresh,
    /// The token string was empty
    Empty,
    /// The token file could not be read
    Unavailable(String),
    /// The token could not be decoded
    Malformed(String),
    /// `exp` is at or before the current time
    Expired { exp: f64, now: i64 },
    /// `nbf` is after the current time
    NotYetValid { nbf: f64, now: i64 },
    /// Any other decoding failure
    Unknown(String),
}

impl Freshness {
    pub fn is_expired(&self) -> bool {
        !matches!(self, Freshness::Fresh)
    }
}

impl fmt::Display for Freshness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Freshness::Fresh => write!(f, "token is fresh"),
            Freshness::Empty => write!(f, "token is empty"),
            Freshness::Unavailable(reason) => write!(f, "token unavailable: {}", reason),
            Freshness::Malformed(reason) => write!(f, "bad token: {}", reason),
            Freshness::Expired { exp, now } => {
                write!(f, "expired token: exp={} is not after now={}", exp, now)
            }
            Freshness::NotYetValid { nbf, now } => {
                write!(f, "token not yet valid: nbf={} is after now={}", nbf, now)
            }
            Freshness::Unknown(reason) => write!(f, "unknown failure decoding token: {}", reason),
        }
    }
}

/// Validation settings that decode the claims without any verification.
///
/// Time claims are checked by [`ValidityChecker`] itself against its clock.
fn unverified_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.required_spec_claims.clear();
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.leeway = 0;
    validation.aud = None;
    validation.iss = None;
    validation.sub = None;
    validation
}

/// Checks the time validity of tokens against a clock.
#[derive(Clone)]
pub struct ValidityChecker {
    clock: Arc<dyn Clock>,
}

impl ValidityChecker {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Classifies a token string.
    pub fn assess(&self, token: &str) -> Freshness {
        let token = token.trim();
        if token.is_empty() {
            return Freshness::Empty;
        }

        let claims = match decode::<TimeClaims>(token, &DecodingKey::from_secret(&[]), &unverified_validation()) {
            Ok(data) => data.claims,
            Err(e) => {
                return match e.kind() {
                    ErrorKind::InvalidToken
                    | ErrorKind::Base64(_)
                    | ErrorKind::Json(_)
                    | ErrorKind::Utf8(_) => Freshness::Malformed(e.to_string()),
                    _ => Freshness::Unknown(format!("{:?}", e)),
                };
            }
        };

        let now = self.clock.now();
        if let Some(exp) = claims.exp {
            if !exp.is_finite() || exp <= now as f64 {
                return Freshness::Expired { exp, now };
            }
        }
        if let Some(nbf) = claims.nbf {
            if !nbf.is_finite() || nbf > now as f64 {
                return Freshness::NotYetValid { nbf, now };
            }
        }
        Freshness::Fresh
    }

    /// Returns `true` unless the token's `exp` and `nbf` claims both pass.
    ///
    /// Absent claims pass. Empty, undecodable or otherwise odd tokens are
    /// reported as expired and logged, never returned as errors.
    pub fn token_str_expired(&self, token: &str) -> bool {
        let outcome = self.assess(token);
        match &outcome {
            Freshness::Fresh => {}
            Freshness::Empty => debug!("The token string is empty. Considering it expired."),
            Freshness::Expired { .. } | Freshness::NotYetValid { .. } => error!("{}", outcome),
            Freshness::Malformed(_) | Freshness::Unknown(_) | Freshness::Unavailable(_) => {
                error!("{}", outcome);
                debug!("Faulty token: {}", token);
            }
        }
        outcome.is_expired()
    }

    /// Reads a token from a text file and checks it like [`Self::token_str_expired`].
    ///
    /// A missing file is logged as a warning and reported as expired.
    pub fn token_file_expired(&self, token_file: impl AsRef<Path>) -> bool {
        let token_file = token_file.as_ref();
        match fs::read_to_string(token_file) {
            Ok(contents) => self.token_str_expired(contents.trim()),
            Err(e) => {
                let outcome = Freshness::Unavailable(e.to_string());
                if e.kind() == io::ErrorKind::NotFound {
                    warn!(
                        "Token file '{}' not found. Considering it expired.",
                        token_file.display()
                    );
                } else {
                    error!("Token file '{}': {}", token_file.display(), outcome);
                }
                outcome.is_expired()
            }
        }
    }
}

impl Default for ValidityChecker {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

/// Checks a token string against the system clock.
pub fn token_str_expired(token: &str) -> bool {
    ValidityChecker::default().token_str_expired(token)
}

/// Checks a token file against the system clock.
pub fn token_file_expired(token_file: impl AsRef<Path>) -> bool {
    ValidityChecker::default().token_file_expired(token_file)
}
