// src/providers/trust_domain.rs
//! Lookup of the pool's trust domain, the default token issuer.
//!
//! A failed lookup is never fatal. Providers return `None` and log why.

use log::{debug, warn};
use std::process::Command;

/// Command HTCondor ships for reading configuration values.
pub const DEFAULT_TRUST_DOMAIN_COMMAND: &str = "condor_config_val TRUST_DOMAIN";

/// Supplies the raw `TRUST_DOMAIN` value of the pool.
pub trait TrustDomainProvider: Send + Sync {
    /// Returns the trimmed configuration value, or `None` when unavailable or empty.
    fn trust_domain(&self) -> Option<String>;
}

/// Runs an external command and reads the trust domain from its stdout.
#[derive(Debug, Clone)]
pub struct CommandTrustDomain {
    command: String,
}

impl CommandTrustDomain {
    /// # Arguments
    /// * `command` - Program and arguments separated by whitespace, e.g. `condor_config_val TRUST_DOMAIN`
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Default for CommandTrustDomain {
    fn default() -> Self {
        Self::new(DEFAULT_TRUST_DOMAIN_COMMAND)
    }
}

impl TrustDomainProvider for CommandTrustDomain {
    fn trust_domain(&self) -> Option<String> {
        let mut words = self.command.split_whitespace();
        let program = match words.next() {
            Some(program) => program,
            None => {
                warn!("Trust domain command is empty");
                return None;
            }
        };

        let output = match Command::new(program).args(words).output() {
            Ok(output) => output,
            Err(e) => {
                warn!("Unable to run '{}': {}", self.command, e);
                return None;
            }
        };

        if !output.status.success() {
            warn!(
                "'{}' exited with {}: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return None;
        }

        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        debug!("'{}' returned '{}'", self.command, value);
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }
}

/// A fixed trust domain value; `None` simulates a failed lookup.
#[derive(Debug, Clone, Default)]
pub struct StaticTrustDomain(pub Option<String>);

impl StaticTrustDomain {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Some(value.into()))
    }

    pub fn unavailable() -> Self {
        Self(None)
    }
}

impl TrustDomainProvider for StaticTrustDomain {
    fn trust_domain(&self) -> Option<String> {
        self.0
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }
}
