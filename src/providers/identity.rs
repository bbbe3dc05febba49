// src/providers/identity.rs
//! Resolution of the default token subject, `<user>@<hostname>`.

use crate::error::{Result, TokenError};
use std::env;

/// Environment variables consulted, in order, for the login name.
const USER_VARS: [&str; 3] = ["USER", "LOGNAME", "USERNAME"];

/// Supplies the user and host names that make up the default identity.
pub trait IdentityProvider: Send + Sync {
    fn username(&self) -> Result<String>;

    fn hostname(&self) -> Result<String>;

    /// Default `sub` claim: `<user>@<hostname>`.
    fn identity(&self) -> Result<String> {
        Ok(format!("{}@{}", self.username()?, self.hostname()?))
    }
}

/// Reads the login name from the environment and the host name from the OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemIdentity;

impl IdentityProvider for SystemIdentity {
    fn username(&self) -> Result<String> {
        USER_VARS
            .iter()
            .filter_map(|var| env::var(var).ok())
            .find(|name| !name.trim().is_empty())
            .ok_or_else(|| {
                TokenError::IdentityUnavailable(format!(
                    "none of {} is set",
                    USER_VARS.join(", ")
                ))
            })
    }

    fn hostname(&self) -> Result<String> {
        hostname::get()
            .map(|h| h.to_string_lossy().to_string())
            .map_err(|e| TokenError::IdentityUnavailable(format!("hostname lookup failed: {}", e)))
    }
}

/// A fixed user and host pair.
#[derive(Debug, Clone)]
pub struct StaticIdentity {
    pub username: String,
    pub hostname: String,
}

impl StaticIdentity {
    pub fn new(username: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            hostname: hostname.into(),
        }
    }
}

impl IdentityProvider for StaticIdentity {
    fn username(&self) -> Result<String> {
        Ok(self.username.clone())
    }

    fn hostname(&self) -> Result<String> {
        Ok(self.hostname.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_identity() {
        let provider = StaticIdentity::new("alice", "submit.example.org");
        assert_eq!(provider.identity().unwrap(), "alice@submit.example.org");
    }

    #[test]
    fn test_system_hostname_resolves() {
        let host = SystemIdentity.hostname().unwrap();
        assert!(!host.is_empty());
    }
}
