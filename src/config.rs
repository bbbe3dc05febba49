// src/config.rs
//! Runtime settings for token issuance.
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults
//! 2. An optional settings file (any format the `config` crate recognises by extension)
//! 3. Environment variables prefixed with `IDTOKEN_`, e.g. `IDTOKEN_DURATION=3600`

use crate::error::Result;
use crate::providers::trust_domain::DEFAULT_TRUST_DOMAIN_COMMAND;
use ::config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Environment variable naming the settings file.
pub const CONFIG_PATH_VAR: &str = "IDTOKEN_CONFIG";

/// Permissions granted by tokens issued from the command line.
pub const DEFAULT_SCOPE: &str = "condor:/READ condor:/WRITE condor:/ADVERTISE_STARTD condor:/ADVERTISE_SCHEDD condor:/ADVERTISE_MASTER";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct IdtokenSettings {
    /// Command printing the pool's `TRUST_DOMAIN`
    pub trust_domain_command: String,

    /// Scope used when none is given explicitly
    pub default_scope: String,

    /// Token lifetime in seconds; absent or `0` issues non-expiring tokens
    #[serde(default)]
    pub duration: Option<u64>,
}

impl Default for IdtokenSettings {
    fn default() -> Self {
        Self {
            trust_domain_command: DEFAULT_TRUST_DOMAIN_COMMAND.to_string(),
            default_scope: DEFAULT_SCOPE.to_string(),
            duration: None,
        }
    }
}

impl IdtokenSettings {
    /// Loads settings from defaults, the optional `file` and the environment.
    pub fn load_from(file: Option<&Path>) -> Result<Self> {
        Self::build(
            file,
            Some(Environment::with_prefix("IDTOKEN").try_parsing(true)),
        )
    }

    fn build(file: Option<&Path>, environment: Option<Environment>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("trust_domain_command", DEFAULT_TRUST_DOMAIN_COMMAND)?
            .set_default("default_scope", DEFAULT_SCOPE)?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(true));
        }
        if let Some(environment) = environment {
            builder = builder.add_source(environment);
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Loads settings, taking the file path from `IDTOKEN_CONFIG` if set.
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_PATH_VAR) {
            Some(path) => Self::load_from(Some(Path::new(&path))),
            None => Self::load_from(None),
        }
    }

    /// The configured lifetime, with `0` meaning "never expires".
    pub fn token_duration(&self) -> Option<u64> {
        self.duration.filter(|seconds| *seconds > 0)
    }
}
