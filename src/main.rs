// src/main.rs

//! # idtoken - Command Line Entry Point
//!
//! ## Usage
//! - `idtoken <password-file> <issuer> <identity>`: sign a token with the
//!   password file path as key id and the default scope, print it to stdout
//! - `idtoken create <password-file>`: issue a token with every value defaulted
//!   (trust domain issuer, `user@host` identity, file name key id)
//! - `idtoken check <token-file>`: print `valid` or `expired`; exit code 1 when expired
//!
//! ## Environment Variables
//! - `RUST_LOG`: log filter (default: `warn`)
//! - `IDTOKEN_CONFIG`: (Optional) settings file
//! - `IDTOKEN_DURATION`: (Optional) token lifetime in seconds
//! - `IDTOKEN_DEFAULT_SCOPE`: (Optional) scope for issued tokens
//! - `IDTOKEN_TRUST_DOMAIN_COMMAND`: (Optional) command printing the trust domain

use anyhow::{bail, Context};
use dotenv::dotenv;
use idtoken::config::IdtokenSettings;
use idtoken::services::issuance::{IssuanceOrchestrator, TokenRequest};
use idtoken::services::token_signer::TokenSigner;
use idtoken::services::validity::ValidityChecker;
use idtoken::utils::crypto::{derive_master_key, simple_scramble};
use std::fs;
use std::process::ExitCode;

const USAGE: &str = "usage: idtoken <password-file> <issuer> <identity>\n       idtoken create <password-file>\n       idtoken check <token-file>";

/// Signs with explicit values only: no defaulting and no POOL key doubling.
fn sign_explicit(
    settings: &IdtokenSettings,
    kid: &str,
    issuer: &str,
    identity: &str,
) -> anyhow::Result<String> {
    let data = fs::read(kid).with_context(|| format!("reading password file '{}'", kid))?;
    let master_key = derive_master_key(&simple_scramble(&data))?;
    let token = TokenSigner::default().sign(
        identity,
        issuer,
        kid,
        &master_key,
        settings.token_duration(),
        Some(&settings.default_scope),
    )?;
    Ok(token)
}

fn run(args: &[String]) -> anyhow::Result<ExitCode> {
    let settings = IdtokenSettings::load().context("loading idtoken settings")?;

    match args {
        [command, token_file] if command == "check" => {
            if ValidityChecker::default().token_file_expired(token_file) {
                println!("expired");
                Ok(ExitCode::FAILURE)
            } else {
                println!("valid");
                Ok(ExitCode::SUCCESS)
            }
        }
        [command, password_file] if command == "create" => {
            let token = IssuanceOrchestrator::from_settings(&settings).create_and_sign_token(
                password_file,
                TokenRequest {
                    duration: settings.token_duration(),
                    scope: Some(settings.default_scope.clone()),
                    ..TokenRequest::default()
                },
            )?;
            println!("{}", token);
            Ok(ExitCode::SUCCESS)
        }
        [kid, issuer, identity] => {
            println!("{}", sign_explicit(&settings, kid, issuer, identity)?);
            Ok(ExitCode::SUCCESS)
        }
        _ => bail!("{}", USAGE),
    }
}

fn main() -> anyhow::Result<ExitCode> {
    // Load environment variables from .env file
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    run(&args)
}
