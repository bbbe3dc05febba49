// src/services/mod.rs
pub mod issuance;
pub mod token_signer;
pub mod validity;
