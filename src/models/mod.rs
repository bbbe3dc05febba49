// src/models/mod.rs
pub mod claims;
