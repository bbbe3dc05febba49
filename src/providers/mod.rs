// src/providers/mod.rs
//! Injectable sources of ambient state: time, identity and trust domain.

pub mod clock;
pub mod identity;
pub mod trust_domain;

pub use clock::{Clock, FixedClock, SystemClock};
pub use identity::{IdentityProvider, StaticIdentity, SystemIdentity};
pub use trust_domain::{CommandTrustDomain, StaticTrustDomain, TrustDomainProvider};
