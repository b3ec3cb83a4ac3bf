//! Identity core: token issuance/verification, credential checking, and the
//! route-level access policy. Keep the public surface thin and split
//! implementation across sub-modules.

mod policy;
mod principal;
mod provider;
mod tokens;

pub use policy::{AccessPolicy, AccessRule, Requirement};
pub use principal::Principal;
pub use provider::{CredentialVerifier, OpenCredentialVerifier, User};
pub use tokens::{SigningKey, TokenService, VerificationError};
