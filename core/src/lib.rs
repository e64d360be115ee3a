//! # Tokensmith Core
//!
//! Credential-issuance core: issues, verifies, rotates and revokes paired
//! credentials — a short-lived signed JWT access token and a long-lived
//! opaque refresh token backing a revocable session.
//!
//! The crate contains the token lifecycle provider, the signing-key
//! registry, the opaque token generator, and the collaborator traits
//! (claims handling, token/subject storage, revocation cache, event
//! dispatch) that callers implement against their own infrastructure.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::{OpaqueTokenRepository, SubjectRepository};
pub use services::*;
