//! `storekeep-auth` — pure authentication boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage. It models the
//! claims the surrounding system hands the ledger: who is acting, in what role,
//! and at which store. Authorization decisions (which store an actor may touch)
//! stay with the caller.

pub mod claims;
pub mod roles;
pub mod validator;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use roles::Role;
pub use validator::{Hs256JwtValidator, JwtValidator};
