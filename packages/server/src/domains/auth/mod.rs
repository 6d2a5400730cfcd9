//! Auth domain - API bearer tokens
//!
//! Responsibilities:
//! - Signing and verifying the JWTs that carry `{membership_id, role}` to
//!   the API layer
//!
//! Login and password handling happen elsewhere; `pass_admin mint-jwt`
//! covers development.

pub mod jwt;

pub use jwt::{Claims, JwtService};
