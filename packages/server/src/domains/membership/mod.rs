//! Membership domain - the per-person record shared by issuing and redemption
//!
//! Deleting a membership is an account-management action outside this crate;
//! that action must refuse AGENT memberships.

pub mod actions;
pub mod models;

pub use actions::{enroll, set_balance, NewMembership};
pub use models::*;
