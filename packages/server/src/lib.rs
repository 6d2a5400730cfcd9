// Pass Server - API Core
//
// This crate issues rotating single-use pass tokens to members and lets
// agents redeem them against a member's remaining balance.
// The Membership record in the account store is the only shared state.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
