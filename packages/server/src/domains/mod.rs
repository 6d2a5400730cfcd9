// Business domains
pub mod auth;
pub mod membership;
pub mod pass;
