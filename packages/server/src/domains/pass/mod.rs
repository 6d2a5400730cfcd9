//! Pass domain - issuing and redeeming single-use pass tokens
//!
//! Both components read a Membership, decide, then write through the
//! store's conditional update. No state is kept between calls.

pub mod errors;
pub mod issuer;
pub mod policy;
pub mod redemption;
pub mod token;

/// Re-reads allowed after a conditional update loses a race.
pub const MAX_CONFLICT_RETRIES: usize = 5;

pub use errors::{PassError, Rejection};
pub use issuer::{IssuedPass, TokenIssuer};
pub use policy::{PassPolicy, VALIDITY_WINDOW_HOURS};
pub use redemption::{Redemption, RedemptionEngine};
pub use token::PassToken;
