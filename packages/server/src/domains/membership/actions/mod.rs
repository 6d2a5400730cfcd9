pub mod enroll;
pub mod set_balance;

pub use enroll::{enroll, NewMembership};
pub use set_balance::set_balance;
