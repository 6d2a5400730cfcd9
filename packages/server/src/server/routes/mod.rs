pub mod health;
pub mod pass;

pub use health::*;
pub use pass::*;
