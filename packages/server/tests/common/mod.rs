// Common test utilities

pub mod faulty_store;
pub mod fixtures;
pub mod harness;

pub use faulty_store::*;
pub use fixtures::*;
pub use harness::*;
