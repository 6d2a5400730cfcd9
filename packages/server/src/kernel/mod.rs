//! Kernel module - server infrastructure and dependencies.

pub mod memory_store;
pub mod postgres_store;
pub mod traits;

pub use memory_store::MemoryAccountStore;
pub use postgres_store::PostgresAccountStore;
pub use traits::*;
