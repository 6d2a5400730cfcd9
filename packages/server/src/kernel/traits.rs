// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Token freshness and redemption rules live in domains/pass and use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseAccountStore)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::common::MembershipId;
use crate::domains::membership::{Membership, MembershipChange, TokenState};
use crate::domains::pass::token::PassToken;

// =============================================================================
// Store errors
// =============================================================================

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,

    #[error("Record already exists")]
    Duplicate,

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate,
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

/// Result of a conditional update.
#[derive(Debug, Clone)]
pub enum CasOutcome {
    /// The guard held and the change was written; carries the new record.
    Applied(Membership),
    /// The record moved on since it was read; nothing was written.
    Conflict,
}

// =============================================================================
// Account Store Trait (Infrastructure - membership persistence)
// =============================================================================

/// Persistence for Membership records.
///
/// `compare_and_update` is the only coordination primitive: implementations
/// must check the guard and write the change as one atomic step.
#[async_trait]
pub trait BaseAccountStore: Send + Sync {
    /// Load a membership by id
    async fn get_by_id(&self, id: MembershipId) -> Result<Membership, StoreError>;

    /// Load the membership whose current token is `token` (any status)
    async fn get_by_token(&self, token: &PassToken) -> Result<Membership, StoreError>;

    /// Apply `change` only while the record's token fields equal `expected`
    async fn compare_and_update(
        &self,
        id: MembershipId,
        expected: &TokenState,
        change: MembershipChange,
    ) -> Result<CasOutcome, StoreError>;

    /// Persist a newly enrolled membership
    async fn insert(&self, membership: Membership) -> Result<Membership, StoreError>;

    /// Administrative balance overwrite; appends a history entry
    async fn set_balance(
        &self,
        id: MembershipId,
        balance: i32,
        at: DateTime<Utc>,
    ) -> Result<Membership, StoreError>;

    /// Cheap liveness probe for health checks
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
