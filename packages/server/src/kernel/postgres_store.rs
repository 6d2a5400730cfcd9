//! Postgres-backed account store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::common::MembershipId;
use crate::domains::membership::{Membership, MembershipChange, TokenState};
use crate::domains::pass::token::PassToken;

use super::{BaseAccountStore, CasOutcome, StoreError};

/// Account store over the `memberships` / `membership_history` tables.
#[derive(Clone)]
pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseAccountStore for PostgresAccountStore {
    async fn get_by_id(&self, id: MembershipId) -> Result<Membership, StoreError> {
        Membership::find_by_id(id, &self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn get_by_token(&self, token: &PassToken) -> Result<Membership, StoreError> {
        Membership::find_by_token(token, &self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn compare_and_update(
        &self,
        id: MembershipId,
        expected: &TokenState,
        change: MembershipChange,
    ) -> Result<CasOutcome, StoreError> {
        let updated = Membership::compare_and_update(id, expected, &change, &self.pool).await?;

        Ok(match updated {
            Some(membership) => CasOutcome::Applied(membership),
            None => CasOutcome::Conflict,
        })
    }

    async fn insert(&self, membership: Membership) -> Result<Membership, StoreError> {
        membership.insert(&self.pool).await.map_err(Into::into)
    }

    async fn set_balance(
        &self,
        id: MembershipId,
        balance: i32,
        at: DateTime<Utc>,
    ) -> Result<Membership, StoreError> {
        Membership::set_balance(id, balance, at, &self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
