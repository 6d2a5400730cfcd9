//! Account store wrapper that injects races and failures.
//!
//! Delegates to a [`MemoryAccountStore`] and misbehaves on
//! `compare_and_update` according to its [`Fault`].

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pass_core::common::MembershipId;
use pass_core::domains::membership::{Membership, MembershipChange, TokenState};
use pass_core::domains::pass::PassToken;
use pass_core::kernel::{BaseAccountStore, CasOutcome, MemoryAccountStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Another poll rotates the token just before each redeem is applied.
    RotateBeforeRedeem,
    /// Every conditional update loses its race.
    AlwaysConflict,
    /// Reads work, writes fail with `Unavailable`.
    WritesUnavailable,
    /// Every call fails with `Unavailable`.
    Unavailable,
}

pub struct FaultyAccountStore {
    inner: MemoryAccountStore,
    fault: Fault,
    cas_calls: AtomicUsize,
}

impl FaultyAccountStore {
    pub fn new(inner: MemoryAccountStore, fault: Fault) -> Self {
        Self {
            inner,
            fault,
            cas_calls: AtomicUsize::new(0),
        }
    }

    /// Conditional updates attempted through this wrapper.
    pub fn cas_calls(&self) -> usize {
        self.cas_calls.load(Ordering::SeqCst)
    }

    /// The wrapped store, for asserting on what was actually written.
    pub fn inner(&self) -> &MemoryAccountStore {
        &self.inner
    }

    fn unavailable() -> StoreError {
        StoreError::Unavailable("connection reset by peer".to_string())
    }
}

#[async_trait]
impl BaseAccountStore for FaultyAccountStore {
    async fn get_by_id(&self, id: MembershipId) -> Result<Membership, StoreError> {
        if self.fault == Fault::Unavailable {
            return Err(Self::unavailable());
        }
        self.inner.get_by_id(id).await
    }

    async fn get_by_token(&self, token: &PassToken) -> Result<Membership, StoreError> {
        if self.fault == Fault::Unavailable {
            return Err(Self::unavailable());
        }
        self.inner.get_by_token(token).await
    }

    async fn compare_and_update(
        &self,
        id: MembershipId,
        expected: &TokenState,
        change: MembershipChange,
    ) -> Result<CasOutcome, StoreError> {
        self.cas_calls.fetch_add(1, Ordering::SeqCst);

        match self.fault {
            Fault::AlwaysConflict => Ok(CasOutcome::Conflict),
            Fault::WritesUnavailable | Fault::Unavailable => Err(Self::unavailable()),
            Fault::RotateBeforeRedeem => {
                if let MembershipChange::Redeem { at } = change {
                    let current = self.inner.get_by_id(id).await?;
                    self.inner
                        .compare_and_update(
                            id,
                            &current.token_state(),
                            MembershipChange::RotateToken {
                                token: PassToken::generate(),
                                issued_at: at,
                            },
                        )
                        .await?;
                }
                self.inner.compare_and_update(id, expected, change).await
            }
        }
    }

    async fn insert(&self, membership: Membership) -> Result<Membership, StoreError> {
        self.inner.insert(membership).await
    }

    async fn set_balance(
        &self,
        id: MembershipId,
        balance: i32,
        at: DateTime<Utc>,
    ) -> Result<Membership, StoreError> {
        self.inner.set_balance(id, balance, at).await
    }
}
