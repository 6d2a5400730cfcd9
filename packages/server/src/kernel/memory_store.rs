//! In-memory account store.
//!
//! Backs tests and local runs without Postgres. Every operation takes the
//! single store mutex for the length of the call and never across an await.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::common::MembershipId;
use crate::domains::membership::{
    balance_set_action, HistoryEntry, Membership, MembershipChange, TokenState,
};
use crate::domains::pass::token::PassToken;

use super::{BaseAccountStore, CasOutcome, StoreError};

#[derive(Default)]
pub struct MemoryAccountStore {
    records: Mutex<HashMap<MembershipId, Membership>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store, replacing any record with the same id.
    pub fn with_membership(self, membership: Membership) -> Self {
        if let Ok(mut records) = self.records.lock() {
            records.insert(membership.id, membership);
        }
        self
    }

    fn records(&self) -> Result<MutexGuard<'_, HashMap<MembershipId, Membership>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl BaseAccountStore for MemoryAccountStore {
    async fn get_by_id(&self, id: MembershipId) -> Result<Membership, StoreError> {
        self.records()?.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn get_by_token(&self, token: &PassToken) -> Result<Membership, StoreError> {
        self.records()?
            .values()
            .find(|m| m.current_token.as_ref() == Some(token))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn compare_and_update(
        &self,
        id: MembershipId,
        expected: &TokenState,
        change: MembershipChange,
    ) -> Result<CasOutcome, StoreError> {
        let mut records = self.records()?;
        let membership = records.get_mut(&id).ok_or(StoreError::NotFound)?;

        if !membership.accepts(expected, &change) {
            return Ok(CasOutcome::Conflict);
        }

        membership.apply(change);
        Ok(CasOutcome::Applied(membership.clone()))
    }

    async fn insert(&self, membership: Membership) -> Result<Membership, StoreError> {
        let mut records = self.records()?;
        if records.contains_key(&membership.id) {
            return Err(StoreError::Duplicate);
        }
        records.insert(membership.id, membership.clone());
        Ok(membership)
    }

    async fn set_balance(
        &self,
        id: MembershipId,
        balance: i32,
        at: DateTime<Utc>,
    ) -> Result<Membership, StoreError> {
        let mut records = self.records()?;
        let membership = records.get_mut(&id).ok_or(StoreError::NotFound)?;

        membership.balance = balance;
        membership
            .history
            .push(HistoryEntry::new(at, balance_set_action(balance)));
        Ok(membership.clone())
    }
}
