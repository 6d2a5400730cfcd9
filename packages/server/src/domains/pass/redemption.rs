//! Redemption Engine - consumes a scanned pass token.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::common::MembershipId;
use crate::domains::membership::MembershipChange;
use crate::kernel::{BaseAccountStore, CasOutcome, StoreError};

use super::errors::PassError;
use super::policy::PassPolicy;
use super::token::PassToken;
use super::MAX_CONFLICT_RETRIES;

/// What the redeeming agent is shown after a successful scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Redemption {
    pub membership_id: MembershipId,
    pub new_balance: i32,
}

#[derive(Clone)]
pub struct RedemptionEngine {
    store: Arc<dyn BaseAccountStore>,
    policy: PassPolicy,
}

impl RedemptionEngine {
    pub fn new(store: Arc<dyn BaseAccountStore>, policy: PassPolicy) -> Self {
        Self { store, policy }
    }

    /// Redeem `presented` once.
    ///
    /// Validation order is status, expiry, balance; a failed check writes
    /// nothing. The consume-and-decrement is a single conditional update, so
    /// of two concurrent scans of one token exactly one applies. The other
    /// re-reads the record and fails on the `USED` status.
    pub async fn redeem(
        &self,
        presented: &str,
        now: DateTime<Utc>,
    ) -> Result<Redemption, PassError> {
        let token = PassToken::parse(presented).ok_or(PassError::TokenNotFound)?;

        let mut membership = self
            .store
            .get_by_token(&token)
            .await
            .map_err(PassError::from_token_lookup)?;

        for attempt in 0..MAX_CONFLICT_RETRIES {
            if let Err(err) = self.policy.check_redeemable(&membership, now) {
                warn!(
                    membership_id = %membership.id,
                    token = %token.redacted(),
                    error = %err,
                    "Redemption rejected"
                );
                return Err(err);
            }

            let outcome = self
                .store
                .compare_and_update(
                    membership.id,
                    &membership.token_state(),
                    MembershipChange::Redeem { at: now },
                )
                .await
                .map_err(PassError::from_token_lookup)?;

            match outcome {
                CasOutcome::Applied(updated) => {
                    info!(
                        membership_id = %updated.id,
                        token = %token.redacted(),
                        new_balance = updated.balance,
                        "Pass token redeemed"
                    );
                    return Ok(Redemption {
                        membership_id: updated.id,
                        new_balance: updated.balance,
                    });
                }
                CasOutcome::Conflict => {
                    debug!(
                        membership_id = %membership.id,
                        attempt,
                        "Redemption raced with another writer, re-reading"
                    );
                    membership = match self.store.get_by_id(membership.id).await {
                        Ok(current) => current,
                        Err(StoreError::NotFound) => return Err(PassError::TokenNotFound),
                        Err(other) => return Err(other.into()),
                    };
                    if membership.current_token.as_ref() != Some(&token) {
                        return Err(PassError::TokenNotFound);
                    }
                }
            }
        }

        Err(PassError::StoreUnavailable(format!(
            "membership {} kept changing during redemption",
            membership.id
        )))
    }
}
