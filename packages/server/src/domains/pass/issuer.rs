//! Token Issuer - hands a member their current pass token.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::common::MembershipId;
use crate::domains::membership::{Membership, MembershipChange, Role};
use crate::kernel::{BaseAccountStore, CasOutcome};

use super::errors::PassError;
use super::policy::PassPolicy;
use super::token::PassToken;
use super::MAX_CONFLICT_RETRIES;

/// The token a member should display, with its window and the balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedPass {
    pub membership_id: MembershipId,
    #[serde(rename = "passToken")]
    pub token: PassToken,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub balance: i32,
}

impl IssuedPass {
    fn from_membership(membership: &Membership, policy: &PassPolicy) -> Option<Self> {
        let token = membership.current_token.clone()?;
        let issued_at = membership.token_issued_at?;
        Some(Self {
            membership_id: membership.id,
            token,
            issued_at,
            expires_at: policy.expires_at(issued_at),
            balance: membership.balance,
        })
    }
}

#[derive(Clone)]
pub struct TokenIssuer {
    store: Arc<dyn BaseAccountStore>,
    policy: PassPolicy,
}

impl TokenIssuer {
    pub fn new(store: Arc<dyn BaseAccountStore>, policy: PassPolicy) -> Self {
        Self { store, policy }
    }

    /// Return the member's fresh token, or rotate to a new one.
    ///
    /// Idempotent while the current token is fresh: nothing is written and the
    /// same token comes back. Balance is not checked here. When a concurrent
    /// caller rotates first, the record is re-read and the winner's token is
    /// returned.
    pub async fn ensure_current_token(
        &self,
        membership_id: MembershipId,
        now: DateTime<Utc>,
    ) -> Result<IssuedPass, PassError> {
        for attempt in 0..MAX_CONFLICT_RETRIES {
            let membership = self
                .store
                .get_by_id(membership_id)
                .await
                .map_err(|e| PassError::from_id_lookup(membership_id, e))?;

            if membership.role == Role::Agent {
                return Err(PassError::NotEligible(membership_id));
            }

            if self.policy.is_fresh(&membership, now) {
                if let Some(pass) = IssuedPass::from_membership(&membership, &self.policy) {
                    debug!(
                        membership_id = %membership_id,
                        token = %pass.token.redacted(),
                        "Current pass token still fresh"
                    );
                    return Ok(pass);
                }
            }

            let change = MembershipChange::RotateToken {
                token: PassToken::generate(),
                issued_at: now,
            };

            let outcome = self
                .store
                .compare_and_update(membership_id, &membership.token_state(), change)
                .await
                .map_err(|e| PassError::from_id_lookup(membership_id, e))?;

            match outcome {
                CasOutcome::Applied(updated) => {
                    let pass = IssuedPass::from_membership(&updated, &self.policy).ok_or_else(
                        || PassError::StoreUnavailable("rotation returned no token".to_string()),
                    )?;
                    info!(
                        membership_id = %membership_id,
                        token = %pass.token.redacted(),
                        expires_at = %pass.expires_at,
                        "Issued new pass token"
                    );
                    return Ok(pass);
                }
                CasOutcome::Conflict => {
                    debug!(
                        membership_id = %membership_id,
                        attempt,
                        "Token rotation raced with another writer, re-reading"
                    );
                }
            }
        }

        Err(PassError::StoreUnavailable(format!(
            "membership {} kept changing during token rotation",
            membership_id
        )))
    }
}
