//! Freshness and redemption checks shared by the issuer and the engine.

use chrono::{DateTime, Duration, Utc};

use crate::domains::membership::{Membership, TokenStatus};

use super::errors::PassError;

/// How long an issued token may be redeemed.
pub const VALIDITY_WINDOW_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassPolicy {
    validity_window: Duration,
}

impl Default for PassPolicy {
    fn default() -> Self {
        Self {
            validity_window: Duration::hours(VALIDITY_WINDOW_HOURS),
        }
    }
}

impl PassPolicy {
    pub fn with_validity_window(validity_window: Duration) -> Self {
        Self { validity_window }
    }

    /// Saturates at the latest representable instant.
    pub fn expires_at(&self, issued_at: DateTime<Utc>) -> DateTime<Utc> {
        issued_at
            .checked_add_signed(self.validity_window)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// `now - issued_at <= window`; the boundary instant is still valid.
    pub fn within_window(&self, issued_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - issued_at <= self.validity_window
    }

    /// A token is fresh when it exists, is unconsumed and is inside the window.
    pub fn is_fresh(&self, membership: &Membership, now: DateTime<Utc>) -> bool {
        match (&membership.current_token, membership.token_issued_at) {
            (Some(_), Some(issued_at)) => {
                membership.token_status == TokenStatus::Valid
                    && self.within_window(issued_at, now)
            }
            _ => false,
        }
    }

    /// Redemption checks in order: status, then expiry, then balance.
    /// The first failure wins.
    pub fn check_redeemable(
        &self,
        membership: &Membership,
        now: DateTime<Utc>,
    ) -> Result<(), PassError> {
        if membership.token_status != TokenStatus::Valid {
            return Err(PassError::TokenAlreadyUsed);
        }

        match membership.token_issued_at {
            Some(issued_at) if self.within_window(issued_at, now) => {}
            _ => return Err(PassError::TokenExpired),
        }

        if membership.balance <= 0 {
            return Err(PassError::BalanceExhausted);
        }

        Ok(())
    }
}
