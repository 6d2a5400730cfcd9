use thiserror::Error;

use crate::common::MembershipId;
use crate::kernel::StoreError;

/// Outcomes of issue, redeem and membership administration that are not
/// a success. All of them are expected and returned to the caller.
#[derive(Error, Debug)]
pub enum PassError {
    #[error("Membership {0} not found")]
    NotFound(MembershipId),

    #[error("Pass token does not match any live credential")]
    TokenNotFound,

    #[error("Pass token has already been redeemed")]
    TokenAlreadyUsed,

    #[error("Pass token has expired")]
    TokenExpired,

    #[error("No remaining uses on this membership")]
    BalanceExhausted,

    #[error("Membership {0} is an agent and cannot hold a pass token")]
    NotEligible(MembershipId),

    #[error("Balance cannot be negative (got {0})")]
    InvalidBalance(i32),

    #[error("Account store unavailable: {0}")]
    StoreUnavailable(String),
}

/// Response class the API layer renders for each error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    InvalidCredential,
    AlreadyRedeemed,
    NoRemainingUses,
    UnknownMembership,
    Forbidden,
    BadRequest,
    Unavailable,
}

impl PassError {
    pub fn rejection(&self) -> Rejection {
        match self {
            PassError::TokenNotFound | PassError::TokenExpired => Rejection::InvalidCredential,
            PassError::TokenAlreadyUsed => Rejection::AlreadyRedeemed,
            PassError::BalanceExhausted => Rejection::NoRemainingUses,
            PassError::NotFound(_) => Rejection::UnknownMembership,
            PassError::NotEligible(_) => Rejection::Forbidden,
            PassError::InvalidBalance(_) => Rejection::BadRequest,
            PassError::StoreUnavailable(_) => Rejection::Unavailable,
        }
    }

    /// Map a store error from a lookup by membership id.
    pub(crate) fn from_id_lookup(id: MembershipId, err: StoreError) -> Self {
        match err {
            StoreError::NotFound => PassError::NotFound(id),
            other => other.into(),
        }
    }

    /// Map a store error from a lookup by token.
    pub(crate) fn from_token_lookup(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => PassError::TokenNotFound,
            other => other.into(),
        }
    }
}

impl From<StoreError> for PassError {
    fn from(err: StoreError) -> Self {
        PassError::StoreUnavailable(err.to_string())
    }
}
