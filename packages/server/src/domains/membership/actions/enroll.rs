//! Enroll action - creates a membership with its initial allotment

use chrono::{DateTime, Utc};
use tracing::info;
use typed_builder::TypedBuilder;

use crate::domains::membership::models::{Membership, Role, DEFAULT_BALANCE};
use crate::domains::pass::PassError;
use crate::kernel::BaseAccountStore;

/// Enrollment input
#[derive(Debug, Clone, TypedBuilder)]
pub struct NewMembership {
    #[builder(default)]
    pub role: Role,
    #[builder(default = DEFAULT_BALANCE)]
    pub balance: i32,
}

/// Enroll a new member or agent.
///
/// The record starts with no token; the first `ensure_current_token` call
/// issues one.
pub async fn enroll(
    store: &dyn BaseAccountStore,
    input: NewMembership,
    now: DateTime<Utc>,
) -> Result<Membership, PassError> {
    if input.balance < 0 {
        return Err(PassError::InvalidBalance(input.balance));
    }

    let created = store
        .insert(Membership::enrolled(input.role, input.balance, now))
        .await?;

    info!(
        membership_id = %created.id,
        role = ?created.role,
        balance = created.balance,
        "Membership enrolled"
    );

    Ok(created)
}
