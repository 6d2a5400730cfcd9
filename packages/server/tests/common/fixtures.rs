//! Test fixtures for creating memberships.

use chrono::{DateTime, Utc};
use pass_core::domains::membership::{enroll, Membership, NewMembership, Role};
use pass_core::kernel::BaseAccountStore;

/// Enroll a member with the given balance
pub async fn enroll_member(
    store: &dyn BaseAccountStore,
    balance: i32,
    now: DateTime<Utc>,
) -> Membership {
    enroll(
        store,
        NewMembership::builder().balance(balance).build(),
        now,
    )
    .await
    .expect("Failed to enroll member")
}

/// Enroll an agent
pub async fn enroll_agent(store: &dyn BaseAccountStore, now: DateTime<Utc>) -> Membership {
    enroll(
        store,
        NewMembership::builder().role(Role::Agent).balance(0).build(),
        now,
    )
    .await
    .expect("Failed to enroll agent")
}
