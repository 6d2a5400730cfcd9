//! Administrative balance override

use chrono::{DateTime, Utc};
use tracing::info;

use crate::common::MembershipId;
use crate::domains::membership::models::Membership;
use crate::domains::pass::PassError;
use crate::kernel::BaseAccountStore;

/// Overwrite a membership's balance.
///
/// Negative values are refused so the balance stays >= 0 on every write
/// path. Token fields are left alone: an outstanding token stays redeemable
/// against the new balance.
pub async fn set_balance(
    store: &dyn BaseAccountStore,
    membership_id: MembershipId,
    balance: i32,
    now: DateTime<Utc>,
) -> Result<Membership, PassError> {
    if balance < 0 {
        return Err(PassError::InvalidBalance(balance));
    }

    let updated = store
        .set_balance(membership_id, balance, now)
        .await
        .map_err(|e| PassError::from_id_lookup(membership_id, e))?;

    info!(membership_id = %membership_id, balance, "Balance overridden");

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::membership::Role;
    use crate::kernel::MemoryAccountStore;

    #[tokio::test]
    async fn test_override_records_history() {
        let now = Utc::now();
        let membership = Membership::enrolled(Role::Member, 2, now);
        let id = membership.id;
        let store = MemoryAccountStore::new().with_membership(membership);

        let updated = set_balance(&store, id, 10, now).await.unwrap();

        assert_eq!(updated.balance, 10);
        assert_eq!(updated.history.last().unwrap().action, "balance set to 10");
    }

    #[tokio::test]
    async fn test_negative_override_is_refused() {
        let now = Utc::now();
        let membership = Membership::enrolled(Role::Member, 2, now);
        let id = membership.id;
        let store = MemoryAccountStore::new().with_membership(membership);

        let result = set_balance(&store, id, -5, now).await;

        assert!(matches!(result, Err(PassError::InvalidBalance(-5))));
        assert_eq!(store.get_by_id(id).await.unwrap().balance, 2);
    }

    #[tokio::test]
    async fn test_unknown_membership() {
        let store = MemoryAccountStore::new();
        let result = set_balance(&store, MembershipId::new(), 1, Utc::now()).await;
        assert!(matches!(result, Err(PassError::NotFound(_))));
    }
}
