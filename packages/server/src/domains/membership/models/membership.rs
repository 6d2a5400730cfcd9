use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::MembershipId;
use crate::domains::pass::token::PassToken;

/// Initial allotment for a newly enrolled member.
pub const DEFAULT_BALANCE: i32 = 24;

// ============================================================================
// Enums
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "membership_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Holds a balance and presents pass tokens
    #[default]
    Member,
    /// Scans and redeems pass tokens; never holds one
    Agent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "pass_token_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TokenStatus {
    /// Issued and not yet consumed
    #[default]
    Valid,
    /// Consumed by a redemption
    Used,
}

// ============================================================================
// Records
// ============================================================================

/// One audit line on a membership's history.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub at: DateTime<Utc>,
    pub action: String,
}

impl HistoryEntry {
    pub fn new(at: DateTime<Utc>, action: impl Into<String>) -> Self {
        Self {
            at,
            action: action.into(),
        }
    }
}

/// Membership model - one record per enrolled person.
///
/// `current_token` is the only live credential; issuing a new one overwrites it.
/// `token_status` only carries meaning while `current_token` is set.
#[derive(sqlx::FromRow, Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub id: MembershipId,
    pub role: Role,
    pub balance: i32,
    pub current_token: Option<PassToken>,
    pub token_issued_at: Option<DateTime<Utc>>,
    pub token_status: TokenStatus,
    pub created_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub history: Vec<HistoryEntry>,
}

/// The token fields observed at read time.
///
/// Stores apply a [`MembershipChange`] only while the record still carries
/// exactly this state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenState {
    pub token: Option<PassToken>,
    pub status: TokenStatus,
    pub issued_at: Option<DateTime<Utc>>,
}

/// A write the core asks the store to apply atomically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipChange {
    /// Overwrite the token fields with a freshly issued token.
    RotateToken {
        token: PassToken,
        issued_at: DateTime<Utc>,
    },
    /// Mark the token used, take one from the balance and record it.
    /// Only applies while `balance > 0`.
    Redeem { at: DateTime<Utc> },
}

/// Audit action written for every successful redemption.
pub const REDEEMED_ACTION: &str = "redeemed";

impl Membership {
    /// A record as it looks right after enrollment.
    pub fn enrolled(role: Role, balance: i32, now: DateTime<Utc>) -> Self {
        Self {
            id: MembershipId::new(),
            role,
            balance,
            current_token: None,
            token_issued_at: None,
            token_status: TokenStatus::Valid,
            created_at: now,
            history: Vec::new(),
        }
    }

    pub fn token_state(&self) -> TokenState {
        TokenState {
            token: self.current_token.clone(),
            status: self.token_status,
            issued_at: self.token_issued_at,
        }
    }

    /// Whether `change` may be applied on top of this record given the
    /// state observed earlier.
    pub fn accepts(&self, expected: &TokenState, change: &MembershipChange) -> bool {
        if self.token_state() != *expected {
            return false;
        }
        match change {
            MembershipChange::RotateToken { .. } => true,
            MembershipChange::Redeem { .. } => self.balance > 0,
        }
    }

    /// Apply `change` in memory. Callers check [`Membership::accepts`] first.
    pub fn apply(&mut self, change: MembershipChange) {
        match change {
            MembershipChange::RotateToken { token, issued_at } => {
                self.current_token = Some(token);
                self.token_issued_at = Some(issued_at);
                self.token_status = TokenStatus::Valid;
            }
            MembershipChange::Redeem { at } => {
                self.token_status = TokenStatus::Used;
                self.balance -= 1;
                self.history.push(HistoryEntry::new(at, REDEEMED_ACTION));
            }
        }
    }

    // ========================================================================
    // SQL persistence
    // ========================================================================

    /// Find membership by ID, history included
    pub async fn find_by_id(id: MembershipId, pool: &PgPool) -> sqlx::Result<Option<Self>> {
        let membership =
            sqlx::query_as::<_, Self>("SELECT * FROM memberships WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;

        Self::with_history(membership, pool).await
    }

    /// Find the membership whose current token equals `token`, whatever its status
    pub async fn find_by_token(token: &PassToken, pool: &PgPool) -> sqlx::Result<Option<Self>> {
        let membership =
            sqlx::query_as::<_, Self>("SELECT * FROM memberships WHERE current_token = $1")
                .bind(token)
                .fetch_optional(pool)
                .await?;

        Self::with_history(membership, pool).await
    }

    /// Insert new membership
    pub async fn insert(&self, pool: &PgPool) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO memberships (
                id,
                role,
                balance,
                current_token,
                token_issued_at,
                token_status,
                created_at
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(self.id)
        .bind(self.role)
        .bind(self.balance)
        .bind(&self.current_token)
        .bind(self.token_issued_at)
        .bind(self.token_status)
        .bind(self.created_at)
        .fetch_one(pool)
        .await
    }

    /// Apply `change` only if the token fields still equal `expected`.
    ///
    /// Returns `None` when the guard no longer holds. The update and the
    /// history insert share one transaction.
    pub async fn compare_and_update(
        id: MembershipId,
        expected: &TokenState,
        change: &MembershipChange,
        pool: &PgPool,
    ) -> sqlx::Result<Option<Self>> {
        let mut tx = pool.begin().await?;

        let updated = match change {
            MembershipChange::RotateToken { token, issued_at } => {
                sqlx::query_as::<_, Self>(
                    "UPDATE memberships
                     SET current_token = $5,
                         token_issued_at = $6,
                         token_status = 'valid'
                     WHERE id = $1
                       AND current_token IS NOT DISTINCT FROM $2
                       AND token_status = $3
                       AND token_issued_at IS NOT DISTINCT FROM $4
                     RETURNING *",
                )
                .bind(id)
                .bind(&expected.token)
                .bind(expected.status)
                .bind(expected.issued_at)
                .bind(token)
                .bind(issued_at)
                .fetch_optional(&mut *tx)
                .await?
            }
            MembershipChange::Redeem { at } => {
                let updated = sqlx::query_as::<_, Self>(
                    "UPDATE memberships
                     SET token_status = 'used',
                         balance = balance - 1
                     WHERE id = $1
                       AND current_token IS NOT DISTINCT FROM $2
                       AND token_status = $3
                       AND token_issued_at IS NOT DISTINCT FROM $4
                       AND balance > 0
                     RETURNING *",
                )
                .bind(id)
                .bind(&expected.token)
                .bind(expected.status)
                .bind(expected.issued_at)
                .fetch_optional(&mut *tx)
                .await?;

                if updated.is_some() {
                    sqlx::query(
                        "INSERT INTO membership_history (membership_id, at, action)
                         VALUES ($1, $2, $3)",
                    )
                    .bind(id)
                    .bind(at)
                    .bind(REDEEMED_ACTION)
                    .execute(&mut *tx)
                    .await?;
                }

                updated
            }
        };

        tx.commit().await?;

        Self::with_history(updated, pool).await
    }

    /// Overwrite the balance and record the override.
    pub async fn set_balance(
        id: MembershipId,
        balance: i32,
        at: DateTime<Utc>,
        pool: &PgPool,
    ) -> sqlx::Result<Option<Self>> {
        let mut tx = pool.begin().await?;

        let updated = sqlx::query_as::<_, Self>(
            "UPDATE memberships SET balance = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(balance)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_some() {
            sqlx::query(
                "INSERT INTO membership_history (membership_id, at, action)
                 VALUES ($1, $2, $3)",
            )
            .bind(id)
            .bind(at)
            .bind(balance_set_action(balance))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Self::with_history(updated, pool).await
    }

    async fn with_history(
        membership: Option<Self>,
        pool: &PgPool,
    ) -> sqlx::Result<Option<Self>> {
        let Some(mut membership) = membership else {
            return Ok(None);
        };

        membership.history = sqlx::query_as::<_, HistoryEntry>(
            "SELECT at, action FROM membership_history
             WHERE membership_id = $1
             ORDER BY at, id",
        )
        .bind(membership.id)
        .fetch_all(pool)
        .await?;

        Ok(Some(membership))
    }
}

/// Audit action written when an administrator overrides the balance.
pub fn balance_set_action(balance: i32) -> String {
    format!("balance set to {}", balance)
}
