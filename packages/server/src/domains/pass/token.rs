//! Pass token values.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Longest input accepted from a scanner before lookup.
const MAX_PRESENTED_LEN: usize = 128;

/// Characters of a token kept when it is written to logs.
const LOG_PREFIX_LEN: usize = 8;

/// Opaque single-use credential shown by a member and scanned by an agent.
///
/// Generated from a random (v4) UUID, 122 bits from the OS RNG. `Debug`
/// only prints a prefix so records can be logged without leaking a live
/// credential.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct PassToken(String);

impl PassToken {
    /// Generate a new unguessable token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Normalize scanner input. Blank or oversized input can never match a
    /// live token and yields `None`.
    pub fn parse(presented: &str) -> Option<Self> {
        let trimmed = presented.trim();
        if trimmed.is_empty() || trimmed.len() > MAX_PRESENTED_LEN {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form for log lines.
    pub fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(LOG_PREFIX_LEN).collect();
        format!("{}…", prefix)
    }
}

impl fmt::Debug for PassToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PassToken").field(&self.redacted()).finish()
    }
}
