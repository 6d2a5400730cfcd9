//! Typed ID definitions for domain entities.

pub use super::id::Id;

/// Marker type for Membership entities (members and agents).
pub struct Membership;

/// Typed ID for Membership entities.
pub type MembershipId = Id<Membership>;
