//! Member profile aggregate - the credit ledger of one member.
//!
//! # Invariants
//!
//! - `0 <= remaining_credits <= total_credits` is an application-level
//!   policy: the store does not enforce it, the transaction manager must.
//! - Profiles are created on first successful authentication and never
//!   deleted by this subsystem.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{MemberId, Timestamp};
use crate::ports::StoreError;

/// Member roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Member,
    Staff,
}

impl Default for Role {
    fn default() -> Self {
        Role::Member
    }
}

/// Member profile as persisted in the `profiles` collection, keyed by the
/// member's identity key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberProfile {
    /// Stable identity key; doubles as the document id.
    pub uid: MemberId,

    pub email: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub role: Role,

    /// Name of the active plan, if any.
    #[serde(default)]
    pub active_plan: Option<String>,

    /// Credits granted under the active plan.
    #[serde(default)]
    pub total_credits: u32,

    /// Credits still available for booking.
    #[serde(default)]
    pub remaining_credits: u32,

    /// When the active plan renews, if any.
    #[serde(default)]
    pub renewal_at: Option<Timestamp>,

    pub registered_at: Timestamp,

    pub last_seen_at: Timestamp,
}

impl MemberProfile {
    /// A fresh profile with defaults, created on first authentication.
    pub fn register(uid: MemberId, email: impl Into<String>, display_name: Option<String>) -> Self {
        let now = Timestamp::now();
        Self {
            uid,
            email: email.into(),
            display_name: display_name.unwrap_or_default(),
            role: Role::Member,
            active_plan: None,
            total_credits: 0,
            remaining_credits: 0,
            renewal_at: None,
            registered_at: now,
            last_seen_at: now,
        }
    }

    /// Whether the member can pay for one more reservation.
    pub fn has_credits(&self) -> bool {
        self.remaining_credits > 0
    }

    /// Serializes the profile into a store payload.
    pub fn into_value(self) -> Result<Value, StoreError> {
        serde_json::to_value(self).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}
