//! Profile bounded context: the member credit ledger.

mod aggregate;
mod errors;

pub use aggregate::{MemberProfile, Role};
pub use errors::ProfileError;

/// Collection holding member profile documents, keyed by identity key.
pub const PROFILES: &str = "profiles";
