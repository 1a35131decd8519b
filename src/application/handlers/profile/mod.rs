//! Profile command and query handlers.

mod activate_plan;
mod queries;
mod sync_profile;

pub use activate_plan::ActivatePlanHandler;
pub use queries::{ProfilePatch, ProfileQueries};
pub use sync_profile::SyncProfileHandler;
