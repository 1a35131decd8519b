//! Catalog bounded context: trainers and plans (read-mostly, seeded).

mod plan;
pub mod seed;
mod trainer;

pub use plan::Plan;
pub use trainer::Trainer;

/// Collection holding trainer documents.
pub const TRAINERS: &str = "trainers";

/// Collection holding plan documents.
pub const PLANS: &str = "plans";
