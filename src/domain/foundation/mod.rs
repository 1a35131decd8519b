//! Foundation value objects shared by every bounded context.

mod errors;
mod ids;
mod timestamp;

pub use errors::{ErrorCode, ValidationError};
pub use ids::{MemberId, PlanId, ReservationId, TrainerId};
pub use timestamp::Timestamp;
