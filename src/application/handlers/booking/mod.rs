//! Booking command and query handlers.

mod availability;
mod cancel;
mod occupancy;
mod queries;
mod reserve;

pub use availability::CheckAvailabilityHandler;
pub use cancel::CancelHandler;
pub use occupancy::{OccupancyFeed, WatchOccupancyHandler};
pub use queries::{BookingQueries, HistoryFilter};
pub use reserve::{ReserveCommand, ReserveHandler};
