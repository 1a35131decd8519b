//! Application handlers, grouped by bounded context.

pub mod booking;
pub mod catalog;
pub mod profile;
