//! Domain layer: entities, value objects, and domain errors.

pub mod booking;
pub mod catalog;
pub mod foundation;
pub mod profile;
