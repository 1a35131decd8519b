//! Slotbook - Membership-Session Booking Engine
//!
//! This crate implements the reservation transaction subsystem for a
//! credit-based training service: atomic booking and cancellation of
//! trainer time slots against shared credit and occupancy state.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
