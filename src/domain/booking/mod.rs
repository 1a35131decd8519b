//! Booking bounded context: slots, reservations, and their failure modes.

mod errors;
mod reservation;
mod slot;

pub use errors::BookingError;
pub use reservation::{
    Reservation, ReservationDraft, ReservationStatus, DEFAULT_CLASS_LABEL,
};
pub use slot::{day_window, Slot, SlotTime};

/// Collection holding reservation documents.
pub const RESERVATIONS: &str = "reservations";
