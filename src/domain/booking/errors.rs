//! Booking-specific error types.
//!
//! Closed enumeration of every way a booking operation can fail, each
//! carrying the context the presentation layer needs to render a specific
//! message. Policy rejections and validation failures are never retried;
//! only the `Store` variant can be transient.

use chrono::NaiveDate;

use crate::domain::foundation::{ErrorCode, MemberId, ReservationId, Timestamp, TrainerId};
use crate::ports::StoreError;

use super::slot::SlotTime;

/// Failures of the booking operations (reserve, cancel, availability).
#[derive(Debug)]
pub enum BookingError {
    /// The caller is not signed in.
    NotAuthenticated,

    /// The requested slot does not start strictly in the future.
    PastSlot { starts_at: Timestamp },

    /// The member already holds a confirmed reservation at this date and
    /// time, regardless of trainer.
    DoubleBooking { date: NaiveDate, time: SlotTime },

    /// The trainer's slot has reached its confirmed-reservation capacity.
    SlotFull {
        trainer: TrainerId,
        date: NaiveDate,
        time: SlotTime,
    },

    /// The member has no remaining session credits.
    InsufficientCredits(MemberId),

    /// No profile document exists for the member.
    ProfileNotFound(MemberId),

    /// No reservation exists under this id.
    ReservationNotFound(ReservationId),

    /// The reservation belongs to a different member.
    NotAuthorized(ReservationId),

    /// The reservation was already cancelled.
    AlreadyCancelled(ReservationId),

    /// The slot starts too soon to cancel.
    CancellationWindowExceeded { window_hours: i64 },

    /// Infrastructure failure from the document store.
    Store(StoreError),
}

impl BookingError {
    pub fn past_slot(starts_at: Timestamp) -> Self {
        BookingError::PastSlot { starts_at }
    }

    pub fn double_booking(date: NaiveDate, time: SlotTime) -> Self {
        BookingError::DoubleBooking { date, time }
    }

    pub fn slot_full(trainer: TrainerId, date: NaiveDate, time: SlotTime) -> Self {
        BookingError::SlotFull {
            trainer,
            date,
            time,
        }
    }

    pub fn insufficient_credits(member: MemberId) -> Self {
        BookingError::InsufficientCredits(member)
    }

    pub fn profile_not_found(member: MemberId) -> Self {
        BookingError::ProfileNotFound(member)
    }

    pub fn reservation_not_found(id: ReservationId) -> Self {
        BookingError::ReservationNotFound(id)
    }

    pub fn not_authorized(id: ReservationId) -> Self {
        BookingError::NotAuthorized(id)
    }

    pub fn already_cancelled(id: ReservationId) -> Self {
        BookingError::AlreadyCancelled(id)
    }

    pub fn window_exceeded(window_hours: i64) -> Self {
        BookingError::CancellationWindowExceeded { window_hours }
    }

    /// Returns the reason code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            BookingError::NotAuthenticated => ErrorCode::NotAuthenticated,
            BookingError::PastSlot { .. } => ErrorCode::PastSlot,
            BookingError::DoubleBooking { .. } => ErrorCode::DoubleBooking,
            BookingError::SlotFull { .. } => ErrorCode::SlotFull,
            BookingError::InsufficientCredits(_) => ErrorCode::InsufficientCredits,
            BookingError::ProfileNotFound(_) => ErrorCode::ProfileNotFound,
            BookingError::ReservationNotFound(_) => ErrorCode::ReservationNotFound,
            BookingError::NotAuthorized(_) => ErrorCode::NotAuthorized,
            BookingError::AlreadyCancelled(_) => ErrorCode::AlreadyCancelled,
            BookingError::CancellationWindowExceeded { .. } => {
                ErrorCode::CancellationWindowExceeded
            }
            BookingError::Store(e) => match e {
                StoreError::Conflict => ErrorCode::StoreConflict,
                StoreError::PermissionDenied(_) => ErrorCode::PermissionDenied,
                StoreError::Unavailable(_) => ErrorCode::StoreUnavailable,
                StoreError::NotFound { .. } | StoreError::Serialization(_) => {
                    ErrorCode::InternalError
                }
            },
        }
    }

    /// Returns a user-facing error message.
    pub fn message(&self) -> String {
        match self {
            BookingError::NotAuthenticated => "Not authenticated".to_string(),
            BookingError::PastSlot { starts_at } => {
                format!("Slot at {} is not in the future", starts_at.to_rfc3339())
            }
            BookingError::DoubleBooking { date, time } => {
                format!("You already hold a reservation on {} at {}", date, time)
            }
            BookingError::SlotFull {
                trainer,
                date,
                time,
            } => format!("Trainer {} is fully booked on {} at {}", trainer, date, time),
            BookingError::InsufficientCredits(member) => {
                format!("Member {} has no session credits remaining", member)
            }
            BookingError::ProfileNotFound(member) => {
                format!("No profile found for member {}", member)
            }
            BookingError::ReservationNotFound(id) => format!("Reservation {} not found", id),
            BookingError::NotAuthorized(id) => {
                format!("Reservation {} belongs to another member", id)
            }
            BookingError::AlreadyCancelled(id) => {
                format!("Reservation {} is already cancelled", id)
            }
            BookingError::CancellationWindowExceeded { window_hours } => format!(
                "Reservations can only be cancelled at least {} hours before the slot",
                window_hours
            ),
            BookingError::Store(e) => format!("Store error: {}", e),
        }
    }

    /// Whether retrying the same request may succeed without new input.
    ///
    /// Policy rejections and validation failures cannot change on retry;
    /// only transient store failures can.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BookingError::Store(e) if e.is_retryable())
    }
}

impl std::fmt::Display for BookingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message())
    }
}

impl std::error::Error for BookingError {}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        BookingError::Store(err)
    }
}
