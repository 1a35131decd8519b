//! Error types shared across the domain layer.

use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Error codes organized by category.
///
/// These are the reason codes the presentation layer dispatches on, so their
/// string forms are part of the external contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Input/state validation failures
    NotAuthenticated,
    PastSlot,
    ProfileNotFound,
    ReservationNotFound,
    NotAuthorized,
    AlreadyCancelled,
    PlanNotFound,
    ValidationFailed,

    // Policy rejections
    DoubleBooking,
    SlotFull,
    InsufficientCredits,
    CancellationWindowExceeded,

    // Transient infrastructure failures
    StoreConflict,
    StoreUnavailable,
    PermissionDenied,
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::NotAuthenticated => "NOT_AUTHENTICATED",
            ErrorCode::PastSlot => "PAST_SLOT",
            ErrorCode::ProfileNotFound => "PROFILE_NOT_FOUND",
            ErrorCode::ReservationNotFound => "RESERVATION_NOT_FOUND",
            ErrorCode::NotAuthorized => "NOT_AUTHORIZED",
            ErrorCode::AlreadyCancelled => "ALREADY_CANCELLED",
            ErrorCode::PlanNotFound => "PLAN_NOT_FOUND",
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::DoubleBooking => "DOUBLE_BOOKING",
            ErrorCode::SlotFull => "SLOT_FULL",
            ErrorCode::InsufficientCredits => "INSUFFICIENT_CREDITS",
            ErrorCode::CancellationWindowExceeded => "CANCELLATION_WINDOW_EXCEEDED",
            ErrorCode::StoreConflict => "STORE_CONFLICT",
            ErrorCode::StoreUnavailable => "STORE_UNAVAILABLE",
            ErrorCode::PermissionDenied => "PERMISSION_DENIED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}
