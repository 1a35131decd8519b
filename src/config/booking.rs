//! Booking policy knobs.

use serde::Deserialize;

use super::error::ConfigError;

fn default_capacity_per_slot() -> u32 {
    1
}

fn default_cancellation_window_hours() -> i64 {
    2
}

fn default_plan_renewal_days() -> i64 {
    30
}

fn default_max_txn_retries() -> u32 {
    3
}

/// Policy parameters of the booking rules.
///
/// Every value has a production default; deployments override via
/// `SLOTBOOK__BOOKING__*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingPolicy {
    /// Confirmed reservations allowed per (trainer, date, time).
    #[serde(default = "default_capacity_per_slot")]
    pub capacity_per_slot: u32,

    /// Minimum lead time before the slot for a cancellation to refund.
    #[serde(default = "default_cancellation_window_hours")]
    pub cancellation_window_hours: i64,

    /// Days until an activated plan renews.
    #[serde(default = "default_plan_renewal_days")]
    pub plan_renewal_days: i64,

    /// Attempts per booking operation before a conflict is surfaced.
    #[serde(default = "default_max_txn_retries")]
    pub max_txn_retries: u32,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            capacity_per_slot: default_capacity_per_slot(),
            cancellation_window_hours: default_cancellation_window_hours(),
            plan_renewal_days: default_plan_renewal_days(),
            max_txn_retries: default_max_txn_retries(),
        }
    }
}

impl BookingPolicy {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity_per_slot == 0 {
            return Err(ConfigError::Invalid(
                "booking.capacity_per_slot must be at least 1".to_string(),
            ));
        }
        if self.cancellation_window_hours < 0 {
            return Err(ConfigError::Invalid(
                "booking.cancellation_window_hours must not be negative".to_string(),
            ));
        }
        if self.plan_renewal_days < 1 {
            return Err(ConfigError::Invalid(
                "booking.plan_renewal_days must be at least 1".to_string(),
            ));
        }
        if self.max_txn_retries == 0 {
            return Err(ConfigError::Invalid(
                "booking.max_txn_retries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let policy = BookingPolicy::default();
        assert_eq!(policy.capacity_per_slot, 1);
        assert_eq!(policy.cancellation_window_hours, 2);
        assert_eq!(policy.plan_renewal_days, 30);
        assert_eq!(policy.max_txn_retries, 3);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let policy = BookingPolicy {
            capacity_per_slot: 0,
            ..Default::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn zero_retries_is_rejected() {
        let policy = BookingPolicy {
            max_txn_retries: 0,
            ..Default::default()
        };
        assert!(policy.validate().is_err());
    }
}
