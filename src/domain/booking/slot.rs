//! Slot value objects: the (trainer, date, time-of-day) triple a member books.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{Timestamp, TrainerId, ValidationError};

/// Time-of-day label of a bookable slot, e.g. "18:00".
///
/// Minute precision; persisted as the display string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotTime {
    hour: u8,
    minute: u8,
}

impl SlotTime {
    /// Creates a slot time, returning error if out of range.
    pub fn new(hour: u8, minute: u8) -> Result<Self, ValidationError> {
        if hour > 23 || minute > 59 {
            return Err(ValidationError::invalid_format(
                "time",
                format!("{:02}:{:02} is not a valid time of day", hour, minute),
            ));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    fn as_naive(&self) -> NaiveTime {
        // Validated on construction.
        NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0).unwrap()
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for SlotTime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::invalid_format("time", "expected HH:MM");
        let (h, m) = s.split_once(':').ok_or_else(invalid)?;
        let hour: u8 = h.parse().map_err(|_| invalid())?;
        let minute: u8 = m.parse().map_err(|_| invalid())?;
        SlotTime::new(hour, minute)
    }
}

impl TryFrom<String> for SlotTime {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<SlotTime> for String {
    fn from(t: SlotTime) -> String {
        t.to_string()
    }
}

/// A bookable slot: one trainer, one day, one time-of-day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub trainer: TrainerId,
    pub date: NaiveDate,
    pub time: SlotTime,
}

impl Slot {
    pub fn new(trainer: TrainerId, date: NaiveDate, time: SlotTime) -> Self {
        Self { trainer, date, time }
    }

    /// Composes the full slot datetime from the date and time-of-day.
    pub fn starts_at(&self) -> Timestamp {
        Timestamp::from_datetime(self.date.and_time(self.time.as_naive()).and_utc())
    }
}

/// Inclusive day window `[date 00:00:00.000, date 23:59:59.999]`.
///
/// Session dates are persisted as full timestamps, so occupancy queries
/// range over the whole day and match on the time-of-day label separately.
pub fn day_window(date: NaiveDate) -> (Timestamp, Timestamp) {
    let start = date.and_hms_opt(0, 0, 0).unwrap().and_utc();
    let end = date.and_hms_milli_opt(23, 59, 59, 999).unwrap().and_utc();
    (
        Timestamp::from_datetime(start),
        Timestamp::from_datetime(end),
    )
}
