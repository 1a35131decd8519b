//! Reservation entity: one booked slot attempt.
//!
//! # Invariants
//!
//! - Per (trainer, date, time): at most `capacity_per_slot` reservations hold
//!   status `confirmed` at once.
//! - Per (member, date, time): at most one confirmed reservation, regardless
//!   of trainer.
//! - Cancellation is a soft status transition; reservations are never
//!   hard-deleted, preserving history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::foundation::{MemberId, ReservationId, Timestamp, TrainerId};
use crate::ports::{Document, StoreError};

use super::slot::{Slot, SlotTime};

/// Default class label when the caller does not provide one.
pub const DEFAULT_CLASS_LABEL: &str = "Training";

/// Reservation lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Confirmed,
    Cancelled,
}

/// A reservation as persisted in the store, with its document id attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Reservation {
    pub id: ReservationId,
    pub member_id: MemberId,
    pub trainer_id: TrainerId,
    /// Trainer display name, denormalized at booking time.
    pub trainer_name: String,
    /// Midnight-UTC timestamp of the session day; time-of-day is carried
    /// separately in `time`.
    pub session_date: Timestamp,
    pub time: SlotTime,
    pub class_label: String,
    /// Assigned by the store at commit.
    pub created_at: Option<Timestamp>,
    pub status: ReservationStatus,
}

#[derive(Deserialize)]
struct Persisted {
    member_id: MemberId,
    trainer_id: TrainerId,
    #[serde(default)]
    trainer_name: String,
    session_date: Timestamp,
    time: SlotTime,
    #[serde(default = "default_class_label")]
    class_label: String,
    #[serde(default)]
    created_at: Option<Timestamp>,
    status: ReservationStatus,
}

fn default_class_label() -> String {
    DEFAULT_CLASS_LABEL.to_string()
}

impl Reservation {
    /// Reconstructs a reservation from its store document.
    pub fn from_document(doc: &Document) -> Result<Self, StoreError> {
        let p: Persisted = doc.deserialize()?;
        let id = ReservationId::new(doc.id.clone())
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(Self {
            id,
            member_id: p.member_id,
            trainer_id: p.trainer_id,
            trainer_name: p.trainer_name,
            session_date: p.session_date,
            time: p.time,
            class_label: p.class_label,
            created_at: p.created_at,
            status: p.status,
        })
    }

    /// The session day.
    pub fn session_day(&self) -> NaiveDate {
        self.session_date.as_datetime().date_naive()
    }

    /// Composed slot datetime (session day + time-of-day).
    pub fn starts_at(&self) -> Timestamp {
        Slot::new(self.trainer_id.clone(), self.session_day(), self.time).starts_at()
    }
}

/// Payload for a reservation about to be created.
///
/// Carries no id or creation timestamp; the store assigns both.
#[derive(Debug, Clone, Serialize)]
pub struct ReservationDraft {
    pub member_id: MemberId,
    pub trainer_id: TrainerId,
    pub trainer_name: String,
    pub session_date: Timestamp,
    pub time: SlotTime,
    pub class_label: String,
    pub status: ReservationStatus,
}

impl ReservationDraft {
    /// A confirmed reservation draft for the given member and slot.
    pub fn confirmed(
        member_id: MemberId,
        slot: &Slot,
        trainer_name: impl Into<String>,
        class_label: Option<String>,
    ) -> Self {
        let (day_start, _) = super::slot::day_window(slot.date);
        Self {
            member_id,
            trainer_id: slot.trainer.clone(),
            trainer_name: trainer_name.into(),
            session_date: day_start,
            time: slot.time,
            class_label: class_label.unwrap_or_else(default_class_label),
            status: ReservationStatus::Confirmed,
        }
    }

    /// Serializes the draft into a store payload.
    pub fn into_value(self) -> Result<Value, StoreError> {
        serde_json::to_value(self).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}
