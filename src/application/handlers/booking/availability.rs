//! CheckAvailabilityHandler - advisory slot availability check.
//!
//! Answers "could this member book this slot right now?" from a plain query.
//! The answer is advisory: it can go stale the moment it is produced, so the
//! reserve handler re-runs the same rules inside its transaction, where the
//! store validates the occupancy read at commit.

use std::sync::Arc;

use crate::config::BookingPolicy;
use crate::domain::booking::{day_window, BookingError, Reservation, Slot, RESERVATIONS};
use crate::domain::foundation::MemberId;
use crate::ports::{Document, DocumentStore, Query};

/// Query selecting every confirmed reservation on the slot's day.
///
/// Occupancy rules need the whole day: self-overlap looks across trainers,
/// so the query cannot narrow to one trainer.
pub(crate) fn confirmed_day_query(slot: &Slot) -> Query {
    let (start, end) = day_window(slot.date);
    Query::collection(RESERVATIONS)
        .filter_eq("status", "confirmed")
        .filter_gte("session_date", start.to_rfc3339())
        .filter_lte("session_date", end.to_rfc3339())
}

/// Applies the occupancy rules to one day's confirmed reservations.
///
/// Rejects with `DoubleBooking` when the member already holds any
/// reservation at the slot's time (regardless of trainer), then with
/// `SlotFull` when the trainer's slot is at capacity.
pub(crate) fn check_slot(
    member: &MemberId,
    slot: &Slot,
    day_docs: &[Document],
    capacity_per_slot: u32,
) -> Result<(), BookingError> {
    let mut occupied = 0u32;
    for doc in day_docs {
        let reservation = Reservation::from_document(doc)?;
        if reservation.time != slot.time {
            continue;
        }
        if reservation.member_id == *member {
            return Err(BookingError::double_booking(slot.date, slot.time));
        }
        if reservation.trainer_id == slot.trainer {
            occupied += 1;
        }
    }
    if occupied >= capacity_per_slot {
        return Err(BookingError::slot_full(
            slot.trainer.clone(),
            slot.date,
            slot.time,
        ));
    }
    Ok(())
}

/// Handler for advisory availability checks.
pub struct CheckAvailabilityHandler {
    store: Arc<dyn DocumentStore>,
    policy: BookingPolicy,
}

impl CheckAvailabilityHandler {
    pub fn new(store: Arc<dyn DocumentStore>, policy: BookingPolicy) -> Self {
        Self { store, policy }
    }

    /// Returns `Ok(())` when the slot currently looks bookable for the
    /// member, or the specific policy rejection.
    pub async fn handle(&self, member: &MemberId, slot: &Slot) -> Result<(), BookingError> {
        let day_docs = self.store.query(&confirmed_day_query(slot)).await?;
        check_slot(member, slot, &day_docs, self.policy.capacity_per_slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryDocumentStore;
    use crate::domain::booking::ReservationDraft;
    use crate::domain::foundation::TrainerId;
    use chrono::NaiveDate;

    fn slot(trainer: &str, time: &str) -> Slot {
        Slot::new(
            TrainerId::new(trainer).unwrap(),
            NaiveDate::from_ymd_opt(2099, 6, 15).unwrap(),
            time.parse().unwrap(),
        )
    }

    async fn seed_confirmed(store: &MemoryDocumentStore, member: &str, s: &Slot) {
        let draft = ReservationDraft::confirmed(MemberId::new(member).unwrap(), s, "Trainer", None);
        store
            .insert(RESERVATIONS, draft.into_value().unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn free_slot_is_available() {
        let store = Arc::new(MemoryDocumentStore::new());
        let handler = CheckAvailabilityHandler::new(store, BookingPolicy::default());

        let result = handler
            .handle(&MemberId::new("m1").unwrap(), &slot("t1", "18:00"))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn own_reservation_at_same_time_blocks_even_with_other_trainer() {
        let store = Arc::new(MemoryDocumentStore::new());
        seed_confirmed(&store, "m1", &slot("t1", "18:00")).await;
        let handler = CheckAvailabilityHandler::new(store, BookingPolicy::default());

        let result = handler
            .handle(&MemberId::new("m1").unwrap(), &slot("t2", "18:00"))
            .await;
        assert!(matches!(result, Err(BookingError::DoubleBooking { .. })));
    }

    #[tokio::test]
    async fn full_slot_is_rejected_for_other_members() {
        let store = Arc::new(MemoryDocumentStore::new());
        seed_confirmed(&store, "m1", &slot("t1", "18:00")).await;
        let handler = CheckAvailabilityHandler::new(store, BookingPolicy::default());

        let result = handler
            .handle(&MemberId::new("m2").unwrap(), &slot("t1", "18:00"))
            .await;
        assert!(matches!(result, Err(BookingError::SlotFull { .. })));
    }

    #[tokio::test]
    async fn other_time_on_same_day_stays_available() {
        let store = Arc::new(MemoryDocumentStore::new());
        seed_confirmed(&store, "m1", &slot("t1", "18:00")).await;
        let handler = CheckAvailabilityHandler::new(store, BookingPolicy::default());

        let result = handler
            .handle(&MemberId::new("m2").unwrap(), &slot("t1", "19:00"))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn higher_capacity_admits_more_members() {
        let store = Arc::new(MemoryDocumentStore::new());
        seed_confirmed(&store, "m1", &slot("t1", "18:00")).await;
        let policy = BookingPolicy {
            capacity_per_slot: 2,
            ..Default::default()
        };
        let handler = CheckAvailabilityHandler::new(store, policy);

        let result = handler
            .handle(&MemberId::new("m2").unwrap(), &slot("t1", "18:00"))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn cancelled_reservations_do_not_occupy() {
        let store = Arc::new(MemoryDocumentStore::new());
        let s = slot("t1", "18:00");
        let draft = ReservationDraft::confirmed(MemberId::new("m1").unwrap(), &s, "Trainer", None);
        let id = store
            .insert(RESERVATIONS, draft.into_value().unwrap())
            .await
            .unwrap();
        store
            .update(RESERVATIONS, &id, serde_json::json!({"status": "cancelled"}))
            .await
            .unwrap();
        let handler = CheckAvailabilityHandler::new(store, BookingPolicy::default());

        assert!(handler
            .handle(&MemberId::new("m2").unwrap(), &s)
            .await
            .is_ok());
        assert!(handler
            .handle(&MemberId::new("m1").unwrap(), &s)
            .await
            .is_ok());
    }
}
