//! ReserveHandler - books a slot, debiting one session credit atomically.
//!
//! The critical section runs inside a store transaction: the credit check,
//! the occupancy recheck, the debit, and the reservation insert all commit
//! together or not at all. When two members race for the last place, the
//! store's read validation fails one commit and the retry re-runs the rules
//! against the winner's state, surfacing `SlotFull` instead of overbooking.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::config::BookingPolicy;
use crate::domain::booking::{
    BookingError, Reservation, ReservationDraft, Slot, SlotTime, RESERVATIONS,
};
use crate::domain::foundation::{MemberId, Timestamp};
use crate::domain::profile::{MemberProfile, PROFILES};
use crate::ports::{AuthProvider, DocumentStore};

use super::availability::{check_slot, confirmed_day_query};

/// Command to reserve one trainer slot for the signed-in member.
#[derive(Debug, Clone)]
pub struct ReserveCommand {
    pub trainer_id: crate::domain::foundation::TrainerId,
    /// Trainer display name, denormalized onto the reservation.
    pub trainer_name: String,
    pub date: NaiveDate,
    pub time: SlotTime,
    /// Defaults to the standard class label when absent.
    pub class_label: Option<String>,
}

/// Handler for booking a slot.
pub struct ReserveHandler {
    store: Arc<dyn DocumentStore>,
    auth: Arc<dyn AuthProvider>,
    policy: BookingPolicy,
}

impl ReserveHandler {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        auth: Arc<dyn AuthProvider>,
        policy: BookingPolicy,
    ) -> Self {
        Self {
            store,
            auth,
            policy,
        }
    }

    pub async fn handle(&self, cmd: ReserveCommand) -> Result<Reservation, BookingError> {
        // 1. Resolve the caller
        let member = self
            .auth
            .current_user()
            .ok_or(BookingError::NotAuthenticated)?;

        // 2. Reject slots that do not start strictly in the future
        let slot = Slot::new(cmd.trainer_id.clone(), cmd.date, cmd.time);
        let starts_at = slot.starts_at();
        if !starts_at.is_after(&Timestamp::now()) {
            return Err(BookingError::past_slot(starts_at));
        }

        // 3. Advisory pre-check: reject obviously taken slots without
        //    opening a transaction. Not authoritative.
        let day_docs = self.store.query(&confirmed_day_query(&slot)).await?;
        check_slot(&member.id, &slot, &day_docs, self.policy.capacity_per_slot)?;

        // 4. Transactional attempt, retried on commit conflicts
        let mut attempt = 1;
        loop {
            match self.try_reserve(&member.id, &slot, &cmd).await {
                Ok(reservation) => return Ok(reservation),
                Err(e) if e.is_retryable() && attempt < self.policy.max_txn_retries => {
                    tracing::debug!(
                        member = %member.id,
                        attempt,
                        error = %e,
                        "reserve commit conflicted, retrying"
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One transactional booking attempt. All reads precede all writes.
    async fn try_reserve(
        &self,
        member: &MemberId,
        slot: &Slot,
        cmd: &ReserveCommand,
    ) -> Result<Reservation, BookingError> {
        let mut txn = self.store.begin().await?;

        // Credit check against the transactional read
        let profile_doc = txn
            .get(PROFILES, member.as_str())
            .await?
            .ok_or_else(|| BookingError::profile_not_found(member.clone()))?;
        let profile: MemberProfile = profile_doc.deserialize()?;
        if !profile.has_credits() {
            return Err(BookingError::insufficient_credits(member.clone()));
        }

        // Authoritative occupancy recheck: the commit validates this query's
        // result set, so a concurrent booking of the same slot conflicts us.
        let day_docs = txn.query(&confirmed_day_query(slot)).await?;
        check_slot(member, slot, &day_docs, self.policy.capacity_per_slot)?;

        // Debit one credit and insert the confirmed reservation together
        txn.update(
            PROFILES,
            member.as_str(),
            serde_json::json!({"remaining_credits": profile.remaining_credits - 1}),
        );
        let draft = ReservationDraft::confirmed(
            member.clone(),
            slot,
            cmd.trainer_name.clone(),
            cmd.class_label.clone(),
        );
        let reservation_id = txn.create(RESERVATIONS, draft.into_value()?);
        txn.commit().await?;

        // Return the stored document, including the assigned creation time
        let doc = self
            .store
            .get(RESERVATIONS, &reservation_id)
            .await?
            .ok_or(crate::ports::StoreError::NotFound {
                collection: RESERVATIONS.to_string(),
                id: reservation_id,
            })?;
        Ok(Reservation::from_document(&doc)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::StaticAuthProvider;
    use crate::adapters::memory::MemoryDocumentStore;
    use crate::domain::booking::ReservationStatus;
    use crate::domain::foundation::TrainerId;
    use crate::ports::AuthenticatedMember;

    fn far_future_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2099, 6, 15).unwrap()
    }

    fn command(trainer: &str, time: &str) -> ReserveCommand {
        ReserveCommand {
            trainer_id: TrainerId::new(trainer).unwrap(),
            trainer_name: "Carlos Titan".to_string(),
            date: far_future_date(),
            time: time.parse().unwrap(),
            class_label: None,
        }
    }

    async fn seed_profile(store: &MemoryDocumentStore, uid: &str, credits: u32) {
        let mut profile = MemberProfile::register(
            MemberId::new(uid).unwrap(),
            format!("{uid}@example.com"),
            None,
        );
        profile.total_credits = credits.max(4);
        profile.remaining_credits = credits;
        store
            .put(PROFILES, uid, profile.into_value().unwrap())
            .await
            .unwrap();
    }

    fn signed_in(uid: &str) -> Arc<StaticAuthProvider> {
        Arc::new(StaticAuthProvider::signed_in(AuthenticatedMember::new(
            MemberId::new(uid).unwrap(),
            format!("{uid}@example.com"),
            None,
        )))
    }

    fn handler(
        store: &Arc<MemoryDocumentStore>,
        auth: Arc<StaticAuthProvider>,
    ) -> ReserveHandler {
        ReserveHandler::new(store.clone(), auth, BookingPolicy::default())
    }

    async fn remaining_credits(store: &MemoryDocumentStore, uid: &str) -> u32 {
        let doc = store.get(PROFILES, uid).await.unwrap().unwrap();
        doc.deserialize::<MemberProfile>().unwrap().remaining_credits
    }

    #[tokio::test]
    async fn reserves_and_debits_one_credit() {
        let store = Arc::new(MemoryDocumentStore::new());
        seed_profile(&store, "m1", 2).await;
        let handler = handler(&store, signed_in("m1"));

        let reservation = handler.handle(command("t1", "18:00")).await.unwrap();
        assert_eq!(reservation.status, ReservationStatus::Confirmed);
        assert_eq!(reservation.trainer_name, "Carlos Titan");
        assert_eq!(reservation.class_label, "Training");
        assert!(reservation.created_at.is_some());
        assert_eq!(remaining_credits(&store, "m1").await, 1);
    }

    #[tokio::test]
    async fn fails_when_not_signed_in() {
        let store = Arc::new(MemoryDocumentStore::new());
        let handler = handler(&store, Arc::new(StaticAuthProvider::new()));

        let result = handler.handle(command("t1", "18:00")).await;
        assert!(matches!(result, Err(BookingError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn fails_for_past_slot() {
        let store = Arc::new(MemoryDocumentStore::new());
        seed_profile(&store, "m1", 2).await;
        let handler = handler(&store, signed_in("m1"));

        let cmd = ReserveCommand {
            date: NaiveDate::from_ymd_opt(2001, 1, 1).unwrap(),
            ..command("t1", "18:00")
        };
        let result = handler.handle(cmd).await;
        assert!(matches!(result, Err(BookingError::PastSlot { .. })));
        assert_eq!(store.count(RESERVATIONS).await, 0);
    }

    #[tokio::test]
    async fn fails_without_profile() {
        let store = Arc::new(MemoryDocumentStore::new());
        let handler = handler(&store, signed_in("ghost"));

        let result = handler.handle(command("t1", "18:00")).await;
        assert!(matches!(result, Err(BookingError::ProfileNotFound(_))));
    }

    #[tokio::test]
    async fn fails_without_credits_and_writes_nothing() {
        let store = Arc::new(MemoryDocumentStore::new());
        seed_profile(&store, "m1", 0).await;
        let handler = handler(&store, signed_in("m1"));

        let result = handler.handle(command("t1", "18:00")).await;
        assert!(matches!(result, Err(BookingError::InsufficientCredits(_))));
        assert_eq!(store.count(RESERVATIONS).await, 0);
        assert_eq!(remaining_credits(&store, "m1").await, 0);
    }

    #[tokio::test]
    async fn rejects_second_booking_at_same_time_across_trainers() {
        let store = Arc::new(MemoryDocumentStore::new());
        seed_profile(&store, "m1", 4).await;
        let handler = handler(&store, signed_in("m1"));

        handler.handle(command("t1", "18:00")).await.unwrap();
        let result = handler.handle(command("t2", "18:00")).await;
        assert!(matches!(result, Err(BookingError::DoubleBooking { .. })));
        assert_eq!(remaining_credits(&store, "m1").await, 3);
    }

    #[tokio::test]
    async fn rejects_booking_into_full_slot() {
        let store = Arc::new(MemoryDocumentStore::new());
        seed_profile(&store, "m1", 2).await;
        seed_profile(&store, "m2", 2).await;

        handler(&store, signed_in("m1"))
            .handle(command("t1", "18:00"))
            .await
            .unwrap();
        let result = handler(&store, signed_in("m2"))
            .handle(command("t1", "18:00"))
            .await;
        assert!(matches!(result, Err(BookingError::SlotFull { .. })));
        assert_eq!(remaining_credits(&store, "m2").await, 2);
    }

    #[tokio::test]
    async fn allows_same_member_at_different_times() {
        let store = Arc::new(MemoryDocumentStore::new());
        seed_profile(&store, "m1", 4).await;
        let handler = handler(&store, signed_in("m1"));

        handler.handle(command("t1", "18:00")).await.unwrap();
        handler.handle(command("t1", "19:00")).await.unwrap();
        assert_eq!(remaining_credits(&store, "m1").await, 2);
        assert_eq!(store.count(RESERVATIONS).await, 2);
    }

    #[tokio::test]
    async fn custom_class_label_is_persisted() {
        let store = Arc::new(MemoryDocumentStore::new());
        seed_profile(&store, "m1", 1).await;
        let handler = handler(&store, signed_in("m1"));

        let cmd = ReserveCommand {
            class_label: Some("Boxing".to_string()),
            ..command("t1", "18:00")
        };
        let reservation = handler.handle(cmd).await.unwrap();
        assert_eq!(reservation.class_label, "Boxing");
    }

    #[tokio::test]
    async fn concurrent_race_for_last_place_admits_exactly_one() {
        let store = Arc::new(MemoryDocumentStore::new());
        seed_profile(&store, "m1", 1).await;
        seed_profile(&store, "m2", 1).await;

        // Interleave two transactional attempts by hand: both read an empty
        // slot, the first commit wins, the second must conflict.
        let h1 = handler(&store, signed_in("m1"));
        let h2 = handler(&store, signed_in("m2"));
        let slot = Slot::new(
            TrainerId::new("t1").unwrap(),
            far_future_date(),
            "18:00".parse().unwrap(),
        );

        let m1 = MemberId::new("m1").unwrap();
        let m2 = MemberId::new("m2").unwrap();
        let cmd1 = command("t1", "18:00");
        let cmd2 = command("t1", "18:00");
        let first = h1.try_reserve(&m1, &slot, &cmd1);
        let second = h2.try_reserve(&m2, &slot, &cmd2);
        let (r1, r2) = tokio::join!(first, second);

        let successes = [r1.is_ok(), r2.is_ok()].iter().filter(|s| **s).count();
        assert_eq!(successes, 1);
        assert_eq!(store.count(RESERVATIONS).await, 1);
    }
}
