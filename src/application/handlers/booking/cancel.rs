//! CancelHandler - cancels a reservation and refunds the session credit.
//!
//! Cancellation is a soft status flip: the reservation document stays in
//! place with status `cancelled`, which frees the slot and preserves the
//! member's history. The flip and the refund commit atomically.

use std::sync::Arc;

use chrono::Duration;

use crate::config::BookingPolicy;
use crate::domain::booking::{BookingError, Reservation, ReservationStatus, RESERVATIONS};
use crate::domain::foundation::{ReservationId, Timestamp};
use crate::domain::profile::{MemberProfile, PROFILES};
use crate::ports::{AuthProvider, DocumentStore};

/// Handler for cancelling a reservation.
pub struct CancelHandler {
    store: Arc<dyn DocumentStore>,
    auth: Arc<dyn AuthProvider>,
    policy: BookingPolicy,
}

impl CancelHandler {
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

    pub async fn handle(&self, reservation_id: &ReservationId) -> Result<Reservation, BookingError> {
        // 1. Resolve the caller
        let member = self
            .auth
            .current_user()
            .ok_or(BookingError::NotAuthenticated)?;

        // 2. Transactional attempt, retried on commit conflicts
        let mut attempt = 1;
        loop {
            match self.try_cancel(&member.id, reservation_id).await {
                Ok(reservation) => return Ok(reservation),
                Err(e) if e.is_retryable() && attempt < self.policy.max_txn_retries => {
                    tracing::debug!(
                        reservation = %reservation_id,
                        attempt,
                        error = %e,
                        "cancel commit conflicted, retrying"
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One transactional cancellation attempt. All reads precede all writes.
    async fn try_cancel(
        &self,
        member: &crate::domain::foundation::MemberId,
        reservation_id: &ReservationId,
    ) -> Result<Reservation, BookingError> {
        let mut txn = self.store.begin().await?;

        let doc = txn
            .get(RESERVATIONS, reservation_id.as_str())
            .await?
            .ok_or_else(|| BookingError::reservation_not_found(reservation_id.clone()))?;
        let mut reservation = Reservation::from_document(&doc)?;

        if reservation.member_id != *member {
            return Err(BookingError::not_authorized(reservation_id.clone()));
        }
        if reservation.status == ReservationStatus::Cancelled {
            return Err(BookingError::already_cancelled(reservation_id.clone()));
        }

        // The slot must still be at least the window away; past slots fail
        // here too since their lead time is negative.
        let lead_time = reservation.starts_at().duration_since(&Timestamp::now());
        let window = Duration::hours(self.policy.cancellation_window_hours);
        if lead_time < window {
            return Err(BookingError::window_exceeded(
                self.policy.cancellation_window_hours,
            ));
        }

        // Refund one credit. A missing profile does not block the
        // cancellation itself; the slot must still free up.
        let profile_doc = txn.get(PROFILES, member.as_str()).await?;
        if let Some(profile_doc) = profile_doc {
            let profile: MemberProfile = profile_doc.deserialize()?;
            let refunded = (profile.remaining_credits + 1).min(profile.total_credits.max(1));
            txn.update(
                PROFILES,
                member.as_str(),
                serde_json::json!({"remaining_credits": refunded}),
            );
        }
        txn.update(
            RESERVATIONS,
            reservation_id.as_str(),
            serde_json::json!({"status": "cancelled"}),
        );
        txn.commit().await?;

        reservation.status = ReservationStatus::Cancelled;
        Ok(reservation)
    }
}
