//! Read-side booking queries: reservation history and next upcoming session.

use std::sync::Arc;

use crate::domain::booking::{BookingError, Reservation, RESERVATIONS};
use crate::domain::foundation::{MemberId, Timestamp};
use crate::ports::{Direction, DocumentStore, Query};

/// Which reservations a history listing includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryFilter {
    /// Only currently confirmed reservations.
    ConfirmedOnly,
    /// Confirmed and cancelled, the full history.
    All,
}

/// Read-side queries over a member's reservations.
pub struct BookingQueries {
    store: Arc<dyn DocumentStore>,
}

impl BookingQueries {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// The member's reservations, newest session first.
    ///
    /// Sorted client-side on (session day, time) because the store orders by
    /// a single field.
    pub async fn list_my_reservations(
        &self,
        member: &MemberId,
        filter: HistoryFilter,
    ) -> Result<Vec<Reservation>, BookingError> {
        let mut query = Query::collection(RESERVATIONS)
            .filter_eq("member_id", member.as_str())
            .order_by("session_date", Direction::Descending);
        if filter == HistoryFilter::ConfirmedOnly {
            query = query.filter_eq("status", "confirmed");
        }

        let docs = self.store.query(&query).await?;
        let mut reservations = docs
            .iter()
            .map(Reservation::from_document)
            .collect::<Result<Vec<_>, _>>()?;
        reservations.sort_by_key(|r| std::cmp::Reverse((r.session_date, r.time.to_string())));
        Ok(reservations)
    }

    /// The member's next confirmed session strictly in the future, if any.
    pub async fn next_upcoming(
        &self,
        member: &MemberId,
    ) -> Result<Option<Reservation>, BookingError> {
        let now = Timestamp::now();
        // Range from today's day start; same-day slots already past are
        // filtered on the composed start time below.
        let today_start = now
            .as_datetime()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|dt| Timestamp::from_datetime(dt.and_utc()))
            .unwrap_or(now);

        let query = Query::collection(RESERVATIONS)
            .filter_eq("member_id", member.as_str())
            .filter_eq("status", "confirmed")
            .filter_gte("session_date", today_start.to_rfc3339());

        let docs = self.store.query(&query).await?;
        let mut upcoming = docs
            .iter()
            .map(Reservation::from_document)
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .filter(|r| r.starts_at().is_after(&now))
            .collect::<Vec<_>>();
        upcoming.sort_by_key(|r| (r.session_date, r.time.to_string()));
        Ok(upcoming.into_iter().next())
    }
}
