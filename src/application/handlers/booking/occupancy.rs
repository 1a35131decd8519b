//! WatchOccupancyHandler - live occupancy of a day.
//!
//! Wraps the store's live query facility: the feed yields the full set of
//! confirmed reservations for the day on registration and after every
//! committed change. Callers group by trainer themselves; a trainer-scoped
//! feed is available when only one column of the day matters.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::booking::{day_window, BookingError, Reservation, RESERVATIONS};
use crate::domain::foundation::TrainerId;
use crate::ports::{DocumentStore, Query, Subscription};

/// Live feed of a day's confirmed reservations.
pub struct OccupancyFeed {
    subscription: Subscription,
}

impl OccupancyFeed {
    /// Waits for the next snapshot; `None` once the feed is closed.
    pub async fn next(&mut self) -> Option<Result<Vec<Reservation>, BookingError>> {
        let docs = self.subscription.next_snapshot().await?;
        Some(
            docs.iter()
                .map(Reservation::from_document)
                .collect::<Result<Vec<_>, _>>()
                .map_err(Into::into),
        )
    }

    /// Stops delivery.
    pub fn stop(self) {
        self.subscription.unsubscribe();
    }
}

/// Handler opening live occupancy feeds.
pub struct WatchOccupancyHandler {
    store: Arc<dyn DocumentStore>,
}

impl WatchOccupancyHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Opens a feed over every confirmed reservation of the day, all
    /// trainers included.
    pub async fn handle(&self, date: NaiveDate) -> Result<OccupancyFeed, BookingError> {
        self.open(date, None).await
    }

    /// Opens a feed narrowed to one trainer's column of the day.
    pub async fn handle_for_trainer(
        &self,
        trainer: &TrainerId,
        date: NaiveDate,
    ) -> Result<OccupancyFeed, BookingError> {
        self.open(date, Some(trainer)).await
    }

    async fn open(
        &self,
        date: NaiveDate,
        trainer: Option<&TrainerId>,
    ) -> Result<OccupancyFeed, BookingError> {
        let (start, end) = day_window(date);
        let mut query = Query::collection(RESERVATIONS)
            .filter_eq("status", "confirmed")
            .filter_gte("session_date", start.to_rfc3339())
            .filter_lte("session_date", end.to_rfc3339());
        if let Some(trainer) = trainer {
            query = query.filter_eq("trainer_id", trainer.as_str());
        }
        let subscription = self.store.watch(query).await?;
        Ok(OccupancyFeed { subscription })
    }
}
