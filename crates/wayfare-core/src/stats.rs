//! Booking statistics across both collections.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
  BookingService, Error, Result,
  booking::{Booking, BookingKind, BookingStatus},
  store::{BookingQuery, BookingStore},
};

/// Size of each kind's recent sample and of the merged feed.
pub const RECENT_BOOKINGS: usize = 5;

/// Counts and revenue for one booking kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindStats {
  pub total:     u64,
  pub pending:   u64,
  pub confirmed: u64,
  /// Sum of `final_price` over confirmed bookings, across currencies.
  pub revenue:   Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingStats {
  pub total_bookings:     u64,
  pub pending_bookings:   u64,
  pub confirmed_bookings: u64,
  pub total_revenue:      Decimal,
  pub flights:            KindStats,
  pub hotels:             KindStats,
  /// The newest bookings of either kind, drawn from a five-per-kind sample.
  pub recent_bookings:    Vec<Booking>,
}

impl<S: BookingStore> BookingService<S> {
  pub async fn get_booking_statistics(&self) -> Result<BookingStats> {
    let ((flights, recent_flights), (hotels, recent_hotels)) = futures::try_join!(
      self.kind_stats(BookingKind::Flight),
      self.kind_stats(BookingKind::Hotel),
    )
    .map_err(Error::store)?;

    // A busy kind can crowd the other out of the feed entirely.
    let mut recent_bookings = recent_flights;
    recent_bookings.extend(recent_hotels);
    recent_bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent_bookings.truncate(RECENT_BOOKINGS);

    Ok(BookingStats {
      total_bookings: flights.total + hotels.total,
      pending_bookings: flights.pending + hotels.pending,
      confirmed_bookings: flights.confirmed + hotels.confirmed,
      total_revenue: flights.revenue + hotels.revenue,
      flights,
      hotels,
      recent_bookings,
    })
  }

  async fn kind_stats(
    &self,
    kind: BookingKind,
  ) -> Result<(KindStats, Vec<Booking>), S::Error> {
    let (total, pending, confirmed, recent, revenue) = futures::try_join!(
      self.store.count_bookings(kind, BookingQuery::default()),
      self
        .store
        .count_bookings(kind, BookingQuery::with_status(BookingStatus::Pending)),
      self
        .store
        .count_bookings(kind, BookingQuery::with_status(BookingStatus::Confirmed)),
      self.store.list_bookings(kind, BookingQuery::newest(RECENT_BOOKINGS)),
      self.store.confirmed_revenue(kind),
    )?;

    Ok((KindStats { total, pending, confirmed, revenue }, recent))
  }
}
