//! Cross-kind listings.
//!
//! A listing restricted to one kind is paginated natively by the store. A
//! listing over both kinds fetches each collection's full matching set,
//! merges them newest first, and slices the requested page in memory. This
//! is linear in the size of both matching sets.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  BookingService, Error, Result,
  booking::{Booking, BookingKind, BookingStatus},
  store::{BookingQuery, BookingStore},
};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Parameters for [`BookingService::list_all_bookings`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ListBookings {
  /// 1-based; `None` or `0` means the first page.
  pub page:      Option<u32>,
  /// Clamped to `1..=MAX_PAGE_SIZE`; defaults to [`DEFAULT_PAGE_SIZE`].
  pub page_size: Option<u32>,
  pub status:    Option<BookingStatus>,
  /// `None` lists both kinds.
  pub kind:      Option<BookingKind>,
}

impl ListBookings {
  fn page(&self) -> u32 { self.page.unwrap_or(1).max(1) }

  fn page_size(&self) -> u32 {
    self
      .page_size
      .unwrap_or(DEFAULT_PAGE_SIZE)
      .clamp(1, MAX_PAGE_SIZE)
  }
}

/// One page of a booking listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingPage {
  pub bookings:    Vec<Booking>,
  /// Matching bookings across every page.
  pub total:       u64,
  pub page:        u32,
  pub page_size:   u32,
  pub total_pages: u32,
}

fn total_pages(total: u64, page_size: u32) -> u32 {
  u32::try_from(total.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX)
}

/// Newest first. The sort is stable, so equal timestamps keep the order in
/// which the collections were concatenated.
fn sort_newest_first(bookings: &mut [Booking]) {
  bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

impl<S: BookingStore> BookingService<S> {
  /// List bookings of one or both kinds, optionally filtered by status.
  pub async fn list_all_bookings(&self, params: ListBookings) -> Result<BookingPage> {
    let page = params.page();
    let page_size = params.page_size();
    let offset = (page as usize - 1) * page_size as usize;
    let filter = BookingQuery { status: params.status, ..BookingQuery::default() };

    let (bookings, total) = match params.kind {
      Some(kind) => {
        let query = BookingQuery {
          limit: Some(page_size as usize),
          offset,
          ..filter
        };
        futures::try_join!(
          self.store.list_bookings(kind, query),
          self.store.count_bookings(kind, filter),
        )
        .map_err(Error::store)?
      }
      None => {
        let (flights, hotels, flight_total, hotel_total) = futures::try_join!(
          self.store.list_bookings(BookingKind::Flight, filter),
          self.store.list_bookings(BookingKind::Hotel, filter),
          self.store.count_bookings(BookingKind::Flight, filter),
          self.store.count_bookings(BookingKind::Hotel, filter),
        )
        .map_err(Error::store)?;

        let mut merged = flights;
        merged.extend(hotels);
        sort_newest_first(&mut merged);
        let bookings = merged
          .into_iter()
          .skip(offset)
          .take(page_size as usize)
          .collect();
        (bookings, flight_total + hotel_total)
      }
    };

    Ok(BookingPage {
      bookings,
      total,
      page,
      page_size,
      total_pages: total_pages(total, page_size),
    })
  }

  /// Every booking of both kinds owned by `customer_id`, newest first.
  /// Unpaginated.
  pub async fn list_customer_bookings(&self, customer_id: Uuid) -> Result<Vec<Booking>> {
    let query = BookingQuery::for_customer(customer_id);
    let (customer, flights, hotels) = futures::try_join!(
      self.store.get_customer(customer_id),
      self.store.list_bookings(BookingKind::Flight, query),
      self.store.list_bookings(BookingKind::Hotel, query),
    )
    .map_err(Error::store)?;

    if customer.is_none() {
      return Err(Error::CustomerNotFound(customer_id));
    }

    let mut merged = flights;
    merged.extend(hotels);
    sort_newest_first(&mut merged);
    Ok(merged)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn page_parameters_are_normalised() {
    let params = ListBookings::default();
    assert_eq!(params.page(), 1);
    assert_eq!(params.page_size(), DEFAULT_PAGE_SIZE);

    let params = ListBookings {
      page: Some(0),
      page_size: Some(0),
      ..ListBookings::default()
    };
    assert_eq!(params.page(), 1);
    assert_eq!(params.page_size(), 1);

    let params = ListBookings {
      page: Some(7),
      page_size: Some(10_000),
      ..ListBookings::default()
    };
    assert_eq!(params.page(), 7);
    assert_eq!(params.page_size(), MAX_PAGE_SIZE);
  }

  #[test]
  fn total_pages_rounds_up() {
    assert_eq!(total_pages(0, 10), 0);
    assert_eq!(total_pages(1, 10), 1);
    assert_eq!(total_pages(10, 10), 1);
    assert_eq!(total_pages(11, 10), 2);
    assert_eq!(total_pages(7, 3), 3);
  }
}
