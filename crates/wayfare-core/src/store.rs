//! The `BookingStore` trait and supporting query types.
//!
//! A backend keeps flight and hotel bookings in two separate collections and
//! every booking method is addressed to one [`BookingKind`]. Presenting the
//! pair as a single table is the job of [`crate::BookingService`], not of the
//! store.

use std::future::Future;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
  booking::{
    Booking, BookingKind, BookingReference, BookingStatus, NewBooking,
    PaymentStatus,
  },
  customer::{Customer, NewCustomer},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`BookingStore::list_bookings`] and
/// [`BookingStore::count_bookings`]. Results are ordered newest first.
#[derive(Debug, Clone, Copy, Default)]
pub struct BookingQuery {
  pub status:      Option<BookingStatus>,
  pub customer_id: Option<Uuid>,
  /// `None` returns the full matching set.
  pub limit:       Option<usize>,
  pub offset:      usize,
}

impl BookingQuery {
  pub fn with_status(status: BookingStatus) -> Self {
    Self { status: Some(status), ..Self::default() }
  }

  pub fn for_customer(customer_id: Uuid) -> Self {
    Self { customer_id: Some(customer_id), ..Self::default() }
  }

  pub fn newest(limit: usize) -> Self {
    Self { limit: Some(limit), ..Self::default() }
  }
}

/// Outcome of [`BookingStore::insert_customer`].
#[derive(Debug, Clone)]
pub enum CustomerInsert {
  Created(Customer),
  /// Another identity already holds this email (case-insensitively).
  EmailTaken,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Wayfare storage backend.
///
/// Every read of a [`Booking`] carries the linked customer's projection in
/// [`Booking::customer`]. All methods return `Send` futures so the trait can
/// be used in multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait BookingStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Bookings ──────────────────────────────────────────────────────────

  /// Persist a booking under `reference` in `kind`'s collection. The store
  /// assigns `created_at`.
  ///
  /// Returns `None` if `reference` is already used in *either* collection.
  fn insert_booking(
    &self,
    kind: BookingKind,
    reference: BookingReference,
    input: NewBooking,
  ) -> impl Future<Output = Result<Option<Booking>, Self::Error>> + Send + '_;

  /// Look up a booking in `kind`'s collection only.
  fn find_booking(
    &self,
    kind: BookingKind,
    reference: BookingReference,
  ) -> impl Future<Output = Result<Option<Booking>, Self::Error>> + Send + '_;

  /// Overwrite `status` in `kind`'s collection and return the updated row,
  /// or `None` if the reference is not in that collection.
  fn set_status(
    &self,
    kind: BookingKind,
    reference: BookingReference,
    status: BookingStatus,
  ) -> impl Future<Output = Result<Option<Booking>, Self::Error>> + Send + '_;

  /// Overwrite `payment_status`, and `payment_method` when `method` is
  /// `Some`. Returns `None` if the reference is not in that collection.
  fn set_payment_status(
    &self,
    kind: BookingKind,
    reference: BookingReference,
    payment_status: PaymentStatus,
    method: Option<String>,
  ) -> impl Future<Output = Result<Option<Booking>, Self::Error>> + Send + '_;

  /// Link the booking to `customer_id` unless it is already linked.
  ///
  /// Returns the booking as it stands afterwards, or `None` if the reference
  /// is not in that collection.
  fn link_customer(
    &self,
    kind: BookingKind,
    reference: BookingReference,
    customer_id: Uuid,
  ) -> impl Future<Output = Result<Option<Booking>, Self::Error>> + Send + '_;

  /// List bookings of one kind matching `query`, newest first.
  fn list_bookings(
    &self,
    kind: BookingKind,
    query: BookingQuery,
  ) -> impl Future<Output = Result<Vec<Booking>, Self::Error>> + Send + '_;

  /// Count bookings of one kind matching `query`. `limit` and `offset` are
  /// ignored.
  fn count_bookings(
    &self,
    kind: BookingKind,
    query: BookingQuery,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Sum of `pricing.final_price` over CONFIRMED bookings of one kind; zero
  /// when there are none.
  fn confirmed_revenue(
    &self,
    kind: BookingKind,
  ) -> impl Future<Output = Result<Decimal, Self::Error>> + Send + '_;

  // ── Customers ─────────────────────────────────────────────────────────

  fn get_customer(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Customer>, Self::Error>> + Send + '_;

  /// Find the identity stored under `email_key`, which the caller has
  /// already normalised with [`crate::customer::email_key`].
  fn find_customer_by_email(
    &self,
    email_key: String,
  ) -> impl Future<Output = Result<Option<Customer>, Self::Error>> + Send + '_;

  /// Persist a new identity. The backend must enforce email uniqueness
  /// itself so that concurrent inserts for one email cannot both succeed.
  fn insert_customer(
    &self,
    input: NewCustomer,
  ) -> impl Future<Output = Result<CustomerInsert, Self::Error>> + Send + '_;
}
