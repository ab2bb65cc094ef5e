//! [`BookingService`] presents the two booking collections as one table.
//!
//! Creation, lookup by reference, and the status transitions live here. The
//! identity reconciler, the cross-kind listings, and the statistics are in
//! [`crate::reconcile`], [`crate::aggregate`], and [`crate::stats`].

use std::future::Future;

use uuid::Uuid;

use crate::{
  Error, Result,
  booking::{
    Booking, BookingKind, BookingReference, BookingStatus, NewBooking,
    PaymentStatus,
  },
  customer::Customer,
  store::BookingStore,
};

/// How many fresh references to try before giving up on a create.
const REFERENCE_ATTEMPTS: usize = 5;

/// Booking operations over any [`BookingStore`].
///
/// Stateless between calls; cloning is as cheap as cloning the store.
#[derive(Debug, Clone)]
pub struct BookingService<S> {
  pub(crate) store: S,
}

impl<S: BookingStore> BookingService<S> {
  pub fn new(store: S) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  // ── Create ────────────────────────────────────────────────────────────

  pub async fn create_flight_booking(&self, input: NewBooking) -> Result<Booking> {
    self.create(BookingKind::Flight, input).await
  }

  pub async fn create_hotel_booking(&self, input: NewBooking) -> Result<Booking> {
    self.create(BookingKind::Hotel, input).await
  }

  /// Validate, persist into `kind`'s collection, then reconcile the
  /// purchaser unless the caller already named a customer.
  ///
  /// Reconciliation is best-effort: if it fails the booking is kept without
  /// a linked customer and the failure is only logged.
  pub async fn create(&self, kind: BookingKind, input: NewBooking) -> Result<Booking> {
    input.validate()?;

    if let Some(customer_id) = input.customer_id {
      self
        .store
        .get_customer(customer_id)
        .await
        .map_err(Error::store)?
        .ok_or(Error::CustomerNotFound(customer_id))?;
    }

    let mut booking = self.insert_with_fresh_reference(kind, input).await?;
    tracing::info!(
      reference = %booking.booking_reference,
      %kind,
      "booking created"
    );

    if booking.customer_id.is_some() {
      return Ok(booking);
    }

    let contact = booking.contact.clone();
    let reference = booking.booking_reference.clone();
    match self.reconcile_booking(&contact, &reference).await {
      Ok((_, linked)) => booking = linked,
      Err(e) => {
        tracing::warn!(
          %reference,
          error = %e,
          "could not link booking to a customer; keeping it unlinked"
        );
      }
    }

    Ok(booking)
  }

  async fn insert_with_fresh_reference(
    &self,
    kind: BookingKind,
    input: NewBooking,
  ) -> Result<Booking> {
    for _ in 0..REFERENCE_ATTEMPTS {
      let reference = BookingReference::generate();
      let inserted = self
        .store
        .insert_booking(kind, reference.clone(), input.clone())
        .await
        .map_err(Error::store)?;
      match inserted {
        Some(booking) => return Ok(booking),
        None => tracing::debug!(%reference, "booking reference collision"),
      }
    }
    Err(Error::ReferenceExhausted)
  }

  // ── Lookup ────────────────────────────────────────────────────────────

  /// Probe the flight collection, then the hotel collection.
  pub async fn get_booking_by_reference(
    &self,
    reference: &BookingReference,
  ) -> Result<Booking> {
    self
      .probe(reference, move |kind, r| self.store.find_booking(kind, r))
      .await
  }

  pub async fn get_customer(&self, customer_id: Uuid) -> Result<Customer> {
    self
      .store
      .get_customer(customer_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::CustomerNotFound(customer_id))
  }

  // ── Status transitions ────────────────────────────────────────────────

  /// Set the booking status. Every transition is allowed, and the payment
  /// status is left untouched.
  pub async fn update_booking_status(
    &self,
    reference: &BookingReference,
    status: BookingStatus,
  ) -> Result<Booking> {
    let booking = self
      .probe(reference, move |kind, r| self.store.set_status(kind, r, status))
      .await?;
    tracing::info!(%reference, ?status, "booking status updated");
    Ok(booking)
  }

  /// Set the payment status, and the payment method if one is given. The
  /// booking status is left untouched.
  pub async fn update_payment_status(
    &self,
    reference: &BookingReference,
    payment_status: PaymentStatus,
    method: Option<String>,
  ) -> Result<Booking> {
    let booking = self
      .probe(reference, move |kind, r| {
        self
          .store
          .set_payment_status(kind, r, payment_status, method.clone())
      })
      .await?;
    tracing::info!(%reference, ?payment_status, "payment status updated");
    Ok(booking)
  }

  // ── Two-probe ─────────────────────────────────────────────────────────

  /// Run `op` against each collection in [`BookingKind::PROBE_ORDER`] and
  /// return the first hit.
  pub(crate) async fn probe<F, Fut>(
    &self,
    reference: &BookingReference,
    op: F,
  ) -> Result<Booking>
  where
    F: Fn(BookingKind, BookingReference) -> Fut,
    Fut: Future<Output = Result<Option<Booking>, S::Error>>,
  {
    for kind in BookingKind::PROBE_ORDER {
      if let Some(booking) =
        op(kind, reference.clone()).await.map_err(Error::store)?
      {
        return Ok(booking);
      }
    }
    Err(Error::BookingNotFound(reference.clone()))
  }
}
