//! JSON REST API for Wayfare.
//!
//! Exposes an axum [`Router`] backed by a [`BookingService`] over any
//! [`BookingStore`]. Auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", wayfare_api::api_router(service.clone()))
//! ```

pub mod bookings;
pub mod customers;
pub mod error;
pub mod extract;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch, post},
};
use wayfare_core::{BookingService, store::BookingStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(service: Arc<BookingService<S>>) -> Router<()>
where
  S: BookingStore + 'static,
{
  Router::new()
    // Bookings
    .route("/bookings", get(bookings::list::<S>))
    .route("/bookings/flights", post(bookings::create_flight::<S>))
    .route("/bookings/hotels", post(bookings::create_hotel::<S>))
    .route("/bookings/stats", get(bookings::stats::<S>))
    .route("/bookings/{reference}", get(bookings::get_one::<S>))
    .route("/bookings/{reference}/status", patch(bookings::update_status::<S>))
    .route("/bookings/{reference}/payment", patch(bookings::update_payment::<S>))
    // Customers
    .route("/customers/{id}", get(customers::get_one::<S>))
    .route("/customers/{id}/bookings", get(customers::bookings::<S>))
    .with_state(service)
}
