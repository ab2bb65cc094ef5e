//! Handlers for `/customers` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/customers/:id` | 404 if not found |
//! | `GET`  | `/customers/:id/bookings` | Both kinds, newest first, unpaginated |

use std::sync::Arc;

use axum::{Json, extract::State};
use uuid::Uuid;
use wayfare_core::{
  BookingService, booking::Booking, customer::Customer, store::BookingStore,
};

use crate::{error::ApiError, extract::PathParam};

/// `GET /customers/:id`
pub async fn get_one<S>(
  State(service): State<Arc<BookingService<S>>>,
  PathParam(id): PathParam<Uuid>,
) -> Result<Json<Customer>, ApiError>
where
  S: BookingStore,
{
  Ok(Json(service.get_customer(id).await?))
}

/// `GET /customers/:id/bookings`
pub async fn bookings<S>(
  State(service): State<Arc<BookingService<S>>>,
  PathParam(id): PathParam<Uuid>,
) -> Result<Json<Vec<Booking>>, ApiError>
where
  S: BookingStore,
{
  Ok(Json(service.list_customer_bookings(id).await?))
}
