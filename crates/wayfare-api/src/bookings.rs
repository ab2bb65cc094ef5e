//! Handlers for `/bookings` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `POST`  | `/bookings/flights` | Body: [`NewBooking`]; returns 201 |
//! | `POST`  | `/bookings/hotels` | Body: [`NewBooking`]; returns 201 |
//! | `GET`   | `/bookings` | Optional `page`, `page_size`, `status`, `kind` |
//! | `GET`   | `/bookings/stats` | Counts, revenue, recent activity |
//! | `GET`   | `/bookings/:reference` | Either kind; 404 if in neither |
//! | `PATCH` | `/bookings/:reference/status` | Body: `{"status":"confirmed"}` |
//! | `PATCH` | `/bookings/:reference/payment` | Body: `{"payment_status":"paid","payment_method":"card"}` |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use wayfare_core::{
  BookingService,
  aggregate::{BookingPage, ListBookings},
  booking::{Booking, BookingReference, BookingStatus, NewBooking, PaymentStatus},
  stats::BookingStats,
  store::BookingStore,
};

use crate::{
  error::ApiError,
  extract::{JsonBody, PathParam, QueryParams},
};

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /bookings/flights`
pub async fn create_flight<S>(
  State(service): State<Arc<BookingService<S>>>,
  JsonBody(body): JsonBody<NewBooking>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BookingStore,
{
  let booking = service.create_flight_booking(body).await?;
  Ok((StatusCode::CREATED, Json(booking)))
}

/// `POST /bookings/hotels`
pub async fn create_hotel<S>(
  State(service): State<Arc<BookingService<S>>>,
  JsonBody(body): JsonBody<NewBooking>,
) -> Result<impl IntoResponse, ApiError>
where
  S: BookingStore,
{
  let booking = service.create_hotel_booking(body).await?;
  Ok((StatusCode::CREATED, Json(booking)))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /bookings[?page=..][&page_size=..][&status=..][&kind=flight|hotel]`
pub async fn list<S>(
  State(service): State<Arc<BookingService<S>>>,
  QueryParams(params): QueryParams<ListBookings>,
) -> Result<Json<BookingPage>, ApiError>
where
  S: BookingStore,
{
  Ok(Json(service.list_all_bookings(params).await?))
}

// ─── Stats ────────────────────────────────────────────────────────────────────

/// `GET /bookings/stats`
pub async fn stats<S>(
  State(service): State<Arc<BookingService<S>>>,
) -> Result<Json<BookingStats>, ApiError>
where
  S: BookingStore,
{
  Ok(Json(service.get_booking_statistics().await?))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /bookings/:reference`
pub async fn get_one<S>(
  State(service): State<Arc<BookingService<S>>>,
  PathParam(reference): PathParam<String>,
) -> Result<Json<Booking>, ApiError>
where
  S: BookingStore,
{
  let booking = service
    .get_booking_by_reference(&BookingReference::from(reference))
    .await?;
  Ok(Json(booking))
}

// ─── Status ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: BookingStatus,
}

/// `PATCH /bookings/:reference/status`
pub async fn update_status<S>(
  State(service): State<Arc<BookingService<S>>>,
  PathParam(reference): PathParam<String>,
  JsonBody(body): JsonBody<StatusBody>,
) -> Result<Json<Booking>, ApiError>
where
  S: BookingStore,
{
  let booking = service
    .update_booking_status(&BookingReference::from(reference), body.status)
    .await?;
  Ok(Json(booking))
}

#[derive(Debug, Deserialize)]
pub struct PaymentBody {
  pub payment_status: PaymentStatus,
  pub payment_method: Option<String>,
}

/// `PATCH /bookings/:reference/payment`
pub async fn update_payment<S>(
  State(service): State<Arc<BookingService<S>>>,
  PathParam(reference): PathParam<String>,
  JsonBody(body): JsonBody<PaymentBody>,
) -> Result<Json<Booking>, ApiError>
where
  S: BookingStore,
{
  let booking = service
    .update_payment_status(
      &BookingReference::from(reference),
      body.payment_status,
      body.payment_method,
    )
    .await?;
  Ok(Json(booking))
}
