//! Core types, the storage trait, and the booking service for Wayfare.
//!
//! This crate is deliberately free of HTTP and database dependencies. Flight
//! and hotel bookings live in two separate collections behind
//! [`store::BookingStore`]; [`service::BookingService`] presents them as a
//! single booking table and reconciles guest purchasers into customer
//! identities.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod aggregate;
pub mod booking;
pub mod customer;
pub mod error;
pub mod reconcile;
pub mod service;
pub mod stats;
pub mod store;

pub use error::{Error, Result};
pub use service::BookingService;
