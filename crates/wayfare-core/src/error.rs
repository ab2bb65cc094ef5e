//! Error types for `wayfare-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::booking::BookingReference;

#[derive(Debug, Error)]
pub enum Error {
  #[error("booking not found: {0}")]
  BookingNotFound(BookingReference),

  #[error("customer not found: {0}")]
  CustomerNotFound(Uuid),

  #[error("invalid booking: {0}")]
  Validation(String),

  #[error("could not allocate a unique booking reference")]
  ReferenceExhausted,

  #[error("could not settle a customer identity for {0:?}")]
  IdentityContention(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Box a backend error into [`Error::Store`].
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::BookingNotFound(_) | Self::CustomerNotFound(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
