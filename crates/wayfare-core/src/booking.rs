//! Booking types shared by the flight and hotel collections.
//!
//! Both kinds carry the same envelope; the kind-specific itinerary or stay
//! data travels in [`Booking::details`] and is stored and returned verbatim.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, customer::CustomerSummary};

// ─── Kind ────────────────────────────────────────────────────────────────────

/// Which physical collection a booking lives in. Fixed for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingKind {
  Flight,
  Hotel,
}

impl BookingKind {
  /// Probe order used when a reference's kind is not known.
  pub const PROBE_ORDER: [BookingKind; 2] = [Self::Flight, Self::Hotel];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Flight => "flight",
      Self::Hotel => "hotel",
    }
  }
}

impl fmt::Display for BookingKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Lifecycle status of a booking. Any value may follow any value.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
  #[default]
  Pending,
  Confirmed,
  Cancelled,
  Completed,
}

impl BookingStatus {
  pub const ALL: [BookingStatus; 4] =
    [Self::Pending, Self::Confirmed, Self::Cancelled, Self::Completed];
}

/// Payment label. Independent of [`BookingStatus`]; no money moves.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
  #[default]
  Pending,
  Paid,
  Failed,
  Refunded,
}

impl PaymentStatus {
  pub const ALL: [PaymentStatus; 4] =
    [Self::Pending, Self::Paid, Self::Failed, Self::Refunded];
}

// ─── Reference ───────────────────────────────────────────────────────────────

/// Externally visible booking identifier, unique across both collections.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingReference(String);

impl BookingReference {
  const PREFIX: &'static str = "BK-";

  /// A fresh reference: `BK-` followed by ten upper-case hex digits.
  pub fn generate() -> Self {
    let hex = Uuid::new_v4().simple().to_string().to_uppercase();
    Self(format!("{}{}", Self::PREFIX, &hex[..10]))
  }

  pub fn new(value: impl Into<String>) -> Self { Self(value.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for BookingReference {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<String> for BookingReference {
  fn from(s: String) -> Self { Self(s) }
}

impl From<&str> for BookingReference {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

// ─── Embedded value objects ──────────────────────────────────────────────────

/// A postal address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
  pub street:      Option<String>,
  pub city:        Option<String>,
  /// State, province, or region.
  pub region:      Option<String>,
  pub postal_code: Option<String>,
  pub country:     Option<String>,
}

/// Purchaser contact details copied onto the booking at creation. Kept even
/// after the booking is linked to a customer identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
  pub first_name: String,
  pub last_name:  String,
  pub email:      String,
  pub phone:      Option<String>,
  pub address:    Option<PostalAddress>,
}

impl Contact {
  pub fn validate(&self) -> Result<()> {
    if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
      return Err(Error::Validation("contact name is required".into()));
    }
    if !is_valid_email(&self.email) {
      return Err(Error::Validation(format!(
        "contact email {:?} is not a valid address",
        self.email
      )));
    }
    Ok(())
  }
}

/// Price as quoted by the provider. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
  pub final_price: Decimal,
  /// ISO 4217 code, e.g. `"EUR"`.
  pub currency:    String,
  pub base_price:  Option<Decimal>,
  pub taxes:       Option<Decimal>,
}

impl Pricing {
  pub fn validate(&self) -> Result<()> {
    if self.final_price < Decimal::ZERO {
      return Err(Error::Validation("final price must not be negative".into()));
    }
    let code = self.currency.as_bytes();
    if code.len() != 3 || !code.iter().all(u8::is_ascii_alphabetic) {
      return Err(Error::Validation(format!(
        "currency {:?} is not a three-letter code",
        self.currency
      )));
    }
    Ok(())
  }
}

/// Minimal syntactic check: one `@`, a non-empty local part, and a dotted
/// domain without empty labels or whitespace.
pub fn is_valid_email(email: &str) -> bool {
  let email = email.trim();
  if email.chars().any(char::is_whitespace) {
    return false;
  }
  let Some((local, domain)) = email.split_once('@') else {
    return false;
  };
  !local.is_empty()
    && !domain.contains('@')
    && domain.contains('.')
    && domain.split('.').all(|label| !label.is_empty())
}

// ─── Booking ─────────────────────────────────────────────────────────────────

/// A persisted flight or hotel booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
  pub booking_reference: BookingReference,
  pub kind:              BookingKind,
  pub customer_id:       Option<Uuid>,
  /// Read-time projection of the linked customer; never the full identity.
  pub customer:          Option<CustomerSummary>,
  pub contact:           Contact,
  pub status:            BookingStatus,
  pub payment_status:    PaymentStatus,
  pub payment_method:    Option<String>,
  pub pricing:           Pricing,
  /// Kind-specific payload (itinerary and passengers, or stay and guests).
  pub details:           serde_json::Value,
  pub special_requests:  Option<String>,
  /// Server-assigned; never changes after creation.
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

/// Input to a create operation. The reference and timestamps are always
/// assigned on persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBooking {
  /// An existing customer to own the booking. When absent the purchaser is
  /// reconciled from `contact.email`.
  #[serde(default)]
  pub customer_id:      Option<Uuid>,
  pub contact:          Contact,
  pub pricing:          Pricing,
  #[serde(default = "empty_details")]
  pub details:          serde_json::Value,
  #[serde(default)]
  pub special_requests: Option<String>,
}

fn empty_details() -> serde_json::Value {
  serde_json::Value::Object(Default::default())
}

impl NewBooking {
  /// Reject malformed input before anything is written.
  pub fn validate(&self) -> Result<()> {
    self.contact.validate()?;
    self.pricing.validate()?;
    if !self.details.is_object() {
      return Err(Error::Validation("booking details must be an object".into()));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn contact(email: &str) -> Contact {
    Contact {
      first_name: "Ada".into(),
      last_name:  "Lovelace".into(),
      email:      email.into(),
      phone:      None,
      address:    None,
    }
  }

  fn pricing(price: &str, currency: &str) -> Pricing {
    Pricing {
      final_price: price.parse().unwrap(),
      currency:    currency.into(),
      base_price:  None,
      taxes:       None,
    }
  }

  #[test]
  fn generated_references_have_expected_shape() {
    let r = BookingReference::generate();
    assert!(r.as_str().starts_with("BK-"));
    assert_eq!(r.as_str().len(), 13);
    assert!(
      r.as_str()[3..]
        .chars()
        .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
    );
    assert_ne!(r, BookingReference::generate());
  }

  #[test]
  fn email_syntax() {
    assert!(is_valid_email("a@x.com"));
    assert!(is_valid_email("  first.last+tag@mail.example.org "));
    assert!(!is_valid_email(""));
    assert!(!is_valid_email("no-at-sign.com"));
    assert!(!is_valid_email("@x.com"));
    assert!(!is_valid_email("a@localhost"));
    assert!(!is_valid_email("a@x..com"));
    assert!(!is_valid_email("a@b@x.com"));
    assert!(!is_valid_email("a b@x.com"));
  }

  #[test]
  fn contact_requires_names_and_email() {
    assert!(contact("a@x.com").validate().is_ok());
    assert!(matches!(
      contact("nope").validate(),
      Err(Error::Validation(_))
    ));

    let mut unnamed = contact("a@x.com");
    unnamed.first_name = "  ".into();
    assert!(matches!(unnamed.validate(), Err(Error::Validation(_))));
  }

  #[test]
  fn pricing_rejects_negative_and_bad_currency() {
    assert!(pricing("0", "EUR").validate().is_ok());
    assert!(pricing("199.99", "usd").validate().is_ok());
    assert!(pricing("-1.00", "EUR").validate().is_err());
    assert!(pricing("10", "EURO").validate().is_err());
    assert!(pricing("10", "E1R").validate().is_err());
  }

  #[test]
  fn details_must_be_an_object() {
    let mut input = NewBooking {
      customer_id:      None,
      contact:          contact("a@x.com"),
      pricing:          pricing("10", "EUR"),
      details:          empty_details(),
      special_requests: None,
    };
    assert!(input.validate().is_ok());

    input.details = serde_json::json!(["not", "an", "object"]);
    assert!(matches!(input.validate(), Err(Error::Validation(_))));
  }

  #[test]
  fn statuses_default_to_pending_and_serialise_lowercase() {
    assert_eq!(BookingStatus::default(), BookingStatus::Pending);
    assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
    assert_eq!(
      serde_json::to_string(&BookingStatus::Cancelled).unwrap(),
      "\"cancelled\""
    );
    assert_eq!(
      serde_json::from_str::<PaymentStatus>("\"refunded\"").unwrap(),
      PaymentStatus::Refunded
    );
  }
}
