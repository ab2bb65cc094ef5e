//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings with nanoseconds so
//! that lexical order is chronological order. Decimals are stored as their
//! canonical string form. Embedded value objects are compact JSON.

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;
use wayfare_core::{
  booking::{
    Booking, BookingKind, BookingReference, BookingStatus, Contact,
    PaymentStatus, PostalAddress, Pricing,
  },
  customer::{Customer, CustomerProfile, CustomerSummary, Preferences},
};

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Decimal ──────────────────────────────────────────────────────────────────

pub fn encode_decimal(d: Decimal) -> String { d.to_string() }

pub fn decode_decimal(s: &str) -> Result<Decimal> { Ok(s.parse()?) }

// ─── BookingKind ──────────────────────────────────────────────────────────────

/// The table holding bookings of `kind`.
pub fn booking_table(kind: BookingKind) -> &'static str {
  match kind {
    BookingKind::Flight => "flight_bookings",
    BookingKind::Hotel => "hotel_bookings",
  }
}

pub fn encode_kind(kind: BookingKind) -> &'static str { kind.as_str() }

// ─── Statuses ─────────────────────────────────────────────────────────────────

pub fn encode_status(s: BookingStatus) -> &'static str {
  match s {
    BookingStatus::Pending => "pending",
    BookingStatus::Confirmed => "confirmed",
    BookingStatus::Cancelled => "cancelled",
    BookingStatus::Completed => "completed",
  }
}

/// A missing value reads as PENDING.
pub fn decode_status(s: Option<&str>) -> Result<BookingStatus> {
  match s {
    None | Some("pending") => Ok(BookingStatus::Pending),
    Some("confirmed") => Ok(BookingStatus::Confirmed),
    Some("cancelled") => Ok(BookingStatus::Cancelled),
    Some("completed") => Ok(BookingStatus::Completed),
    Some(other) => Err(Error::UnknownValue {
      column: "status",
      value:  other.to_owned(),
    }),
  }
}

pub fn encode_payment_status(s: PaymentStatus) -> &'static str {
  match s {
    PaymentStatus::Pending => "pending",
    PaymentStatus::Paid => "paid",
    PaymentStatus::Failed => "failed",
    PaymentStatus::Refunded => "refunded",
  }
}

/// A missing value reads as PENDING.
pub fn decode_payment_status(s: Option<&str>) -> Result<PaymentStatus> {
  match s {
    None | Some("pending") => Ok(PaymentStatus::Pending),
    Some("paid") => Ok(PaymentStatus::Paid),
    Some("failed") => Ok(PaymentStatus::Failed),
    Some("refunded") => Ok(PaymentStatus::Refunded),
    Some(other) => Err(Error::UnknownValue {
      column: "payment_status",
      value:  other.to_owned(),
    }),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Columns selected for every booking read: the booking row followed by the
/// joined customer projection.
pub const BOOKING_COLUMNS: &str = "
  b.booking_reference, b.customer_id, b.contact, b.status, b.payment_status,
  b.payment_method, b.final_price, b.currency, b.base_price, b.taxes,
  b.details, b.special_requests, b.created_at, b.updated_at,
  c.first_name, c.last_name, c.email";

/// Raw strings read from a booking table joined with `customers`.
pub struct RawBooking {
  pub booking_reference:   String,
  pub customer_id:         Option<String>,
  pub contact:             String,
  pub status:              Option<String>,
  pub payment_status:      Option<String>,
  pub payment_method:      Option<String>,
  pub final_price:         String,
  pub currency:            String,
  pub base_price:          Option<String>,
  pub taxes:               Option<String>,
  pub details:             String,
  pub special_requests:    Option<String>,
  pub created_at:          String,
  pub updated_at:          String,
  // customers join
  pub customer_first_name: Option<String>,
  pub customer_last_name:  Option<String>,
  pub customer_email:      Option<String>,
}

impl RawBooking {
  /// Read a row selected with [`BOOKING_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      booking_reference:   row.get(0)?,
      customer_id:         row.get(1)?,
      contact:             row.get(2)?,
      status:              row.get(3)?,
      payment_status:      row.get(4)?,
      payment_method:      row.get(5)?,
      final_price:         row.get(6)?,
      currency:            row.get(7)?,
      base_price:          row.get(8)?,
      taxes:               row.get(9)?,
      details:             row.get(10)?,
      special_requests:    row.get(11)?,
      created_at:          row.get(12)?,
      updated_at:          row.get(13)?,
      customer_first_name: row.get(14)?,
      customer_last_name:  row.get(15)?,
      customer_email:      row.get(16)?,
    })
  }

  pub fn into_booking(self, kind: BookingKind) -> Result<Booking> {
    let contact: Contact = serde_json::from_str(&self.contact)?;
    let details: serde_json::Value = serde_json::from_str(&self.details)?;

    let pricing = Pricing {
      final_price: decode_decimal(&self.final_price)?,
      currency:    self.currency,
      base_price:  self.base_price.as_deref().map(decode_decimal).transpose()?,
      taxes:       self.taxes.as_deref().map(decode_decimal).transpose()?,
    };

    let customer = match (
      self.customer_first_name,
      self.customer_last_name,
      self.customer_email,
    ) {
      (Some(first_name), Some(last_name), Some(email)) => {
        Some(CustomerSummary { first_name, last_name, email })
      }
      _ => None,
    };

    Ok(Booking {
      booking_reference: BookingReference::new(self.booking_reference),
      kind,
      customer_id: self.customer_id.as_deref().map(decode_uuid).transpose()?,
      customer,
      contact,
      status: decode_status(self.status.as_deref())?,
      payment_status: decode_payment_status(self.payment_status.as_deref())?,
      payment_method: self.payment_method,
      pricing,
      details,
      special_requests: self.special_requests,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Columns selected for every customer read. The credential is never read.
pub const CUSTOMER_COLUMNS: &str = "
  customer_id, email, first_name, last_name, phone, address,
  is_guest_created, preferences, created_at";

/// Raw strings read directly from a `customers` row.
pub struct RawCustomer {
  pub customer_id:      String,
  pub email:            String,
  pub first_name:       String,
  pub last_name:        String,
  pub phone:            Option<String>,
  pub address:          Option<String>,
  pub is_guest_created: bool,
  pub preferences:      String,
  pub created_at:       String,
}

impl RawCustomer {
  /// Read a row selected with [`CUSTOMER_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      customer_id:      row.get(0)?,
      email:            row.get(1)?,
      first_name:       row.get(2)?,
      last_name:        row.get(3)?,
      phone:            row.get(4)?,
      address:          row.get(5)?,
      is_guest_created: row.get(6)?,
      preferences:      row.get(7)?,
      created_at:       row.get(8)?,
    })
  }

  pub fn into_customer(self) -> Result<Customer> {
    let address: Option<PostalAddress> = self
      .address
      .as_deref()
      .map(serde_json::from_str)
      .transpose()?;
    let preferences: Preferences = serde_json::from_str(&self.preferences)?;

    Ok(Customer {
      customer_id: decode_uuid(&self.customer_id)?,
      email: self.email,
      first_name: self.first_name,
      last_name: self.last_name,
      profile: CustomerProfile { phone: self.phone, address },
      is_guest_created: self.is_guest_created,
      preferences,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
