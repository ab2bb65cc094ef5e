//! [`SqliteStore`]: the SQLite implementation of [`BookingStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, types::Value};
use rust_decimal::Decimal;
use uuid::Uuid;

use wayfare_core::{
  booking::{
    Booking, BookingKind, BookingReference, BookingStatus, NewBooking,
    PaymentStatus,
  },
  customer::{Customer, NewCustomer},
  store::{BookingQuery, BookingStore, CustomerInsert},
};

use crate::{
  Result,
  encode::{
    BOOKING_COLUMNS, CUSTOMER_COLUMNS, RawBooking, RawCustomer, booking_table,
    decode_decimal, encode_decimal, encode_dt, encode_kind,
    encode_payment_status, encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// `true` for UNIQUE and PRIMARY KEY violations, but not for other
/// constraint failures such as foreign keys.
fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        || f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
  )
}

/// Read one booking with its customer projection.
fn select_booking(
  conn: &rusqlite::Connection,
  table: &str,
  reference: &str,
) -> rusqlite::Result<Option<RawBooking>> {
  conn
    .query_row(
      &format!(
        "SELECT {BOOKING_COLUMNS}
         FROM {table} b
         LEFT JOIN customers c ON c.customer_id = b.customer_id
         WHERE b.booking_reference = ?1"
      ),
      rusqlite::params![reference],
      RawBooking::from_row,
    )
    .optional()
}

fn encode_query_filter(query: &BookingQuery) -> (Option<String>, Option<String>) {
  (
    query.status.map(encode_status).map(str::to_owned),
    query.customer_id.map(encode_uuid),
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Wayfare booking store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Apply `set_clause` to one booking row and read it back in the same
  /// transaction. `values` bind `?1..?n` of `set_clause`; the reference is
  /// bound after them. `guard` is appended to the `WHERE` clause.
  ///
  /// Returns `None` if the reference is not in `kind`'s table.
  async fn update_booking(
    &self,
    kind: BookingKind,
    reference: BookingReference,
    set_clause: &'static str,
    guard: &'static str,
    mut values: Vec<Value>,
  ) -> Result<Option<Booking>> {
    let table = booking_table(kind);
    let reference_str = reference.as_str().to_owned();
    values.push(Value::Text(reference_str.clone()));
    let sql = format!(
      "UPDATE {table} SET {set_clause} WHERE booking_reference = ?{}{guard}",
      values.len()
    );

    let raw: Option<RawBooking> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(&sql, rusqlite::params_from_iter(values.iter()))?;
        let raw = select_booking(&tx, table, &reference_str)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.map(|r| r.into_booking(kind)).transpose()
  }
}

// ─── BookingStore impl ───────────────────────────────────────────────────────

impl BookingStore for SqliteStore {
  type Error = crate::Error;

  // ── Bookings ──────────────────────────────────────────────────────────────

  async fn insert_booking(
    &self,
    kind: BookingKind,
    reference: BookingReference,
    input: NewBooking,
  ) -> Result<Option<Booking>> {
    let table            = booking_table(kind);
    let kind_str         = encode_kind(kind);
    let reference_str    = reference.as_str().to_owned();
    let customer_id_str  = input.customer_id.map(encode_uuid);
    let contact_json     = serde_json::to_string(&input.contact)?;
    let final_price_str  = encode_decimal(input.pricing.final_price);
    let currency         = input.pricing.currency;
    let base_price_str   = input.pricing.base_price.map(encode_decimal);
    let taxes_str        = input.pricing.taxes.map(encode_decimal);
    let details_json     = input.details.to_string();
    let special_requests = input.special_requests;
    let now_str          = encode_dt(Utc::now());

    let raw: Option<RawBooking> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Claiming the reference first makes the shared namespace, not the
        // per-kind table, the arbiter of uniqueness.
        let claimed = tx.execute(
          "INSERT INTO booking_references (booking_reference, kind) VALUES (?1, ?2)",
          rusqlite::params![reference_str, kind_str],
        );
        match claimed {
          Ok(_) => {}
          Err(e) if is_unique_violation(&e) => return Ok(None),
          Err(e) => return Err(e.into()),
        }

        tx.execute(
          &format!(
            "INSERT INTO {table} (
               booking_reference, customer_id, contact, status, payment_status,
               final_price, currency, base_price, taxes, details,
               special_requests, created_at, updated_at
             ) VALUES (?1, ?2, ?3, 'pending', 'pending', ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)"
          ),
          rusqlite::params![
            reference_str,
            customer_id_str,
            contact_json,
            final_price_str,
            currency,
            base_price_str,
            taxes_str,
            details_json,
            special_requests,
            now_str,
          ],
        )?;

        let raw = select_booking(&tx, table, &reference_str)?;
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.map(|r| r.into_booking(kind)).transpose()
  }

  async fn find_booking(
    &self,
    kind: BookingKind,
    reference: BookingReference,
  ) -> Result<Option<Booking>> {
    let table = booking_table(kind);
    let reference_str = reference.as_str().to_owned();

    let raw: Option<RawBooking> = self
      .conn
      .call(move |conn| Ok(select_booking(conn, table, &reference_str)?))
      .await?;

    raw.map(|r| r.into_booking(kind)).transpose()
  }

  async fn set_status(
    &self,
    kind: BookingKind,
    reference: BookingReference,
    status: BookingStatus,
  ) -> Result<Option<Booking>> {
    self
      .update_booking(
        kind,
        reference,
        "status = ?1, updated_at = ?2",
        "",
        vec![
          Value::Text(encode_status(status).to_owned()),
          Value::Text(encode_dt(Utc::now())),
        ],
      )
      .await
  }

  async fn set_payment_status(
    &self,
    kind: BookingKind,
    reference: BookingReference,
    payment_status: PaymentStatus,
    method: Option<String>,
  ) -> Result<Option<Booking>> {
    self
      .update_booking(
        kind,
        reference,
        "payment_status = ?1,
         payment_method = COALESCE(?2, payment_method),
         updated_at     = ?3",
        "",
        vec![
          Value::Text(encode_payment_status(payment_status).to_owned()),
          method.map_or(Value::Null, Value::Text),
          Value::Text(encode_dt(Utc::now())),
        ],
      )
      .await
  }

  async fn link_customer(
    &self,
    kind: BookingKind,
    reference: BookingReference,
    customer_id: Uuid,
  ) -> Result<Option<Booking>> {
    self
      .update_booking(
        kind,
        reference,
        "customer_id = ?1, updated_at = ?2",
        " AND customer_id IS NULL",
        vec![
          Value::Text(encode_uuid(customer_id)),
          Value::Text(encode_dt(Utc::now())),
        ],
      )
      .await
  }

  async fn list_bookings(
    &self,
    kind: BookingKind,
    query: BookingQuery,
  ) -> Result<Vec<Booking>> {
    let table                = booking_table(kind);
    let (status, customer)   = encode_query_filter(&query);
    // SQLite treats a negative LIMIT as "no limit".
    let limit_val            = query.limit.map_or(-1, |l| l as i64);
    let offset_val           = query.offset as i64;

    let raws: Vec<RawBooking> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {BOOKING_COLUMNS}
           FROM {table} b
           LEFT JOIN customers c ON c.customer_id = b.customer_id
           WHERE (?1 IS NULL OR b.status = ?1)
             AND (?2 IS NULL OR b.customer_id = ?2)
           ORDER BY b.created_at DESC, b.rowid DESC
           LIMIT ?3 OFFSET ?4"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![status, customer, limit_val, offset_val],
            RawBooking::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(|r| r.into_booking(kind)).collect()
  }

  async fn count_bookings(
    &self,
    kind: BookingKind,
    query: BookingQuery,
  ) -> Result<u64> {
    let table              = booking_table(kind);
    let (status, customer) = encode_query_filter(&query);

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!(
            "SELECT COUNT(*) FROM {table} b
             WHERE (?1 IS NULL OR b.status = ?1)
               AND (?2 IS NULL OR b.customer_id = ?2)"
          ),
          rusqlite::params![status, customer],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(count.max(0) as u64)
  }

  async fn confirmed_revenue(&self, kind: BookingKind) -> Result<Decimal> {
    let table = booking_table(kind);
    let confirmed = encode_status(BookingStatus::Confirmed);

    // Summed in Rust: SQLite's SUM would go through floating point.
    let prices: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn
          .prepare(&format!("SELECT final_price FROM {table} WHERE status = ?1"))?;
        let rows = stmt
          .query_map(rusqlite::params![confirmed], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    prices.iter().map(|p| decode_decimal(p)).sum()
  }

  // ── Customers ─────────────────────────────────────────────────────────────

  async fn get_customer(&self, id: Uuid) -> Result<Option<Customer>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawCustomer> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE customer_id = ?1"),
            rusqlite::params![id_str],
            RawCustomer::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawCustomer::into_customer).transpose()
  }

  async fn find_customer_by_email(&self, email_key: String) -> Result<Option<Customer>> {
    let raw: Option<RawCustomer> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE email_key = ?1"),
            rusqlite::params![email_key],
            RawCustomer::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawCustomer::into_customer).transpose()
  }

  async fn insert_customer(&self, input: NewCustomer) -> Result<CustomerInsert> {
    let customer = Customer {
      customer_id:      Uuid::new_v4(),
      email:            input.email.clone(),
      first_name:       input.first_name.clone(),
      last_name:        input.last_name.clone(),
      profile:          input.profile.clone(),
      is_guest_created: input.is_guest_created,
      preferences:      input.preferences.clone(),
      created_at:       Utc::now(),
    };

    let id_str           = encode_uuid(customer.customer_id);
    let key              = input.email_key();
    let address_json     = input
      .profile
      .address
      .as_ref()
      .map(serde_json::to_string)
      .transpose()?;
    let preferences_json = serde_json::to_string(&input.preferences)?;
    let at_str           = encode_dt(customer.created_at);

    let created: bool = self
      .conn
      .call(move |conn| {
        let inserted = conn.execute(
          "INSERT INTO customers (
             customer_id, email, email_key, first_name, last_name, phone,
             address, is_guest_created, credential, preferences, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          rusqlite::params![
            id_str,
            input.email,
            key,
            input.first_name,
            input.last_name,
            input.profile.phone,
            address_json,
            input.is_guest_created,
            input.credential,
            preferences_json,
            at_str,
          ],
        );
        match inserted {
          Ok(_) => Ok(true),
          Err(e) if is_unique_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    Ok(if created {
      CustomerInsert::Created(customer)
    } else {
      CustomerInsert::EmailTaken
    })
  }
}
