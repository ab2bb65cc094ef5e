//! SQL schema for the Wayfare SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS customers (
    customer_id      TEXT PRIMARY KEY,
    email            TEXT NOT NULL,
    email_key        TEXT NOT NULL UNIQUE,  -- trimmed, lower-cased email
    first_name       TEXT NOT NULL,
    last_name        TEXT NOT NULL,
    phone            TEXT,
    address          TEXT,                  -- JSON PostalAddress or NULL
    is_guest_created INTEGER NOT NULL DEFAULT 0,
    credential       TEXT NOT NULL,
    preferences      TEXT NOT NULL DEFAULT '{}',
    created_at       TEXT NOT NULL
);

-- One namespace for references of both kinds. Lookups never use this table;
-- it exists so the primary key can reject a reference reused across kinds.
CREATE TABLE IF NOT EXISTS booking_references (
    booking_reference TEXT PRIMARY KEY,
    kind              TEXT NOT NULL         -- 'flight' | 'hotel'
);

CREATE TABLE IF NOT EXISTS flight_bookings (
    booking_reference TEXT PRIMARY KEY REFERENCES booking_references(booking_reference),
    customer_id       TEXT REFERENCES customers(customer_id),
    contact           TEXT NOT NULL,        -- JSON Contact
    status            TEXT NOT NULL DEFAULT 'pending',
    payment_status    TEXT NOT NULL DEFAULT 'pending',
    payment_method    TEXT,
    final_price       TEXT NOT NULL,        -- decimal string
    currency          TEXT NOT NULL,
    base_price        TEXT,
    taxes             TEXT,
    details           TEXT NOT NULL,        -- opaque JSON payload
    special_requests  TEXT,
    created_at        TEXT NOT NULL,        -- RFC 3339 UTC, fixed width
    updated_at        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS hotel_bookings (
    booking_reference TEXT PRIMARY KEY REFERENCES booking_references(booking_reference),
    customer_id       TEXT REFERENCES customers(customer_id),
    contact           TEXT NOT NULL,
    status            TEXT NOT NULL DEFAULT 'pending',
    payment_status    TEXT NOT NULL DEFAULT 'pending',
    payment_method    TEXT,
    final_price       TEXT NOT NULL,
    currency          TEXT NOT NULL,
    base_price        TEXT,
    taxes             TEXT,
    details           TEXT NOT NULL,
    special_requests  TEXT,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS flight_bookings_created_idx  ON flight_bookings(created_at);
CREATE INDEX IF NOT EXISTS flight_bookings_customer_idx ON flight_bookings(customer_id);
CREATE INDEX IF NOT EXISTS flight_bookings_status_idx   ON flight_bookings(status);
CREATE INDEX IF NOT EXISTS hotel_bookings_created_idx   ON hotel_bookings(created_at);
CREATE INDEX IF NOT EXISTS hotel_bookings_customer_idx  ON hotel_bookings(customer_id);
CREATE INDEX IF NOT EXISTS hotel_bookings_status_idx    ON hotel_bookings(status);

PRAGMA user_version = 1;
";
