//! Customer identities, deduplicated purchasers keyed by email.

use chrono::{DateTime, Utc};
use rand_core::{OsRng, RngCore as _};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::booking::{Contact, PostalAddress};

/// Contact details held on the identity itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerProfile {
  pub phone:   Option<String>,
  pub address: Option<PostalAddress>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
  pub preferred_currency: Option<String>,
  pub marketing_opt_in:   bool,
}

/// A persisted customer identity. The credential is write-only and never
/// read back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
  pub customer_id:      Uuid,
  pub email:            String,
  pub first_name:       String,
  pub last_name:        String,
  pub profile:          CustomerProfile,
  /// `true` when synthesized for a guest purchaser rather than registered.
  pub is_guest_created: bool,
  pub preferences:      Preferences,
  pub created_at:       DateTime<Utc>,
}

impl Customer {
  pub fn summary(&self) -> CustomerSummary {
    CustomerSummary {
      first_name: self.first_name.clone(),
      last_name:  self.last_name.clone(),
      email:      self.email.clone(),
    }
  }
}

/// The identity projection attached to bookings on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSummary {
  pub first_name: String,
  pub last_name:  String,
  pub email:      String,
}

/// Input to [`crate::store::BookingStore::insert_customer`].
#[derive(Debug, Clone)]
pub struct NewCustomer {
  pub email:            String,
  pub first_name:       String,
  pub last_name:        String,
  pub profile:          CustomerProfile,
  pub is_guest_created: bool,
  pub credential:       String,
  pub preferences:      Preferences,
}

impl NewCustomer {
  /// Synthesize a guest identity from a booking contact, with a random
  /// placeholder credential that no login can match.
  pub fn guest(contact: &Contact) -> Self {
    Self {
      email:            contact.email.trim().to_owned(),
      first_name:       contact.first_name.trim().to_owned(),
      last_name:        contact.last_name.trim().to_owned(),
      profile:          CustomerProfile {
        phone:   contact.phone.clone(),
        address: contact.address.clone(),
      },
      is_guest_created: true,
      credential:       placeholder_credential(),
      preferences:      Preferences::default(),
    }
  }

  /// The deduplication key for this identity.
  pub fn email_key(&self) -> String { email_key(&self.email) }
}

/// Case-insensitive deduplication key for an email address.
pub fn email_key(email: &str) -> String { email.trim().to_lowercase() }

fn placeholder_credential() -> String {
  let mut secret = [0u8; 32];
  OsRng.fill_bytes(&mut secret);
  format!("guest${}", hex::encode(secret))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn email_key_folds_case_and_whitespace() {
    assert_eq!(email_key("  Alice@Example.COM "), "alice@example.com");
    assert_eq!(email_key("a@x.com"), email_key("A@X.COM"));
  }

  #[test]
  fn guest_identity_copies_contact_and_randomises_credential() {
    let contact = Contact {
      first_name: " Grace ".into(),
      last_name:  "Hopper".into(),
      email:      "Grace@Navy.mil".into(),
      phone:      Some("+1 555 0100".into()),
      address:    None,
    };

    let a = NewCustomer::guest(&contact);
    let b = NewCustomer::guest(&contact);

    assert!(a.is_guest_created);
    assert_eq!(a.first_name, "Grace");
    assert_eq!(a.email, "Grace@Navy.mil");
    assert_eq!(a.email_key(), "grace@navy.mil");
    assert_eq!(a.profile.phone.as_deref(), Some("+1 555 0100"));
    assert_eq!(a.preferences, Preferences::default());
    assert!(a.credential.starts_with("guest$"));
    assert_eq!(a.credential.len(), "guest$".len() + 64);
    assert_ne!(a.credential, b.credential);
  }
}
