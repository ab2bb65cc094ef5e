//! Guest purchaser reconciliation.
//!
//! A booking created without a customer is linked to the identity owning its
//! contact email, creating a guest identity the first time an email is seen.
//! Uniqueness is enforced by the store, never by a lock here: a writer that
//! loses the insert race sees [`CustomerInsert::EmailTaken`] and links the
//! winner's identity instead.

use crate::{
  BookingService, Error, Result,
  booking::{Booking, BookingReference, Contact},
  customer::{Customer, NewCustomer, email_key},
  store::{BookingStore, CustomerInsert},
};

/// Lookup-or-insert rounds before giving up. Two suffice unless identities
/// are being deleted concurrently, which this service never does.
const RECONCILE_ATTEMPTS: usize = 3;

impl<S: BookingStore> BookingService<S> {
  /// Resolve the customer owning `contact.email` and link it to the booking
  /// `reference`.
  ///
  /// Linking is set-once: a booking that already has a customer keeps it,
  /// and that existing owner is what gets returned.
  pub async fn reconcile(
    &self,
    contact: &Contact,
    reference: &BookingReference,
  ) -> Result<Customer> {
    let (customer, _) = self.reconcile_booking(contact, reference).await?;
    Ok(customer)
  }

  /// [`Self::reconcile`], also returning the booking as stored after the
  /// link.
  pub(crate) async fn reconcile_booking(
    &self,
    contact: &Contact,
    reference: &BookingReference,
  ) -> Result<(Customer, Booking)> {
    contact.validate()?;
    let key = email_key(&contact.email);

    for _ in 0..RECONCILE_ATTEMPTS {
      let existing = self
        .store
        .find_customer_by_email(key.clone())
        .await
        .map_err(Error::store)?;

      let customer = match existing {
        Some(customer) => {
          tracing::debug!(%reference, customer_id = %customer.customer_id, "reusing customer");
          customer
        }
        None => {
          let inserted = self
            .store
            .insert_customer(NewCustomer::guest(contact))
            .await
            .map_err(Error::store)?;
          match inserted {
            CustomerInsert::Created(customer) => {
              tracing::info!(
                %reference,
                customer_id = %customer.customer_id,
                "created guest customer"
              );
              customer
            }
            CustomerInsert::EmailTaken => {
              tracing::debug!(%reference, "lost guest insert race; retrying lookup");
              continue;
            }
          }
        }
      };

      return self.attach_customer(reference, customer).await;
    }

    Err(Error::IdentityContention(key))
  }

  /// Link `customer` to whichever collection holds `reference`.
  ///
  /// If the booking was already linked elsewhere the link is refused, and
  /// the customer it actually references is returned instead.
  async fn attach_customer(
    &self,
    reference: &BookingReference,
    customer: Customer,
  ) -> Result<(Customer, Booking)> {
    let customer_id = customer.customer_id;
    let booking = self
      .probe(reference, move |kind, r| {
        self.store.link_customer(kind, r, customer_id)
      })
      .await?;

    match booking.customer_id {
      Some(owner) if owner == customer_id => Ok((customer, booking)),
      Some(owner) => {
        tracing::debug!(%reference, %owner, "booking already linked");
        let owner = self.get_customer(owner).await?;
        Ok((owner, booking))
      }
      None => Err(Error::IdentityContention(customer.email)),
    }
  }
}
