//! Subscriber persistence.
//!
//! Every mutation is a single store-side operation: there is no read, modify,
//! write round trip between the service and the store, so concurrent requests
//! for the same email never lose an event append. For `name` and `subscribed`
//! the last writer wins.

mod memory;
mod postgres;

pub use memory::InMemorySubscriberStore;
pub use postgres::PgSubscriberStore;

use async_trait::async_trait;

use crate::domain::new_subscriber::NewSubscriber;
use crate::domain::subscriber::Subscriber;
use crate::domain::subscriber_email::SubscriberEmail;

#[derive(Debug)]
pub enum UpsertOutcome {
    Created(Subscriber),
    Updated(Subscriber),
}

impl UpsertOutcome {
    pub fn subscriber(&self) -> &Subscriber {
        match self {
            UpsertOutcome::Created(subscriber) | UpsertOutcome::Updated(subscriber) => subscriber,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, UpsertOutcome::Created(_))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Failed to query the subscriber store.")]
    Database(#[from] sqlx::Error),
    #[error("Stored subscriber is invalid: {0}")]
    InvalidRecord(String),
}

#[async_trait]
pub trait SubscriberStore: Send + Sync + 'static {
    /// Creates the subscriber or, when the email is already known, overwrites
    /// its name, overwrites `subscribed` if given and appends the event id
    /// unless it is already there.
    async fn upsert(&self, new_subscriber: &NewSubscriber) -> Result<UpsertOutcome, StoreError>;

    /// Flags the subscriber as unsubscribed. `None` when the email is unknown.
    async fn unsubscribe(&self, email: &SubscriberEmail)
        -> Result<Option<Subscriber>, StoreError>;

    async fn find_by_email(&self, email: &SubscriberEmail)
        -> Result<Option<Subscriber>, StoreError>;
}
