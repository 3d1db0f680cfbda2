use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use super::{StoreError, SubscriberStore, UpsertOutcome};
use crate::domain::new_subscriber::NewSubscriber;
use crate::domain::subscriber::Subscriber;
use crate::domain::subscriber_email::SubscriberEmail;

/// Subscriber store kept in a `HashMap`, for tests and local runs without a database.
#[derive(Debug, Default)]
pub struct InMemorySubscriberStore {
    subscribers: Mutex<HashMap<SubscriberEmail, Subscriber>>,
}

impl InMemorySubscriberStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SubscriberEmail, Subscriber>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SubscriberStore for InMemorySubscriberStore {
    #[tracing::instrument(
        name = "Upserting a subscriber in memory",
        skip(self, new_subscriber),
        fields(subscriber_email = %new_subscriber.email)
    )]
    async fn upsert(&self, new_subscriber: &NewSubscriber) -> Result<UpsertOutcome, StoreError> {
        let mut subscribers = self.lock();

        if let Some(subscriber) = subscribers.get_mut(&new_subscriber.email) {
            subscriber.name = new_subscriber.name.clone();
            if let Some(subscribe) = new_subscriber.subscribe {
                subscriber.subscribed = subscribe;
            }
            if !subscriber.is_interested_in(&new_subscriber.event_id) {
                subscriber.events.push(new_subscriber.event_id.clone());
            }

            return Ok(UpsertOutcome::Updated(subscriber.clone()));
        }

        let subscriber = Subscriber {
            id: Uuid::new_v4(),
            email: new_subscriber.email.clone(),
            name: new_subscriber.name.clone(),
            events: vec![new_subscriber.event_id.clone()],
            categories: Vec::new(),
            subscribed: new_subscriber.subscribe.unwrap_or(true),
            last_email_sent: None,
            created_at: Utc::now(),
        };
        subscribers.insert(subscriber.email.clone(), subscriber.clone());

        Ok(UpsertOutcome::Created(subscriber))
    }

    #[tracing::instrument(name = "Unsubscribing a subscriber in memory", skip(self))]
    async fn unsubscribe(
        &self,
        email: &SubscriberEmail,
    ) -> Result<Option<Subscriber>, StoreError> {
        Ok(self.lock().get_mut(email).map(|subscriber| {
            subscriber.subscribed = false;
            subscriber.clone()
        }))
    }

    async fn find_by_email(
        &self,
        email: &SubscriberEmail,
    ) -> Result<Option<Subscriber>, StoreError> {
        Ok(self.lock().get(email).cloned())
    }
}
