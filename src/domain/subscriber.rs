use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::event_id::EventId;
use crate::domain::subscriber_email::SubscriberEmail;
use crate::domain::subscriber_name::SubscriberName;

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub id: Uuid,
    pub email: SubscriberEmail,
    pub name: SubscriberName,
    /// Insertion ordered, never holds the same id twice.
    pub events: Vec<EventId>,
    pub categories: Vec<String>,
    pub subscribed: bool,
    pub last_email_sent: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Subscriber {
    pub fn is_interested_in(&self, event_id: &EventId) -> bool {
        self.events.contains(event_id)
    }
}

/// Public projection returned by the subscription endpoints.
#[derive(Debug, serde::Serialize)]
pub struct SubscriberSummary {
    pub name: String,
    pub email: String,
    pub subscribed: bool,
}

impl From<&Subscriber> for SubscriberSummary {
    fn from(subscriber: &Subscriber) -> Self {
        SubscriberSummary {
            name: subscriber.name.as_ref().to_string(),
            email: subscriber.email.as_ref().to_string(),
            subscribed: subscriber.subscribed,
        }
    }
}
