use std::collections::HashSet;
use std::sync::Arc;

use sydney_events::domain::{
    event_id::EventId, event_url::EventUrl, new_subscriber::NewSubscriber,
    subscriber_email::SubscriberEmail, subscriber_name::SubscriberName,
};
use sydney_events::store::{PgSubscriberStore, SubscriberStore};

use crate::helpers::configure_db;

async fn store() -> Option<PgSubscriberStore> {
    configure_db().await.map(PgSubscriberStore::new)
}

fn email(address: &str) -> SubscriberEmail {
    SubscriberEmail::parse(String::from(address)).unwrap()
}

fn new_subscriber(name: &str, event_id: &str, subscribe: Option<bool>) -> NewSubscriber {
    NewSubscriber {
        email: email("jo@x.com"),
        name: SubscriberName::parse(String::from(name)).unwrap(),
        event_id: EventId::parse(String::from(event_id)).unwrap(),
        event_url: EventUrl::parse(format!("http://x/{}", event_id)).unwrap(),
        subscribe,
    }
}

fn event_ids(events: &[EventId]) -> Vec<&str> {
    events.iter().map(|event| event.as_ref()).collect()
}

#[tokio::test]
async fn upsert_creates_a_subscribed_record() {
    let Some(store) = store().await else { return };

    let outcome = store
        .upsert(&new_subscriber("Jo", "E1", None))
        .await
        .expect("Failed to upsert subscriber.");

    assert!(outcome.is_created());
    let subscriber = outcome.subscriber();
    assert_eq!(subscriber.name.as_ref(), "Jo");
    assert_eq!(subscriber.email.as_ref(), "jo@x.com");
    assert_eq!(event_ids(&subscriber.events), ["E1"]);
    assert!(subscriber.categories.is_empty());
    assert!(subscriber.subscribed);
    assert!(subscriber.last_email_sent.is_none());
}

#[tokio::test]
async fn upsert_overwrites_the_name_and_never_duplicates_events() {
    let Some(store) = store().await else { return };

    store.upsert(&new_subscriber("Jo", "E1", None)).await.unwrap();
    let second = store
        .upsert(&new_subscriber("Joanne", "E2", None))
        .await
        .unwrap();
    let third = store
        .upsert(&new_subscriber("Joanne", "E1", None))
        .await
        .unwrap();

    assert!(!second.is_created());
    assert!(!third.is_created());
    assert_eq!(third.subscriber().name.as_ref(), "Joanne");
    assert_eq!(event_ids(&third.subscriber().events), ["E1", "E2"]);
}

#[tokio::test]
async fn upsert_keeps_the_subscribed_flag_when_it_is_absent() {
    let Some(store) = store().await else { return };

    let created = store
        .upsert(&new_subscriber("Jo", "E1", Some(false)))
        .await
        .unwrap();
    let kept = store
        .upsert(&new_subscriber("Jo", "E2", None))
        .await
        .unwrap();
    let overwritten = store
        .upsert(&new_subscriber("Jo", "E3", Some(true)))
        .await
        .unwrap();

    assert!(!created.subscriber().subscribed);
    assert!(!kept.subscriber().subscribed);
    assert!(overwritten.subscriber().subscribed);
}

#[tokio::test]
async fn unsubscribe_only_clears_the_flag_of_a_known_subscriber() {
    let Some(store) = store().await else { return };

    store.upsert(&new_subscriber("Jo", "E1", None)).await.unwrap();

    let unsubscribed = store
        .unsubscribe(&email("jo@x.com"))
        .await
        .unwrap()
        .expect("Subscriber should exist.");
    let stored = store
        .find_by_email(&email("jo@x.com"))
        .await
        .unwrap()
        .unwrap();

    assert!(!unsubscribed.subscribed);
    assert!(!stored.subscribed);
    assert_eq!(stored.name.as_ref(), "Jo");
    assert_eq!(event_ids(&stored.events), ["E1"]);
}

#[tokio::test]
async fn unsubscribe_of_an_unknown_email_changes_nothing() {
    let Some(store) = store().await else { return };

    let result = store.unsubscribe(&email("nobody@x.com")).await.unwrap();

    assert!(result.is_none());
    assert!(store
        .find_by_email(&email("nobody@x.com"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn concurrent_upserts_for_one_email_lose_no_event() {
    let Some(store) = store().await else { return };
    let store = Arc::new(store);

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .upsert(&new_subscriber("Jo", &format!("E{}", i), None))
                    .await
                    .expect("Failed to upsert subscriber.")
            })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        if handle.await.unwrap().is_created() {
            created += 1;
        }
    }

    let stored = store
        .find_by_email(&email("jo@x.com"))
        .await
        .unwrap()
        .unwrap();
    let events: HashSet<&str> = stored.events.iter().map(|event| event.as_ref()).collect();

    assert_eq!(created, 1);
    assert_eq!(stored.events.len(), 10);
    assert_eq!(events.len(), 10);
}
