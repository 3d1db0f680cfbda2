use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use super::{StoreError, SubscriberStore, UpsertOutcome};
use crate::domain::event_id::EventId;
use crate::domain::new_subscriber::NewSubscriber;
use crate::domain::subscriber::Subscriber;
use crate::domain::subscriber_email::SubscriberEmail;
use crate::domain::subscriber_name::SubscriberName;

const SUBSCRIBER_COLUMNS: &str =
    "id, email, name, events, categories, subscribed, last_email_sent, created_at";

pub struct PgSubscriberStore {
    db_pool: PgPool,
}

impl PgSubscriberStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SubscriberStore for PgSubscriberStore {
    #[tracing::instrument(
        name = "Upserting a subscriber in the database",
        skip(self, new_subscriber),
        fields(subscriber_email = %new_subscriber.email)
    )]
    async fn upsert(&self, new_subscriber: &NewSubscriber) -> Result<UpsertOutcome, StoreError> {
        // xmax is only zero for rows written by a plain insert
        let query = format!(
            r#"
            INSERT INTO subscribers (id, email, name, events, categories, subscribed, created_at)
            VALUES ($1, $2, $3, ARRAY[$4]::TEXT[], '{{}}', COALESCE($5, TRUE), $6)
            ON CONFLICT (email) DO UPDATE SET
                name = EXCLUDED.name,
                subscribed = COALESCE($5, subscribers.subscribed),
                events = CASE
                    WHEN $4 = ANY(subscribers.events) THEN subscribers.events
                    ELSE array_append(subscribers.events, $4)
                END
            RETURNING {}, (xmax = 0) AS inserted
            "#,
            SUBSCRIBER_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(new_subscriber.email.as_ref())
            .bind(new_subscriber.name.as_ref())
            .bind(new_subscriber.event_id.as_ref())
            .bind(new_subscriber.subscribe)
            .bind(Utc::now())
            .fetch_one(&self.db_pool)
            .await
            .map_err(|err| {
                tracing::error!("Failed to execute query: {:?}", err);
                err
            })?;

        let subscriber = subscriber_from_row(&row)?;

        if row.try_get::<bool, _>("inserted")? {
            Ok(UpsertOutcome::Created(subscriber))
        } else {
            Ok(UpsertOutcome::Updated(subscriber))
        }
    }

    #[tracing::instrument(name = "Unsubscribing a subscriber in the database", skip(self))]
    async fn unsubscribe(
        &self,
        email: &SubscriberEmail,
    ) -> Result<Option<Subscriber>, StoreError> {
        let query = format!(
            "UPDATE subscribers SET subscribed = FALSE WHERE email = $1 RETURNING {}",
            SUBSCRIBER_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(email.as_ref())
            .fetch_optional(&self.db_pool)
            .await?;

        row.as_ref().map(subscriber_from_row).transpose()
    }

    #[tracing::instrument(name = "Fetching a subscriber from the database", skip(self))]
    async fn find_by_email(
        &self,
        email: &SubscriberEmail,
    ) -> Result<Option<Subscriber>, StoreError> {
        let query = format!(
            "SELECT {} FROM subscribers WHERE email = $1",
            SUBSCRIBER_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(email.as_ref())
            .fetch_optional(&self.db_pool)
            .await?;

        row.as_ref().map(subscriber_from_row).transpose()
    }
}

fn subscriber_from_row(row: &PgRow) -> Result<Subscriber, StoreError> {
    let events = row
        .try_get::<Vec<String>, _>("events")?
        .into_iter()
        .map(EventId::parse)
        .collect::<Result<Vec<_>, _>>()
        .map_err(StoreError::InvalidRecord)?;

    Ok(Subscriber {
        id: row.try_get("id")?,
        email: SubscriberEmail::parse(row.try_get("email")?).map_err(StoreError::InvalidRecord)?,
        name: SubscriberName::parse(row.try_get("name")?).map_err(StoreError::InvalidRecord)?,
        events,
        categories: row.try_get("categories")?,
        subscribed: row.try_get("subscribed")?,
        last_email_sent: row.try_get::<Option<DateTime<Utc>>, _>("last_email_sent")?,
        created_at: row.try_get("created_at")?,
    })
}
