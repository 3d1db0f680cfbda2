use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};

use crate::{
    domain::{
        new_subscriber::{NewSubscriber, NewSubscriberBody},
        subscriber::SubscriberSummary,
    },
    email_client::EmailClient,
    routes::{error_chain_fmt, MessageBody},
    store::{StoreError, SubscriberStore},
};

pub const CONFIRMATION_EMAIL_SUBJECT: &str = "You're subscribed to event updates";

#[derive(serde::Serialize, Debug)]
pub struct SubscriptionResponse {
    pub message: String,
    pub subscriber: SubscriberSummary,
}

#[derive(thiserror::Error)]
pub enum SubscribeError {
    #[error("{0}")]
    Validation(String),
    #[error("Failed to save the subscriber.")]
    Store(#[source] StoreError),
    #[error("Subscriber was saved but the confirmation email could not be sent.")]
    Notification(#[source] reqwest::Error),
}

impl std::fmt::Debug for SubscribeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SubscribeError {
    fn status_code(&self) -> StatusCode {
        match self {
            SubscribeError::Validation(_) => StatusCode::BAD_REQUEST,
            SubscribeError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SubscribeError::Notification(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            SubscribeError::Store(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(MessageBody { message })
    }
}

#[tracing::instrument(
    name = "Creating or updating a subscriber handler",
    skip(body, store, email_client),
    fields(
        subscriber_email = ?body.email,
        subscriber_name = ?body.name,
        event_id = ?body.event_id
    )
)]
pub async fn handle_create_subscription(
    body: web::Json<NewSubscriberBody>,
    store: web::Data<dyn SubscriberStore>,
    email_client: web::Data<EmailClient>,
) -> Result<HttpResponse, SubscribeError> {
    let new_subscriber: NewSubscriber = body.try_into().map_err(|err: String| {
        tracing::error!("Validation error: {:?}", err);
        SubscribeError::Validation(err)
    })?;

    let outcome = store.upsert(&new_subscriber).await.map_err(|err| {
        tracing::error!("Failed to save subscriber: {:?}", err);
        SubscribeError::Store(err)
    })?;

    send_confirmation_email(&email_client, &new_subscriber)
        .await
        .map_err(|err| {
            tracing::error!(
                "Failed to send an email to {}: {:?}",
                new_subscriber.email.as_ref(),
                err
            );
            SubscribeError::Notification(err)
        })?;

    let (status, message) = if outcome.is_created() {
        (StatusCode::CREATED, "Subscription created successfully")
    } else {
        (StatusCode::OK, "Subscription updated successfully")
    };

    Ok(HttpResponse::build(status).json(SubscriptionResponse {
        message: String::from(message),
        subscriber: outcome.subscriber().into(),
    }))
}

#[tracing::instrument(
    name = "Send a confirmation email to a subscriber",
    fields(event_url = %new_subscriber.event_url.as_ref()),
    skip(email_client, new_subscriber)
)]
async fn send_confirmation_email(
    email_client: &EmailClient,
    new_subscriber: &NewSubscriber,
) -> Result<(), reqwest::Error> {
    let name = new_subscriber.name.as_ref();
    let url = new_subscriber.event_url.as_ref();
    let html_body = format!(
        r#"
            <div>
                <h1>Thanks for your interest, {name}!</h1>
                <p>We will keep you posted. Click <a href="{url}">here</a> to see the event.</p>
                <p>{url}</p>
            </div>
        "#,
        name = escape_html(name),
        url = escape_html(url)
    );
    let text_body = format!(
        "Thanks for your interest, {}!\nWe will keep you posted. See the event at {}",
        name, url
    );

    email_client
        .send_email(
            &new_subscriber.email,
            CONFIRMATION_EMAIL_SUBJECT,
            html_body.as_str(),
            text_body.as_str(),
        )
        .await
}

/// Escapes text for both element content and double quoted attribute values.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }

    escaped
}
