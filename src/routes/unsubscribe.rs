use actix_web::{http::StatusCode, web, HttpResponse, ResponseError};

use crate::{
    domain::subscriber_email::SubscriberEmail,
    routes::{error_chain_fmt, MessageBody},
    store::{StoreError, SubscriberStore},
};

#[derive(thiserror::Error)]
pub enum UnsubscribeError {
    #[error("Subscriber not found")]
    NotFound,
    #[error("Failed to unsubscribe.")]
    Store(#[from] StoreError),
}

impl std::fmt::Debug for UnsubscribeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for UnsubscribeError {
    fn status_code(&self) -> StatusCode {
        match self {
            UnsubscribeError::NotFound => StatusCode::NOT_FOUND,
            UnsubscribeError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            UnsubscribeError::NotFound => "Subscriber not found",
            UnsubscribeError::Store(_) => "Internal server error",
        };

        HttpResponse::build(self.status_code()).json(MessageBody::new(message))
    }
}

#[tracing::instrument(
    name = "Unsubscribing a subscriber handler",
    skip(email, store),
    fields(subscriber_email = %email)
)]
pub async fn handle_unsubscribe(
    email: web::Path<String>,
    store: web::Data<dyn SubscriberStore>,
) -> Result<HttpResponse, UnsubscribeError> {
    // No subscriber can be stored under an address that does not parse
    let email = SubscriberEmail::parse(email.into_inner()).map_err(|err| {
        tracing::warn!("Unsubscribe for an invalid address: {}", err);
        UnsubscribeError::NotFound
    })?;

    match store.unsubscribe(&email).await {
        Ok(Some(_)) => Ok(HttpResponse::Ok().json(MessageBody::new("Successfully unsubscribed"))),
        Ok(None) => Err(UnsubscribeError::NotFound),
        Err(err) => {
            tracing::error!("Failed to unsubscribe {}: {:?}", email.as_ref(), err);
            Err(err.into())
        }
    }
}
