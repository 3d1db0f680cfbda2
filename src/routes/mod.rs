mod events;
mod health_check;
mod spa;
mod subscriptions;
mod unsubscribe;

pub use events::*;
pub use health_check::*;
pub use spa::*;
pub use subscriptions::*;
pub use unsubscribe::*;

use actix_web::{error::JsonPayloadError, HttpRequest, HttpResponse};

#[derive(serde::Serialize, Debug)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: &str) -> Self {
        MessageBody {
            message: String::from(message),
        }
    }
}

/// Answers malformed JSON bodies with the same `{message}` shape as the handlers.
pub fn json_error_handler(err: JsonPayloadError, _: &HttpRequest) -> actix_web::Error {
    tracing::warn!("Rejected request body: {}", err);

    let response = HttpResponse::BadRequest().json(MessageBody::new("Invalid request body"));

    actix_web::error::InternalError::from_response(err, response).into()
}

pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;

    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }

    Ok(())
}
