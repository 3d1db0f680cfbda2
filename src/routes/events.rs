use actix_web::{
    http::{header::ContentType, StatusCode},
    web::{self, Bytes},
    HttpRequest, HttpResponse, ResponseError,
};
use serde_json::{json, Value};

use crate::{
    domain::event_query::{EventQuery, EventSearchParameters},
    events_client::{EventsApiError, EventsClient},
    response_cache::ResponseCache,
    routes::error_chain_fmt,
};

#[derive(thiserror::Error)]
pub enum FetchEventsError {
    #[error(transparent)]
    Upstream(#[from] EventsApiError),
    #[error("Failed to serialize the events listing.")]
    Serialization(#[source] serde_json::Error),
}

impl std::fmt::Debug for FetchEventsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for FetchEventsError {
    fn status_code(&self) -> StatusCode {
        match self {
            FetchEventsError::Upstream(EventsApiError::Rejected { status, .. }) => {
                match status.as_u16() {
                    400 => StatusCode::BAD_REQUEST,
                    401 => StatusCode::UNAUTHORIZED,
                    429 => StatusCode::TOO_MANY_REQUESTS,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                }
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = match status {
            StatusCode::BAD_REQUEST => json!({ "error": "Invalid request parameters" }),
            StatusCode::UNAUTHORIZED => json!({ "error": "API key is invalid or has expired" }),
            StatusCode::TOO_MANY_REQUESTS => {
                json!({ "error": "Too many requests, please try again later" })
            }
            _ => json!({ "error": "Failed to fetch events", "details": self.details() }),
        };

        HttpResponse::build(status).json(body)
    }
}

impl FetchEventsError {
    fn details(&self) -> Value {
        match self {
            FetchEventsError::Upstream(EventsApiError::Rejected { payload, .. }) => {
                payload.clone()
            }
            other => Value::String(other.to_string()),
        }
    }
}

#[tracing::instrument(
    name = "Searching events handler",
    skip(request, parameters, events_client, cache),
    fields(cache_key = %request.uri(), cache_hit = tracing::field::Empty)
)]
pub async fn handle_search_events(
    request: HttpRequest,
    parameters: web::Query<Vec<(String, String)>>,
    events_client: web::Data<EventsClient>,
    cache: web::Data<ResponseCache>,
) -> Result<HttpResponse, FetchEventsError> {
    let cache_key = request
        .uri()
        .path_and_query()
        .map(|target| target.as_str().to_string())
        .unwrap_or_else(|| request.path().to_string());

    if let Some(payload) = cache.get(&cache_key) {
        tracing::Span::current().record("cache_hit", true);
        return Ok(json_response(payload));
    }
    tracing::Span::current().record("cache_hit", false);

    let query: EventQuery = parameters
        .into_inner()
        .into_iter()
        .collect::<EventSearchParameters>()
        .into();
    let listing = events_client.search(&query).await.map_err(|err| {
        tracing::error!("Failed to fetch events: {:?}", err);
        err
    })?;

    let payload = serde_json::to_vec(&listing).map_err(FetchEventsError::Serialization)?;
    let payload = Bytes::from(payload);
    cache.insert(cache_key, payload.clone());

    Ok(json_response(payload))
}

fn json_response(payload: Bytes) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::json())
        .body(payload)
}
