use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time;

use crate::domain::event_query::EventQuery;

const REQUEST_TIMEOUT: time::Duration = time::Duration::from_secs(10);
const EVENTS_PATH: &str = "/discovery/v2/events.json";

/// Filters every search is pinned to, whatever the caller asks for.
const FIXED_PARAMETERS: [(&str, &str); 7] = [
    ("city", "Sydney"),
    ("countryCode", "AU"),
    ("sort", "date,asc"),
    ("locale", "*"),
    ("includeFamily", "yes"),
    ("includeTBA", "no"),
    ("includeTBD", "no"),
];

/// Client for the third party event discovery API.
pub struct EventsClient {
    http_client: Client,
    base_url: String,
    api_key: Secret<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum EventsApiError {
    #[error("The events API answered with status {status}.")]
    Rejected { status: StatusCode, payload: Value },
    #[error("Failed to reach the events API.")]
    Transport(#[from] reqwest::Error),
}

/// Listing returned to our callers, `page.number` is the caller's zero based page.
#[derive(Serialize, Debug, PartialEq)]
pub struct EventListing {
    #[serde(rename = "_embedded")]
    pub embedded: EmbeddedEvents,
    pub page: PageInfo,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct EmbeddedEvents {
    #[serde(default)]
    pub events: Vec<Value>,
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number: u32,
}

#[derive(Deserialize, Debug)]
struct UpstreamListing {
    #[serde(rename = "_embedded", default)]
    embedded: EmbeddedEvents,
    page: Option<UpstreamPage>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct UpstreamPage {
    size: Option<u64>,
    total_elements: Option<u64>,
    total_pages: Option<u64>,
}

impl EventsClient {
    pub fn new(
        base_url: String,
        api_key: Secret<String>,
        timeout: Option<time::Duration>,
    ) -> Result<EventsClient, reqwest::Error> {
        let http_client = Client::builder()
            .timeout(timeout.unwrap_or(REQUEST_TIMEOUT))
            .build()?;

        Ok(EventsClient {
            http_client,
            base_url,
            api_key,
        })
    }

    #[tracing::instrument(name = "Searching the events API", skip(self))]
    pub async fn search(&self, query: &EventQuery) -> Result<EventListing, EventsApiError> {
        let url = format!("{}{}", self.base_url, EVENTS_PATH);
        let response = self
            .http_client
            .get(&url)
            .query(&self.upstream_parameters(query))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            let payload = serde_json::from_str(&body).unwrap_or(Value::String(body));

            return Err(EventsApiError::Rejected { status, payload });
        }

        let upstream: UpstreamListing = response.json().await?;
        let page = upstream.page.unwrap_or_default();

        Ok(EventListing {
            embedded: upstream.embedded,
            page: PageInfo {
                size: page.size.unwrap_or(u64::from(query.size)),
                total_elements: page.total_elements.unwrap_or(0),
                total_pages: page.total_pages.unwrap_or(0),
                number: query.page,
            },
        })
    }

    fn upstream_parameters(&self, query: &EventQuery) -> Vec<(&'static str, String)> {
        let mut parameters = vec![("apikey", self.api_key.expose_secret().clone())];

        parameters.extend(
            FIXED_PARAMETERS
                .iter()
                .map(|(key, value)| (*key, value.to_string())),
        );
        parameters.push(("size", query.size.to_string()));
        // Upstream pages start at 1
        parameters.push(("page", (u64::from(query.page) + 1).to_string()));

        let optional = [
            ("segmentId", &query.segment_id),
            ("keyword", &query.keyword),
            ("startDateTime", &query.start_date_time),
            ("endDateTime", &query.end_date_time),
            ("priceRange", &query.price_range),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                parameters.push((key, value.clone()));
            }
        }

        parameters
    }
}
