use actix_web::web;
use serde::Deserialize;

use crate::domain::event_id::EventId;
use crate::domain::event_url::EventUrl;
use crate::domain::subscriber_email::SubscriberEmail;
use crate::domain::subscriber_name::SubscriberName;

pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields: name, email, eventId and eventUrl";

#[derive(Debug)]
pub struct NewSubscriber {
    pub email: SubscriberEmail,
    pub name: SubscriberName,
    pub event_id: EventId,
    pub event_url: EventUrl,
    /// `None` keeps the stored flag on update and defaults to subscribed on create.
    pub subscribe: Option<bool>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NewSubscriberBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub event_id: Option<String>,
    pub subscribe: Option<bool>,
    pub event_url: Option<String>,
}

impl TryFrom<web::Json<NewSubscriberBody>> for NewSubscriber {
    type Error = String;

    fn try_from(body: web::Json<NewSubscriberBody>) -> Result<Self, Self::Error> {
        let body = body.into_inner();
        let (name, email, event_id, event_url) =
            match (body.name, body.email, body.event_id, body.event_url) {
                (Some(name), Some(email), Some(event_id), Some(event_url)) => {
                    (name, email, event_id, event_url)
                }
                _ => return Err(String::from(MISSING_FIELDS_MESSAGE)),
            };

        Ok(NewSubscriber {
            name: SubscriberName::parse(name)?,
            email: SubscriberEmail::parse(email)?,
            event_id: EventId::parse(event_id)?,
            event_url: EventUrl::parse(event_url)?,
            subscribe: body.subscribe,
        })
    }
}
