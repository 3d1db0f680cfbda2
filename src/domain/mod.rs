pub mod event_id;
pub mod event_query;
pub mod event_url;
pub mod new_subscriber;
pub mod subscriber;
pub mod subscriber_email;
pub mod subscriber_name;
