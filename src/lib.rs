pub mod clock;
pub mod config;
pub mod domain;
pub mod email_client;
pub mod events_client;
pub mod response_cache;
pub mod routes;
pub mod startup;
pub mod store;
pub mod telemetry;
