use reqwest::Response;
use sqlx::{migrate, Connection, Executor, PgConnection, PgPool};
use std::sync::{Arc, Once};
use uuid::Uuid;
use wiremock::MockServer;

use sydney_events::{
    clock::ManualClock,
    config::get_configuration,
    startup::{get_connection_db_pool, Application},
    store::InMemorySubscriberStore,
    telemetry::{get_subscriber, init_subscriber},
};

static TRACING: Once = Once::new();

pub struct TestApp {
    pub address: String,
    pub store: Arc<InMemorySubscriberStore>,
    pub clock: Arc<ManualClock>,
    pub email_server: MockServer,
    pub events_server: MockServer,
    pub api_client: reqwest::Client,
}

/// Links found in the plain text and html parts of a confirmation email.
pub struct EventLinks {
    pub html: String,
    pub plain_text: String,
}

impl TestApp {
    pub async fn spawn_app() -> TestApp {
        // Logs are only printed when TEST_LOG is set, e.g. `TEST_LOG=true cargo test`
        TRACING.call_once(|| {
            if std::env::var("TEST_LOG").is_ok() {
                let subscriber =
                    get_subscriber(String::from("test"), String::from("debug"), std::io::stdout);
                init_subscriber(subscriber).expect("Failed to initialise logging.");
            }
        });

        let mut config = get_configuration().expect("Missing configuration file.");
        let email_server = MockServer::start().await;
        let events_server = MockServer::start().await;

        // We are using port 0 as way to define a different port per each test. Port 0 is a special case that operating systems
        // take into account: when port is 0, the OS will search for the first available port
        config.set_app_port(0);
        config.set_email_client_base_url(email_server.uri());
        config.set_events_api_base_url(events_server.uri());

        let store = Arc::new(InMemorySubscriberStore::new());
        let clock = Arc::new(ManualClock::default());

        let application = Application::build_with(config, store.clone(), clock.clone())
            .await
            .expect("Failed to build application.");
        let port = application.get_port();

        tokio::spawn(application.run_until_stop());

        TestApp {
            address: format!("http://127.0.0.1:{}", port),
            store,
            clock,
            email_server,
            events_server,
            api_client: reqwest::Client::new(),
        }
    }

    pub async fn post_subscription(&self, body: &serde_json::Value) -> Response {
        self.api_client
            .post(&format!("{}/api/subscribers", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn unsubscribe(&self, email: &str) -> Response {
        self.api_client
            .put(&format!(
                "{}/api/subscribers/unsubscribe/{}",
                self.address, email
            ))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// `query` is appended verbatim, e.g. `"size=5&page=1"`.
    pub async fn get_events(&self, query: &str) -> Response {
        self.api_client
            .get(&format!("{}/api/events?{}", self.address, query))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub fn get_event_links(&self, email_request: &wiremock::Request) -> EventLinks {
        let body: serde_json::Value = serde_json::from_slice(&email_request.body).unwrap();
        let part = |content_type: &str| -> String {
            body["content"]
                .as_array()
                .unwrap()
                .iter()
                .find(|part| part["type"] == content_type)
                .and_then(|part| part["value"].as_str())
                .unwrap()
                .to_owned()
        };
        let get_link = |text: &str| -> String {
            let links: Vec<_> = linkify::LinkFinder::new()
                .links(text)
                .filter(|link| *link.kind() == linkify::LinkKind::Url)
                .collect();

            assert!(!links.is_empty(), "no link found in {}", text);
            links[0].as_str().to_owned()
        };

        EventLinks {
            html: get_link(&part("text/html")),
            plain_text: get_link(&part("text/plain")),
        }
    }

    /// Query pairs of every request the events API double has received so far.
    pub async fn upstream_queries(&self) -> Vec<Vec<(String, String)>> {
        self.events_server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .map(|request| request.url.query_pairs().into_owned().collect())
            .collect()
    }
}

pub fn query_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.as_str())
}

/// Creates a throwaway database on the configured server and runs the migrations on it.
/// Returns `None` when no Postgres server is reachable.
pub async fn configure_db() -> Option<PgPool> {
    let mut config = get_configuration().expect("Missing configuration file.");
    let db_test_name = format!("db_{}", Uuid::new_v4().to_string().replace('-', "_"));

    let mut connection = match PgConnection::connect_with(&config.database.without_db()).await {
        Ok(connection) => connection,
        Err(err) => {
            eprintln!("Postgres is not reachable, skipping database test: {}", err);
            return None;
        }
    };

    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, db_test_name))
        .await
        .expect("Failed to create database.");

    connection
        .close()
        .await
        .expect("Failed to close connection.");

    // Execute migrations
    config.database.set_name(db_test_name);

    let db_pool = get_connection_db_pool(&config.database);

    migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run migrations.");

    Some(db_pool)
}
