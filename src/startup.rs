use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::io::{Error, ErrorKind};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use crate::clock::{Clock, SystemClock};
use crate::config::{DatabaseSettings, Settings};
use crate::email_client::EmailClient;
use crate::events_client::EventsClient;
use crate::response_cache::ResponseCache;
use crate::routes::{
    handle_create_subscription, handle_search_events, handle_unsubscribe, health_check,
    json_error_handler, serve_spa_index, SpaIndex,
};
use crate::store::{PgSubscriberStore, SubscriberStore};

pub struct Application {
    pub port: u16,
    pub server: Server,
}

impl Application {
    /// Builds the production application: Postgres backed store, wall clock.
    pub async fn build(config: Settings) -> Result<Self, Error> {
        let db_pool = get_connection_db_pool(&config.database);
        let store = Arc::new(PgSubscriberStore::new(db_pool));

        Self::build_with(config, store, Arc::new(SystemClock)).await
    }

    pub async fn build_with(
        config: Settings,
        store: Arc<dyn SubscriberStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, Error> {
        let sender_email = config
            .get_email_client_sender()
            .map_err(|err| Error::new(ErrorKind::InvalidInput, err))?;
        let email_client = EmailClient::new(
            config.email_client.base_url.clone(),
            sender_email,
            config.email_client.api_key.clone(),
            Some(config.email_client.get_timeout()),
        )
        .map_err(|err| Error::new(ErrorKind::Other, err))?;
        let events_client = EventsClient::new(
            config.events_api.base_url.clone(),
            config.events_api.api_key.clone(),
            Some(config.events_api.get_timeout()),
        )
        .map_err(|err| Error::new(ErrorKind::Other, err))?;
        let cache = ResponseCache::new(config.cache.get_ttl(), config.cache.capacity, clock);
        let spa_index = SpaIndex(config.get_static_dir().join("index.html"));

        let listener = TcpListener::bind(config.get_address())?;
        let port = listener.local_addr()?.port();
        let server = run(
            listener,
            store,
            email_client,
            events_client,
            cache,
            spa_index,
        )?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stop(self) -> Result<(), Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    store: Arc<dyn SubscriberStore>,
    email_client: EmailClient,
    events_client: EventsClient,
    cache: ResponseCache,
    spa_index: SpaIndex,
) -> Result<Server, Error> {
    let store: web::Data<dyn SubscriberStore> = web::Data::from(store);
    let email_client = web::Data::new(email_client);
    let events_client = web::Data::new(events_client);
    // One cache shared by every worker
    let cache = web::Data::new(cache);
    let spa_index = web::Data::new(spa_index);

    let server = HttpServer::new(move || {
        // App is where your application logic lives: routing, middlewares, request handler, etc
        App::new()
            // 'wrap' method adds a middleware to the App. This specific middleware provide incoming
            // request logger
            .wrap(TracingLogger::default())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api")
                    .route("/subscribers", web::post().to(handle_create_subscription))
                    .route(
                        "/subscribers/unsubscribe/{email}",
                        web::put().to(handle_unsubscribe),
                    )
                    .route("/events", web::get().to(handle_search_events)),
            )
            .default_service(web::to(serve_spa_index))
            .app_data(store.clone())
            .app_data(email_client.clone())
            .app_data(events_client.clone())
            .app_data(cache.clone())
            .app_data(spa_index.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

pub fn get_connection_db_pool(config: &DatabaseSettings) -> Pool<Postgres> {
    PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(2))
        .connect_lazy_with(config.get_db_options())
}
