use sydney_events::config::get_configuration;
use sydney_events::startup::Application;
use sydney_events::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_subscriber(
        String::from("sydney_events"),
        String::from("info"),
        std::io::stdout,
    );

    init_subscriber(subscriber).expect("Failed to initialise logging.");

    let config = get_configuration().expect("Missing configuration file.");
    let application = Application::build(config).await?;

    tracing::info!("Server listening on port {}", application.get_port());

    application.run_until_stop().await
}
