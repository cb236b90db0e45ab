mod components;
mod config;
mod error;
mod shutdown;
mod startup;

use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting vakanz");

    // Load configuration
    let config = startup::load_config().await?;

    // Run the calendar service
    startup::start_service(config).await
}
