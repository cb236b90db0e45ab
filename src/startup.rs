use crate::components::{holiday_calendar::HolidayCalendar, ComponentManager};
use crate::config::Config;
use crate::error::Error;
use crate::shutdown;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tokio::sync::{oneshot, RwLock};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load and initialize the application config
pub async fn load_config() -> miette::Result<Arc<RwLock<Config>>> {
    match Config::load() {
        Ok(config) => Ok(Arc::new(RwLock::new(config))),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Initialize and run the calendar service until a shutdown signal arrives
pub async fn start_service(config: Arc<RwLock<Config>>) -> miette::Result<()> {
    {
        let config_read = config.read().await;
        info!(
            "Serving '{}' from {} (language: {})",
            config_read.calendar_name, config_read.event_url, config_read.language
        );
    }

    // Initialize component manager
    let mut component_manager = ComponentManager::new(Arc::clone(&config));

    // Register the holiday calendar component; a second instance would be
    // rejected here
    component_manager.register(HolidayCalendar::new())?;

    let component_manager = Arc::new(component_manager);

    // Initialize components (performs the first forced refresh)
    component_manager.init_all(Arc::clone(&config)).await?;

    // Log the state of the calendar once so a fresh deployment shows signs
    // of life
    if let Some(calendar) = component_manager
        .get_component_by_name("holiday_calendar")
        .and_then(|c| c.as_any().downcast_ref::<HolidayCalendar>())
    {
        if let Some(entity) = calendar.get_entity().await {
            let now = Utc::now();
            let events = entity.events_between(now, now + Duration::days(365)).await;
            info!(
                "Calendar '{}' ({}): {} holiday period(s) in the coming year, available: {}",
                entity.name(),
                entity.unique_id(),
                events.len(),
                entity.available()
            );
        }
    }

    // Create shutdown channel
    let (shutdown_send, shutdown_recv) = oneshot::channel();

    // Clone component manager for shutdown handler
    let shutdown_components = Arc::clone(&component_manager);

    // Spawn signal handler task
    tokio::spawn(async move {
        shutdown::handle_signals(shutdown_send, shutdown_components).await;
    });

    // Wait for the shutdown signal
    if shutdown_recv.await.is_ok() {
        info!("Received shutdown signal, stopping service");
    }

    Ok(())
}
