mod actor;
mod handle;
mod scheduler;

pub mod entity;
pub mod localize;
pub mod models;
pub mod normalize;

pub use entity::HolidayCalendarEntity;
pub use handle::HolidayCoordinatorHandle;
pub use localize::Language;
pub use models::{CoordinatorSnapshot, NormalizedEvent, RawEventRecord};

use crate::config::Config;
use crate::error::CalResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// School-holiday calendar component: one coordinator, one entity
#[derive(Default)]
pub struct HolidayCalendar {
    handle: RwLock<Option<HolidayCoordinatorHandle>>,
    entity: RwLock<Option<Arc<HolidayCalendarEntity>>>,
}

impl HolidayCalendar {
    /// Create a new holiday calendar component
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the coordinator handle if the component is initialized
    #[allow(dead_code)]
    pub async fn get_handle(&self) -> Option<HolidayCoordinatorHandle> {
        self.handle.read().await.clone()
    }

    /// Get the calendar entity if the component is initialized
    pub async fn get_entity(&self) -> Option<Arc<HolidayCalendarEntity>> {
        self.entity.read().await.clone()
    }
}

#[async_trait]
impl super::Component for HolidayCalendar {
    fn name(&self) -> &'static str {
        "holiday_calendar"
    }

    async fn init(&self, config: Arc<RwLock<Config>>) -> CalResult<()> {
        let (calendar_name, event_url, language) = {
            let config_read = config.read().await;
            (
                config_read.calendar_name.clone(),
                config_read.event_url.clone(),
                config_read.language,
            )
        };

        // Create a new coordinator handle if one doesn't exist
        let mut handle_lock = self.handle.write().await;
        if handle_lock.is_none() {
            *handle_lock = Some(HolidayCoordinatorHandle::new(Arc::clone(&config)));
        }
        let handle = handle_lock.as_ref().unwrap().clone();
        drop(handle_lock);

        // First forced refresh. Failure is not fatal; the entity simply
        // starts unavailable until the next scheduled tick succeeds.
        if let Err(e) = handle.refresh().await {
            warn!("Initial refresh failed, calendar starts unavailable: {}", e);
        }

        let entity = HolidayCalendarEntity::new(
            calendar_name,
            &event_url,
            language,
            handle.subscribe(),
        );
        *self.entity.write().await = Some(Arc::new(entity));

        // Start the periodic refresh scheduler
        scheduler::start_scheduler(config, handle).await;

        info!("Holiday calendar component initialized");
        Ok(())
    }

    async fn shutdown(&self) -> CalResult<()> {
        let handle_lock = self.handle.read().await;
        if let Some(handle) = &*handle_lock {
            handle.shutdown().await?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
