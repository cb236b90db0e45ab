use super::actor::{CoordinatorActorHandle, HolidayCoordinatorActor};
use super::models::CoordinatorSnapshot;
use crate::config::Config;
use crate::error::CalResult;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;

/// Handle for interacting with the holiday coordinator actor
#[derive(Clone)]
pub struct HolidayCoordinatorHandle {
    actor_handle: CoordinatorActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl HolidayCoordinatorHandle {
    /// Create a new handle and spawn the coordinator actor
    pub fn new(config: Arc<RwLock<Config>>) -> Self {
        let (mut actor, handle) = HolidayCoordinatorActor::new(config);

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Force one refresh and wait for its outcome
    pub async fn refresh(&self) -> CalResult<()> {
        self.actor_handle.refresh().await
    }

    /// Subscribe to refresh notifications
    pub fn subscribe(&self) -> watch::Receiver<CoordinatorSnapshot> {
        self.actor_handle.subscribe()
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> CalResult<()> {
        self.actor_handle.shutdown().await
    }
}
