use super::models::CoordinatorSnapshot;
use crate::config::Config;
use crate::error::{component_error, update_failed, CalResult};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, RwLock};
use tracing::{debug, error, info};

/// The coordinator actor that owns the raw dataset and the fetch cycle.
///
/// Commands are processed one at a time off the mailbox, so at most one
/// fetch is ever in flight per configured data source.
pub struct HolidayCoordinatorActor {
    config: Arc<RwLock<Config>>,
    client: Client,
    command_rx: mpsc::Receiver<CoordinatorCommand>,
    snapshot_tx: watch::Sender<CoordinatorSnapshot>,
}

/// Commands that can be sent to the coordinator actor
pub enum CoordinatorCommand {
    Refresh(mpsc::Sender<CalResult<()>>),
    Shutdown,
}

/// Handle for communicating with the coordinator actor
#[derive(Clone)]
pub struct CoordinatorActorHandle {
    command_tx: mpsc::Sender<CoordinatorCommand>,
    snapshot_rx: watch::Receiver<CoordinatorSnapshot>,
}

impl CoordinatorActorHandle {
    /// Force one refresh and wait for its outcome
    pub async fn refresh(&self) -> CalResult<()> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(CoordinatorCommand::Refresh(response_tx))
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))?
    }

    /// Subscribe to refresh notifications; the receiver always holds the
    /// latest published snapshot
    pub fn subscribe(&self) -> watch::Receiver<CoordinatorSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> CalResult<()> {
        let _ = self.command_tx.send(CoordinatorCommand::Shutdown).await;
        Ok(())
    }
}

impl HolidayCoordinatorActor {
    /// Create a new actor and return its handle
    pub fn new(config: Arc<RwLock<Config>>) -> (Self, CoordinatorActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (snapshot_tx, snapshot_rx) = watch::channel(CoordinatorSnapshot::default());

        let actor = Self {
            config,
            client: Client::new(),
            command_rx,
            snapshot_tx,
        };

        let handle = CoordinatorActorHandle {
            command_tx,
            snapshot_rx,
        };

        (actor, handle)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Holiday coordinator actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                CoordinatorCommand::Refresh(response_tx) => {
                    let result = self.refresh_once().await;
                    let _ = response_tx.send(result).await;
                }
                CoordinatorCommand::Shutdown => {
                    info!("Holiday coordinator actor shutting down");
                    break;
                }
            }
        }

        info!("Holiday coordinator actor shut down");
    }

    /// One refresh attempt. Success replaces the raw dataset wholesale; a
    /// failure keeps the previous dataset and publishes a degraded snapshot.
    async fn refresh_once(&self) -> CalResult<()> {
        let (event_url, timeout_secs) = {
            let config = self.config.read().await;
            (config.event_url.clone(), config.fetch_timeout_secs)
        };

        debug!("Coordinator updating data from {}", event_url);

        match self.fetch_raw_events(&event_url, timeout_secs).await {
            Ok(raw_events) => {
                debug!("Successfully fetched {} raw events from URL", raw_events.len());
                self.snapshot_tx.send_replace(CoordinatorSnapshot {
                    raw_events: Arc::new(raw_events),
                    last_update_success: true,
                });
                Ok(())
            }
            Err(e) => {
                error!("Refresh failed: {}", e);
                let raw_events = self.snapshot_tx.borrow().raw_events.clone();
                self.snapshot_tx.send_replace(CoordinatorSnapshot {
                    raw_events,
                    last_update_success: false,
                });
                Err(e)
            }
        }
    }

    /// Fetch and parse the dataset. Redirects are followed (reqwest default
    /// policy); the attempt is abandoned after the configured timeout.
    async fn fetch_raw_events(&self, event_url: &str, timeout_secs: u64) -> CalResult<Vec<Value>> {
        let response = self
            .client
            .get(event_url)
            .timeout(Duration::from_secs(timeout_secs))
            .send()
            .await
            .map_err(|e| update_failed(&format!("Network error fetching data: {}", e)))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(update_failed(&format!(
                "URL fetch failed with status: {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| update_failed(&format!("Failed to read response body: {}", e)))?;

        // Defensive check, a 200 with no body should not occur
        if body.trim().is_empty() {
            return Err(update_failed("URL fetch returned no data unexpectedly"));
        }

        let raw_events: Vec<Value> = serde_json::from_str(&body)
            .map_err(|e| update_failed(&format!("Failed to parse events response: {}", e)))?;

        Ok(raw_events)
    }
}
