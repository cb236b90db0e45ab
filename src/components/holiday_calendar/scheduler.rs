use super::handle::HolidayCoordinatorHandle;
use crate::config::Config;
use crate::error::Error;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{sleep, Duration as TokioDuration};
use tracing::{error, info};

/// A component error from `refresh` means the actor mailbox is closed; the
/// coordinator is gone and the loop has nothing left to drive.
fn coordinator_gone(err: &Error) -> bool {
    matches!(err, Error::Component(_))
}

/// Start the periodic refresh loop.
///
/// A failed refresh is logged and otherwise ignored; the next tick is the
/// only retry path. The loop ends when the coordinator shuts down.
pub async fn start_scheduler(config: Arc<RwLock<Config>>, handle: HolidayCoordinatorHandle) {
    let interval_hours = {
        let config = config.read().await;
        config.scan_interval_hours.max(1)
    };
    let interval = TokioDuration::from_secs(interval_hours * 3600);

    tokio::spawn(async move {
        loop {
            info!("Next refresh scheduled in {} hour(s)", interval_hours);
            sleep(interval).await;

            if let Err(e) = handle.refresh().await {
                if coordinator_gone(&e) {
                    info!("Coordinator shut down, stopping refresh scheduler");
                    break;
                }
                error!("Scheduled refresh failed: {}", e);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{component_error, update_failed};

    #[test]
    fn test_scheduler_stops_only_on_mailbox_errors() {
        // A failed fetch keeps the loop alive for the next tick; a closed
        // mailbox ends it
        assert!(coordinator_gone(&component_error("Actor mailbox error")));
        assert!(!coordinator_gone(&update_failed(
            "URL fetch failed with status: 500"
        )));
    }
}
