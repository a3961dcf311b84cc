//! Fixed-rate driver for the monitoring worker.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use super::worker::Worker;

/// Long-lived periodic loop that runs one worker pass per tick.
///
/// Ticks are fixed-rate: each starts `period` after the previous one started,
/// not after it finished. The first pass runs immediately on start. `stop`
/// shuts the loop down deterministically, so tests and process teardown never
/// leave a detached timer behind.
pub struct Scheduler {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Scheduler {
    pub fn start(worker: Arc<Worker>, period: Duration) -> Self {
        let (shutdown, mut signal) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut timer = tokio::time::interval(period);
            info!(period_seconds = period.as_secs(), "scheduler started");
            loop {
                tokio::select! {
                    _ = timer.tick() => {
                        worker.run_tick().await;
                    }
                    _ = signal.changed() => {
                        info!("scheduler stopping");
                        break;
                    }
                }
            }
        });

        Self { shutdown, handle }
    }

    /// Signal the loop to stop and wait for it to wind down.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}
