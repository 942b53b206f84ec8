// poller.rs — Interval-driven refresh with at most one refresh in flight.
//
// Timing policy:
// - The first refresh runs immediately on `start`, then once per interval.
// - The refresh future is awaited inside the loop, so a slow refresh can
//   never overlap the next one. Ticks that come due while a refresh is
//   running are skipped (`MissedTickBehavior::Skip`), not queued.
// - `stop` is honoured between refreshes. A refresh already running is
//   allowed to finish, but its result is dropped instead of published.
// - Dropping the handle stops the poller the same way.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Poller timing configuration (`[poller]` in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PollerConfig {
    /// Seconds between refreshes.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

fn default_interval_secs() -> u64 {
    30
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

/// Re-invokes a refresh function on a fixed interval until stopped.
#[derive(Debug, Clone)]
pub struct NotificationPoller {
    interval: Duration,
}

impl NotificationPoller {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_config(config: &PollerConfig) -> Self {
        // A zero period would make tokio's interval panic.
        Self::new(Duration::from_secs(config.interval_secs.max(1)))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn the polling task. Must be called from within a tokio runtime.
    ///
    /// Each completed refresh is published to the handle; errors are just
    /// values of `T` (use `T = Result<_, _>` to surface them to the view).
    pub fn start<T, F, Fut>(&self, mut refresh: F) -> PollerHandle<T>
    where
        T: Send + Sync + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let (result_tx, result_rx) = watch::channel(None);
        let period = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;
                    // Fires on stop() and when the handle is dropped.
                    _ = stop_rx.changed() => break,
                    _ = ticker.tick() => {}
                }

                let result = refresh().await;

                if *stop_rx.borrow() {
                    tracing::debug!("poller stopped during refresh; discarding result");
                    break;
                }
                if result_tx.send(Some(result)).is_err() {
                    break;
                }
            }
            tracing::debug!("poller exited");
        });

        tracing::debug!(interval_secs = period.as_secs(), "poller started");
        PollerHandle {
            stop_tx,
            results: result_rx,
            task: Some(task),
        }
    }
}

/// Handle to a running poller. Owned by the view that needs the refreshes.
pub struct PollerHandle<T> {
    stop_tx: watch::Sender<bool>,
    results: watch::Receiver<Option<T>>,
    task: Option<JoinHandle<()>>,
}

impl<T> PollerHandle<T> {
    /// Stop polling. Safe to call at any time, any number of times.
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.stop_tx.borrow()
    }

    /// Wait for the next published result. Returns `false` once the poller
    /// has exited and nothing more will arrive.
    pub async fn changed(&mut self) -> bool {
        self.results.changed().await.is_ok()
    }

    /// The most recent published result.
    pub fn latest(&self) -> Option<T>
    where
        T: Clone,
    {
        self.results.borrow().clone()
    }

    /// An independent receiver for the published results.
    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.results.clone()
    }

    /// Stop and wait for the polling task to exit (including any refresh
    /// that was in flight).
    pub async fn join(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("poller task ended abnormally: {}", e);
            }
        }
    }
}

impl<T> Drop for PollerHandle<T> {
    fn drop(&mut self) {
        self.stop_tx.send_replace(true);
    }
}
