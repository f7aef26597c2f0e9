//! Session Janitor: a background periodic sweep of terminal `AgentSession`s older
//! than an idle threshold (spec §4.4 "Completed sessions older than 1 hour are swept
//! by the Session Janitor"), grounded on the `tokio::time::interval` periodic-sweep
//! idiom (reference pack, `bochaco-formicaio`'s background agent task).

use crate::session_store::AgentSessionStore;
use chrono::Duration as ChronoDuration;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const DEFAULT_IDLE: Duration = Duration::from_secs(60 * 60);
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Periodically removes `completed`/`failed` [`chorus_core::AgentSession`]s that have
/// aged past `idle` (spec §4.4, default 1 hour).
pub struct SessionJanitor {
    store: Arc<dyn AgentSessionStore>,
    idle: ChronoDuration,
    sweep_interval: Duration,
}

impl SessionJanitor {
    /// A janitor with the spec default idle threshold (1 hour) and a 5-minute sweep
    /// cadence.
    #[must_use]
    pub fn new(store: Arc<dyn AgentSessionStore>) -> Self {
        Self {
            store,
            idle: ChronoDuration::from_std(DEFAULT_IDLE).expect("fits in chrono::Duration"),
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    /// Override the idle threshold and sweep cadence (for tests and deployments that
    /// want a tighter loop).
    #[must_use]
    pub fn with_thresholds(mut self, idle: ChronoDuration, sweep_interval: Duration) -> Self {
        self.idle = idle;
        self.sweep_interval = sweep_interval;
        self
    }

    /// Run one sweep pass immediately, removing every sweepable session. Returns the
    /// number of sessions removed.
    pub async fn sweep_once(&self) -> Result<usize, chorus_core::CoreError> {
        let now = chrono::Utc::now();
        let sessions = self.store.list().await?;
        let mut removed = 0;
        for session in sessions {
            if session.is_sweepable(now, self.idle) {
                self.store.remove(&session.id).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Run the sweep loop until `shutdown` is cancelled. Intended to be spawned onto
    /// its own `tokio::task` at bootstrap.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(self.sweep_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.sweep_once().await {
                        Ok(removed) if removed > 0 => {
                            tracing::info!(removed, "session janitor swept idle agent sessions");
                        }
                        Ok(_) => {}
                        Err(err) => tracing::warn!(error = %err, "session janitor sweep failed"),
                    }
                }
                () = shutdown.cancelled() => {
                    tracing::info!("session janitor shutting down");
                    break;
                }
            }
        }
    }
}
