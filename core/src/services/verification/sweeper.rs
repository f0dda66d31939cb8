//! Background sweeper that removes expired verification codes
//!
//! Expired codes are already rejected on lookup. The sweeper bounds memory
//! held by codes nobody comes back for.

use std::sync::Arc;
use std::time::Duration;

use bk_shared::config::VerificationConfig;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::service::VerificationCodeManager;
use super::traits::{IdentityDelegate, NotificationSender};
use super::types::SweepResult;

/// Configuration for the verification sweeper
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// How often to sweep (in seconds)
    pub interval_seconds: u64,
    /// Whether to run the sweeper at all
    pub enabled: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 60,
            enabled: true,
        }
    }
}

impl From<&VerificationConfig> for SweepConfig {
    fn from(config: &VerificationConfig) -> Self {
        Self {
            interval_seconds: config.sweep_interval_seconds.max(1),
            enabled: config.sweep_enabled,
        }
    }
}

/// Periodically evicts expired entries from a verification code manager
pub struct VerificationSweeper<I: ?Sized, N: ?Sized> {
    manager: Arc<VerificationCodeManager<I, N>>,
    config: SweepConfig,
}

impl<I, N> VerificationSweeper<I, N>
where
    I: IdentityDelegate + ?Sized + 'static,
    N: NotificationSender + ?Sized + 'static,
{
    /// Create a new sweeper for a manager
    pub fn new(manager: Arc<VerificationCodeManager<I, N>>, config: SweepConfig) -> Self {
        Self { manager, config }
    }

    /// Run a single sweep cycle
    ///
    /// Does nothing when the sweeper is disabled.
    pub async fn run_sweep(&self) -> SweepResult {
        if !self.config.enabled {
            return SweepResult::default();
        }

        let expired_removed = self.manager.sweep_expired().await;
        let remaining = self.manager.outstanding_codes().await;

        if expired_removed > 0 {
            info!(
                expired_removed,
                remaining,
                event = "verification_sweep_completed",
                "Removed expired verification codes"
            );
        } else {
            debug!(remaining, event = "verification_sweep_completed", "Nothing to sweep");
        }

        SweepResult {
            expired_removed,
            remaining,
        }
    }

    /// Start the sweeper as a background task
    ///
    /// The returned handle stops the task. When the sweeper is disabled no
    /// task is spawned and the handle is inert.
    pub fn start(self: Arc<Self>) -> SweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        if !self.config.enabled {
            warn!("Verification sweeper is disabled");
            return SweeperHandle {
                shutdown: shutdown_tx,
                task: None,
            };
        }

        let period = Duration::from_secs(self.config.interval_seconds.max(1));

        let task = tokio::spawn(async move {
            info!(
                interval_seconds = self.config.interval_seconds,
                event = "verification_sweeper_started",
                "Verification sweeper started"
            );

            let mut interval_timer = tokio::time::interval(period);
            // The first tick completes immediately
            interval_timer.tick().await;

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        self.run_sweep().await;
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!(event = "verification_sweeper_stopped", "Verification sweeper stopped");
        });

        SweeperHandle {
            shutdown: shutdown_tx,
            task: Some(task),
        }
    }
}

/// Handle to a running sweeper task
pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// Whether a background task was spawned
    pub fn is_running(&self) -> bool {
        self.task
            .as_ref()
            .map(|task| !task.is_finished())
            .unwrap_or(false)
    }

    /// Signal the sweeper to stop and wait for it to finish
    pub async fn shutdown(mut self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Verification sweeper task ended abnormally");
            }
        }
    }
}
