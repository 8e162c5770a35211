//! Polling channel.
//!
//! Each fact the page can report has its own [`PollJob`], run in its own
//! task by [`run_poller`]. A job has an activation predicate and two
//! intervals: while the predicate holds it reads its fact and waits the
//! active interval, otherwise it runs its idle step and waits the idle
//! interval.

mod jobs;
mod scraper;

use std::time::Duration;

use async_trait::async_trait;
use kkutu_settings::PollingSettings;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::errors::PollError;

pub use jobs::{
    ClassicTurnPoller, GameModePoller, GameProgressPoller, PollDeps, RoundPoller,
    TypingWordPoller, WordErrorPoller, WordHintPoller, WordHistoryPoller, standard_pollers,
};
pub use scraper::PageScraper;

/// How often a job runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cadence {
    /// Ordinary facts.
    Primary,
    /// Fast-changing facts.
    Intense,
    /// Rarely changing facts; idle at the same rate.
    Slow,
}

/// Active and idle intervals of one poller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollSchedule {
    /// Wait after an active iteration.
    pub active: Duration,
    /// Wait after an idle iteration.
    pub idle: Duration,
}

impl PollSchedule {
    /// Intervals for `cadence` under `settings`.
    pub fn for_cadence(cadence: Cadence, settings: &PollingSettings) -> Self {
        match cadence {
            Cadence::Primary => Self {
                active: settings.primary(),
                idle: settings.idle(),
            },
            Cadence::Intense => Self {
                active: settings.intense(),
                idle: settings.idle(),
            },
            Cadence::Slow => Self {
                active: settings.slow(),
                idle: settings.slow(),
            },
        }
    }
}

/// One polled fact.
#[async_trait]
pub trait PollJob: Send {
    /// Name used in logs and metrics labels.
    fn name(&self) -> &'static str;

    /// Interval class.
    fn cadence(&self) -> Cadence;

    /// Whether the fact is worth reading right now.
    fn is_active(&self) -> bool;

    /// Read the fact and forward it.
    async fn poll(&mut self) -> Result<(), PollError>;

    /// Run while inactive.
    async fn idle(&mut self) -> Result<(), PollError> {
        Ok(())
    }
}

/// Why a poller loop returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollerExit {
    /// The session token was cancelled.
    Cancelled,
    /// A fatal error stopped the loop. It is not restarted.
    Faulted,
}

/// Drive `job` until `cancel` fires or the job faults.
///
/// Cancellation is observed between iterations and during the wait; an
/// in-flight read is never interrupted.
pub async fn run_poller(
    mut job: Box<dyn PollJob>,
    schedule: PollSchedule,
    cancel: CancellationToken,
) -> PollerExit {
    let name = job.name();
    debug!(poller = name, ?schedule, "poller started");

    loop {
        if cancel.is_cancelled() {
            break;
        }

        let active = job.is_active();
        let result = if active {
            job.poll().await
        } else {
            job.idle().await
        };

        if let Err(err) = result {
            if err.is_fatal() {
                error!(poller = name, error = %err, "poller faulted");
                metrics::counter!("poller_faults_total", "poller" => name).increment(1);
                return PollerExit::Faulted;
            }
            match err {
                PollError::Sync(err) => warn!(poller = name, error = %err, "ordering fault"),
                err => debug!(poller = name, error = %err, "fact discarded"),
            }
        }

        let delay = if active { schedule.active } else { schedule.idle };
        tokio::select! {
            () = tokio::time::sleep(delay) => {}
            () = cancel.cancelled() => break,
        }
    }

    debug!(poller = name, "poller cancelled");
    PollerExit::Cancelled
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
