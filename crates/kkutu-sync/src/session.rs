//! Session runner.
//!
//! A [`GameSession`] owns one cancellation token for everything it spawns:
//! every poller and, when a push transport is attached, the dispatcher.
//! Stopping cancels the token and waits (bounded) for the tasks to
//! notice. Tasks are never aborted, so a read hung inside the scraper is
//! left to finish on its own.

use std::sync::Arc;

use futures::future::join_all;
use kkutu_core::ScrapeError;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::bus::LifecycleEventBus;
use crate::context::SyncContext;
use crate::dispatch::{EventChannel, JsonPushParser, MessageTypes, PushParser, PushTransport};
use crate::polling::{PageScraper, PollDeps, PollSchedule, run_poller, standard_pollers};
use crate::synchronizer::Synchronizer;

struct Running {
    cancel: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

/// Pollers and dispatcher for one page.
pub struct GameSession {
    ctx: SyncContext,
    sync: Arc<Synchronizer>,
    scraper: Arc<dyn PageScraper>,
    transport: Option<Arc<dyn PushTransport>>,
    parser: Arc<dyn PushParser>,
    message_types: MessageTypes,
    running: Mutex<Option<Running>>,
}

impl GameSession {
    /// Session polling `scraper`. Push messages are not consumed until a
    /// transport is attached with [`GameSession::with_transport`].
    pub fn new(ctx: SyncContext, scraper: Arc<dyn PageScraper>) -> Self {
        let sync = Arc::new(Synchronizer::new(&ctx));
        Self {
            ctx,
            sync,
            scraper,
            transport: None,
            parser: Arc::new(JsonPushParser),
            message_types: MessageTypes::default(),
            running: Mutex::new(None),
        }
    }

    /// Consume push messages from `transport`.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn PushTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Decode payloads with `parser` instead of [`JsonPushParser`].
    #[must_use]
    pub fn with_parser(mut self, parser: Arc<dyn PushParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Override the wire names of the consumed message types.
    #[must_use]
    pub fn with_message_types(mut self, message_types: MessageTypes) -> Self {
        self.message_types = message_types;
        self
    }

    /// The reconciliation core.
    pub fn synchronizer(&self) -> &Arc<Synchronizer> {
        &self.sync
    }

    /// The event bus.
    pub fn bus(&self) -> &Arc<LifecycleEventBus> {
        &self.ctx.bus
    }

    /// Tasks are running.
    pub fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }

    /// Spawn every poller, plus the dispatcher when enabled and a transport
    /// is attached. Returns `false` if already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> bool {
        let mut running = self.running.lock();
        if running.is_some() {
            return false;
        }

        let cancel = CancellationToken::new();
        let settings = &self.ctx.settings;
        let deps = PollDeps::new(Arc::clone(&self.scraper), Arc::clone(&self.sync));
        let mut handles = Vec::new();

        for job in standard_pollers(&deps, self.transport.clone(), self.message_types.clone()) {
            let schedule = PollSchedule::for_cadence(job.cadence(), &settings.polling);
            let cancel = cancel.clone();
            handles.push(tokio::spawn(async move {
                let name = job.name();
                let exit = run_poller(job, schedule, cancel).await;
                debug!(poller = name, ?exit, "poller exited");
            }));
        }

        match &self.transport {
            Some(transport) if settings.dispatch.enabled => {
                let channel = Arc::new(EventChannel::new(
                    Arc::clone(&self.sync),
                    Arc::clone(&self.parser),
                    &self.message_types,
                ));
                handles.push(tokio::spawn(channel.run(transport.subscribe(), cancel.clone())));
            }
            Some(_) => debug!("push dispatch disabled"),
            None => {}
        }

        info!(tasks = handles.len(), session_id = %self.sync.session_id(), "game session started");
        *running = Some(Running { cancel, handles });
        true
    }

    /// Cancel every task and wait up to `dispatch.shutdownTimeoutMs` for
    /// them to exit. No-op when not running.
    pub async fn stop(&self) {
        let running = self.running.lock().take();
        let Some(Running { cancel, handles }) = running else {
            return;
        };
        cancel.cancel();

        let timeout = self.ctx.settings.dispatch.shutdown_timeout();
        info!(tasks = handles.len(), ?timeout, "stopping game session");
        if tokio::time::timeout(timeout, join_all(handles)).await.is_err() {
            warn!("shutdown timed out after {timeout:?}, some tasks may still be running");
        }
    }

    /// Time left to answer, in milliseconds: the smaller of the turn and
    /// round clocks.
    pub async fn turn_time_millis(&self) -> Result<Option<u64>, ScrapeError> {
        let turn = self.scraper.turn_time().await?;
        let round = self.scraper.round_time().await?;
        Ok(remaining_millis(turn, round))
    }
}

impl Drop for GameSession {
    fn drop(&mut self) {
        if let Some(running) = self.running.get_mut().take() {
            running.cancel.cancel();
        }
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("session_id", self.sync.session_id())
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

fn remaining_millis(turn_secs: Option<f64>, round_secs: Option<f64>) -> Option<u64> {
    let secs = match (turn_secs, round_secs) {
        (Some(turn), Some(round)) => turn.min(round),
        (Some(secs), None) | (None, Some(secs)) => secs,
        (None, None) => return None,
    };
    Some((secs.max(0.0) * 1000.0).round() as u64)
}
