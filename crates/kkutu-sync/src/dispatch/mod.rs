//! Push-message dispatch.
//!
//! Messages are matched by type against the table for the current mode
//! family first, then the base table. Matched messages are decoded by the
//! [`PushParser`] and forwarded to the [`Synchronizer`]; unmatched ones are
//! dropped. Errors are logged per message and never reach the loop.

mod parser;
mod transport;

use std::collections::HashMap;
use std::sync::Arc;

use kkutu_core::{GameMode, ImplMode};
use metrics::counter;
use serde_json::Value;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::errors::DispatchError;
use crate::synchronizer::Synchronizer;

pub use parser::{JsonPushParser, PushParser};
pub use transport::{MessageTypes, PushMessage, PushTransport};

/// Handler a message type resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    /// Session greeting.
    Welcome,
    /// Room snapshot.
    Room,
    /// Classic-shaped turn start.
    ClassicTurnStart,
    /// Classic-shaped turn end (also Hunmin).
    ClassicTurnEnd,
    /// Classic-shaped turn error (also Hunmin).
    ClassicTurnError,
    /// Typing-battle round ready.
    TypingRoundReady,
    /// Typing-battle turn start.
    TypingTurnStart,
    /// Typing-battle turn end.
    TypingTurnEnd,
    /// Hunmin round ready.
    HunminRoundReady,
    /// Hunmin turn start.
    HunminTurnStart,
}

impl Route {
    /// Stable name used in logs and metrics labels.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Welcome => "welcome",
            Self::Room => "room",
            Self::ClassicTurnStart => "classic_turn_start",
            Self::ClassicTurnEnd => "classic_turn_end",
            Self::ClassicTurnError => "classic_turn_error",
            Self::TypingRoundReady => "typing_round_ready",
            Self::TypingTurnStart => "typing_turn_start",
            Self::TypingTurnEnd => "typing_turn_end",
            Self::HunminRoundReady => "hunmin_round_ready",
            Self::HunminTurnStart => "hunmin_turn_start",
        }
    }
}

/// Base table plus one table per mode family.
#[derive(Clone, Debug)]
pub struct RoutingTable {
    base: HashMap<String, Route>,
    families: HashMap<ImplMode, HashMap<String, Route>>,
}

impl RoutingTable {
    /// Tables keyed by the wire names in `types`.
    pub fn new(types: &MessageTypes) -> Self {
        let base = table(&[
            (types.welcome.as_str(), Route::Welcome),
            (types.room.as_str(), Route::Room),
        ]);
        let families = HashMap::from([
            (
                ImplMode::Classic,
                table(&[
                    (types.turn_start.as_str(), Route::ClassicTurnStart),
                    (types.turn_end.as_str(), Route::ClassicTurnEnd),
                    (types.turn_error.as_str(), Route::ClassicTurnError),
                ]),
            ),
            (
                ImplMode::TypingBattle,
                table(&[
                    (types.round_ready.as_str(), Route::TypingRoundReady),
                    (types.turn_start.as_str(), Route::TypingTurnStart),
                    (types.turn_end.as_str(), Route::TypingTurnEnd),
                ]),
            ),
            (
                ImplMode::Hunmin,
                table(&[
                    (types.round_ready.as_str(), Route::HunminRoundReady),
                    (types.turn_start.as_str(), Route::HunminTurnStart),
                    (types.turn_end.as_str(), Route::ClassicTurnEnd),
                    (types.turn_error.as_str(), Route::ClassicTurnError),
                ]),
            ),
        ]);

        Self { base, families }
    }

    /// Route for `kind` while playing a `family` mode.
    pub fn resolve(&self, family: ImplMode, kind: &str) -> Option<Route> {
        self.families
            .get(&family)
            .and_then(|table| table.get(kind))
            .or_else(|| self.base.get(kind))
            .copied()
    }
}

fn table(entries: &[(&str, Route)]) -> HashMap<String, Route> {
    entries
        .iter()
        .map(|(name, route)| ((*name).to_owned(), *route))
        .collect()
}

/// Routes push messages into the synchronizer.
pub struct EventChannel {
    sync: Arc<Synchronizer>,
    parser: Arc<dyn PushParser>,
    routes: RoutingTable,
}

impl EventChannel {
    /// Channel using `types` as wire names.
    pub fn new(
        sync: Arc<Synchronizer>,
        parser: Arc<dyn PushParser>,
        types: &MessageTypes,
    ) -> Self {
        Self {
            sync,
            parser,
            routes: RoutingTable::new(types),
        }
    }

    /// Route `kind` resolves to in the current mode.
    pub fn route(&self, kind: &str) -> Option<Route> {
        self.routes.resolve(self.sync.game_mode().impl_mode(), kind)
    }

    /// Handle one message inline. Returns the route taken, or `None` if the
    /// type is not routed in the current mode.
    pub async fn process(&self, message: &PushMessage) -> Result<Option<Route>, DispatchError> {
        trace!(kind = %message.kind, "push message");
        let Some(route) = self.route(&message.kind) else {
            debug!(kind = %message.kind, "push message not routed in this mode");
            counter!("push_messages_dropped_total", "reason" => "unrouted").increment(1);
            return Ok(None);
        };
        counter!("push_messages_total", "route" => route.as_str()).increment(1);
        self.handle(route, &message.payload).await?;
        Ok(Some(route))
    }

    /// Handle one message on its own task; failures are logged there.
    pub fn dispatch(self: &Arc<Self>, message: PushMessage) -> JoinHandle<()> {
        let channel = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(err) = channel.process(&message).await {
                report(&message.kind, &err);
            }
        })
    }

    /// Dispatch everything received on `rx` until cancelled or closed.
    pub async fn run(
        self: Arc<Self>,
        mut rx: broadcast::Receiver<PushMessage>,
        cancel: CancellationToken,
    ) {
        debug!("event channel started");
        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                received = rx.recv() => match received {
                    Ok(message) => {
                        let _ = self.dispatch(message);
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "push receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
        debug!("event channel stopped");
    }

    async fn handle(&self, route: Route, payload: &Value) -> Result<(), DispatchError> {
        let sync = &self.sync;
        match route {
            Route::Welcome => {
                if let Some(user_id) = self.parser.welcome(payload).await?.user_id {
                    sync.notify_game_session(user_id.as_str());
                }
            }
            Route::Room => {
                let room = self.parser.room(payload).await?;
                if room.gaming {
                    sync.notify_game_sequence(room.game_sequence);
                }
                if room.mode != GameMode::None {
                    sync.notify_game_mode(room.mode, false);
                }
            }
            Route::ClassicTurnStart => {
                let start = self.parser.classic_turn_start(payload).await?;
                sync.notify_classic_turn_start(false, start.turn, start.condition);
            }
            Route::ClassicTurnEnd => {
                let end = self.parser.classic_turn_end(payload).await?;
                if end.ok {
                    let value = end.value.unwrap_or_default();
                    sync.notify_classic_turn_end_ok(&value);
                    sync.notify_word_history(&value);
                }
                if let Some(hint) = end.hint.filter(|h| !h.trim().is_empty()) {
                    sync.notify_word_hint(&hint);
                }
            }
            Route::ClassicTurnError => {
                let error = self.parser.classic_turn_error(payload).await?;
                if let Some(value) = error.value.filter(|v| !v.trim().is_empty()) {
                    sync.notify_turn_error(&value, error.code, false);
                }
            }
            Route::TypingRoundReady => {
                let ready = self.parser.typing_round_ready(payload).await?;
                sync.notify_typing_battle_round_change(ready.round, ready.words);
            }
            Route::TypingTurnStart => {
                let _ = self.parser.typing_turn_start(payload).await?;
                sync.notify_typing_battle_turn_start()?;
            }
            Route::TypingTurnEnd => {
                let end = self.parser.typing_turn_end(payload).await?;
                sync.notify_typing_battle_turn_end(end.ok);
            }
            Route::HunminRoundReady => {
                let ready = self.parser.hunmin_round_ready(payload).await?;
                sync.notify_hunmin_round_ready(ready.round, ready.condition);
            }
            Route::HunminTurnStart => {
                let start = self.parser.hunmin_turn_start(payload).await?;
                sync.notify_hunmin_turn_start(start.turn, &start.mission_char)?;
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventChannel")
            .field("routes", &self.routes)
            .finish_non_exhaustive()
    }
}

fn report(kind: &str, err: &DispatchError) {
    match err {
        DispatchError::Sync(err) => {
            warn!(kind, error = %err, "ordering fault");
            counter!("push_ordering_faults_total", "type" => kind.to_owned()).increment(1);
        }
        DispatchError::Parse(err) => warn!(kind, error = %err, "push message discarded"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
