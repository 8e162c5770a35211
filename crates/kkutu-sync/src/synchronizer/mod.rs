//! Reconciliation core.
//!
//! Every fact from either channel enters through a `notify_*` method. The
//! method checks the fact against its dedup cache, updates
//! [`SessionState`] under the session lock, and publishes a
//! [`LifecycleEvent`] only on a genuine transition.
//!
//! Locking: the session lock is reentrant and is held while events are
//! published, so a handler observes the state exactly as the transition
//! left it and may call back into the synchronizer. Dedup checks run under
//! the session lock, so a cache and the state it guards always move
//! together. Cache locks are only ever taken after (never around) the
//! session lock.

mod classic;
mod hunmin;
mod typing;

use std::cell::RefCell;
use std::sync::Arc;
use std::time::Duration;

use kkutu_core::{
    BaseEvent, GameMode, LifecycleEvent, PlayerId, SyncSessionId, TurnErrorCode, WordCondition,
};
use parking_lot::ReentrantMutex;
use tracing::{debug, trace, warn};

use crate::bus::LifecycleEventBus;
use crate::cache::{CacheSnapshot, SyncCaches};
use crate::context::SyncContext;
use crate::state::SessionState;

/// Sole writer of [`SessionState`].
pub struct Synchronizer {
    session_id: SyncSessionId,
    session: ReentrantMutex<RefCell<SessionState>>,
    caches: SyncCaches,
    bus: Arc<LifecycleEventBus>,
    typing_word_repeat: Duration,
}

impl Synchronizer {
    /// Synchronizer publishing to the context's bus.
    pub fn new(ctx: &SyncContext) -> Self {
        Self {
            session_id: SyncSessionId::generate(),
            session: ReentrantMutex::new(RefCell::new(SessionState::default())),
            caches: SyncCaches::new(),
            bus: Arc::clone(&ctx.bus),
            typing_word_repeat: ctx.settings.polling.typing_word_repeat(),
        }
    }

    /// Id stamped on every event this synchronizer publishes.
    pub fn session_id(&self) -> &SyncSessionId {
        &self.session_id
    }

    /// The bus events are published on.
    pub fn bus(&self) -> &Arc<LifecycleEventBus> {
        &self.bus
    }

    // ── Reads ───────────────────────────────────────────────────────

    /// Copy of the current state.
    pub fn snapshot(&self) -> SessionState {
        self.read(Clone::clone)
    }

    /// Copy of the dedup caches.
    pub fn cache_snapshot(&self) -> CacheSnapshot {
        self.caches.snapshot()
    }

    /// I am seated in the running game.
    pub fn am_i_gaming(&self) -> bool {
        self.read(SessionState::am_i_gaming)
    }

    /// Current rule variant.
    pub fn game_mode(&self) -> GameMode {
        self.read(SessionState::game_mode)
    }

    /// The current turn is mine.
    pub fn is_my_turn(&self) -> bool {
        self.read(SessionState::is_my_turn)
    }

    /// Seat acting on the current turn, `-1` if none.
    pub fn relative_turn(&self) -> i64 {
        self.read(SessionState::relative_turn)
    }

    /// Absolute index for the next turn of `seat`.
    pub fn next_turn_index_for_seat(&self, seat: usize) -> i64 {
        self.read(|s| s.next_turn_index_for_seat(seat))
    }

    /// Whether an answer computed for `condition` still applies.
    ///
    /// Pre-search answers target the next turn and are always considered
    /// current.
    pub fn is_condition_current(&self, condition: &WordCondition, pre_search: bool) -> bool {
        pre_search || self.read(|s| condition.is_similar(s.word_condition()))
    }

    /// Publish [`LifecycleEvent::PathRescanRequested`] when `condition` is
    /// stale and a live condition exists. Returns whether a rescan was
    /// requested.
    pub fn request_rescan_if_expired(&self, condition: &WordCondition, pre_search: bool) -> bool {
        self.locked(|state, out| {
            let current = state.word_condition();
            if pre_search || current.is_empty() || condition.is_similar(current) {
                return false;
            }
            warn!(old = %condition, new = %current, "condition expired, requesting rescan");
            out.push(LifecycleEvent::PathRescanRequested {
                base: self.base(),
                condition: current.clone(),
            });
            true
        })
    }

    // ── Identity, roster, mode ──────────────────────────────────────

    /// Report my identity. A new non-blank id replaces the whole session
    /// and clears every cache.
    pub fn notify_game_session(&self, user_id: &str) {
        let user_id = user_id.trim();
        if user_id.is_empty() {
            return;
        }
        self.locked(|state, out| {
            if state.my_user_id().as_str() == user_id {
                return;
            }
            *state = SessionState::new(PlayerId::from(user_id));
            self.caches.clear_all();
            debug!(user_id, "game session changed");
            out.push(LifecycleEvent::SessionChanged {
                base: self.base(),
                user_id: PlayerId::from(user_id),
            });
        });
    }

    /// Report the running game's turn order (empty when no game).
    pub fn notify_game_sequence(&self, sequence: Vec<PlayerId>) {
        self.locked(|state, out| {
            if !self.caches.roster.observe(sequence.clone()) {
                return;
            }
            let was_gaming = state.am_i_gaming();
            let is_gaming = state.set_game_sequence(sequence);
            match (was_gaming, is_gaming) {
                (false, true) => {
                    debug!(players = state.game_sequence().len(), "game started");
                    out.push(LifecycleEvent::GameStarted {
                        base: self.base(),
                        game_sequence: state.game_sequence().to_vec(),
                    });
                }
                (true, false) => {
                    self.caches.clear_game_scoped();
                    debug!("game ended");
                    out.push(LifecycleEvent::GameEnded { base: self.base() });
                }
                _ => trace!(is_gaming, "roster updated"),
            }
        });
    }

    /// Report the room's mode.
    pub fn notify_game_mode(&self, mode: GameMode, by_dom: bool) {
        self.locked(|state, out| {
            if !state.set_game_mode(mode) {
                return;
            }
            debug!(%mode, by_dom, "game mode changed");
            out.push(LifecycleEvent::GameModeChanged {
                base: self.base(),
                mode,
            });
        });
    }

    // ── Round ───────────────────────────────────────────────────────

    /// Report the round index. Values `<= 0` mean "no round yet": they are
    /// cached but never published.
    pub fn notify_round_change(&self, round: i32) {
        self.locked(|state, out| {
            if !self.caches.round.observe(round) {
                return;
            }
            if round <= 0 {
                trace!(round, "no round yet");
                return;
            }
            self.caches.clear_round_scoped();
            state.reset_turn();
            debug!(round, "round changed");
            out.push(LifecycleEvent::RoundChanged {
                base: self.base(),
                round,
            });
        });
    }

    // ── Words ───────────────────────────────────────────────────────

    /// Report an example word revealed after a turn.
    pub fn notify_word_hint(&self, hint: &str) {
        let hint = hint.trim();
        if hint.is_empty() {
            return;
        }
        self.locked(|_, out| {
            if !self.caches.hint.observe_ignore_case(hint) {
                return;
            }
            debug!(hint, "hint word presented");
            out.push(LifecycleEvent::HintWordPresented {
                base: self.base(),
                word: hint.to_owned(),
            });
        });
    }

    /// Report a rejected word.
    pub fn notify_turn_error(&self, word: &str, code: TurnErrorCode, by_dom: bool) {
        if word.trim().is_empty() || word.to_lowercase().contains("t.t") {
            return;
        }
        self.locked(|state, out| {
            if !self.caches.turn_error.observe_ignore_case(word) {
                return;
            }
            debug!(word, ?code, by_dom, "word rejected");
            out.push(LifecycleEvent::UnsupportedWordEntered {
                base: self.base(),
                word: word.to_owned(),
                code,
                is_existing_word: code.is_existing_word(),
                is_end_word: code.is_end_word(),
                is_my_turn: state.is_my_turn(),
            });
        });
    }

    /// Report the page's full word history. Ignored in free modes.
    pub fn notify_word_histories(&self, words: &[String]) {
        self.locked(|state, out| {
            if state.game_mode().is_free() {
                return;
            }
            for word in self.caches.word_history.observe_many(words) {
                trace!(word, "history word discovered");
                out.push(LifecycleEvent::WordHistoryDiscovered {
                    base: self.base(),
                    word,
                });
            }
        });
    }

    /// Report one accepted word from the push channel.
    pub fn notify_word_history(&self, word: &str) {
        let word = word.trim();
        if word.is_empty() {
            return;
        }
        self.locked(|_, out| {
            if !self.caches.word_history.observe_one(word) {
                return;
            }
            out.push(LifecycleEvent::WordHistoryDiscovered {
                base: self.base(),
                word: word.to_owned(),
            });
        });
    }

    // ── Internals ───────────────────────────────────────────────────

    fn base(&self) -> BaseEvent {
        BaseEvent::now(self.session_id.as_str())
    }

    fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        let guard = self.session.lock();
        let state = guard.borrow();
        f(&state)
    }

    /// Mutate under the session lock, then publish the queued events while
    /// still holding it.
    fn locked<R>(&self, mutate: impl FnOnce(&mut SessionState, &mut Vec<LifecycleEvent>) -> R) -> R {
        let guard = self.session.lock();
        let mut outbox = Vec::new();
        let result = {
            let mut state = guard.borrow_mut();
            mutate(&mut state, &mut outbox)
        };
        for event in outbox {
            let _ = self.bus.publish(event);
        }
        drop(guard);
        result
    }
}

impl std::fmt::Debug for Synchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synchronizer")
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
