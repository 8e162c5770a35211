//! Concrete pollers, one per page fact.

use std::sync::Arc;

use async_trait::async_trait;
use kkutu_core::{GameMode, ImplMode, TurnErrorCode, WordCondition};
use tracing::{debug, trace};

use super::{Cadence, PageScraper, PollJob};
use crate::dispatch::{MessageTypes, PushTransport};
use crate::errors::PollError;
use crate::state::NO_TURN;
use crate::synchronizer::Synchronizer;

/// Hint text shown once the game is over; not a word.
const GAME_OVER_TEXT: &str = "게임 끝";

/// What every poller reads from and writes to.
#[derive(Clone)]
pub struct PollDeps {
    /// Page getters.
    pub scraper: Arc<dyn PageScraper>,
    /// Reconciliation core.
    pub sync: Arc<Synchronizer>,
}

impl PollDeps {
    /// Bundle a scraper and synchronizer.
    pub fn new(scraper: Arc<dyn PageScraper>, sync: Arc<Synchronizer>) -> Self {
        Self { scraper, sync }
    }

    async fn read_condition(&self) -> Result<WordCondition, PollError> {
        let mode = self.sync.game_mode();
        let text = self.scraper.presented_word().await?;
        let mission = self.scraper.mission_char().await?;
        let length = self.scraper.word_length().await?;
        Ok(WordCondition::from_presented(
            &text,
            mission.as_deref(),
            mode,
            length,
        ))
    }
}

/// Every poller a session runs.
pub fn standard_pollers(
    deps: &PollDeps,
    transport: Option<Arc<dyn PushTransport>>,
    message_types: MessageTypes,
) -> Vec<Box<dyn PollJob>> {
    vec![
        Box::new(GameProgressPoller::new(deps.clone(), transport, message_types)),
        Box::new(ClassicTurnPoller::new(deps.clone())),
        Box::new(RoundPoller(deps.clone())),
        Box::new(WordErrorPoller(deps.clone())),
        Box::new(WordHintPoller(deps.clone())),
        Box::new(WordHistoryPoller(deps.clone())),
        Box::new(TypingWordPoller(deps.clone())),
        Box::new(GameModePoller(deps.clone())),
    ]
}

// ─────────────────────────────────────────────────────────────────────────────
// Game progress
// ─────────────────────────────────────────────────────────────────────────────

/// Identity and roster. Also keeps page helpers and push filters
/// registered. Runs the same step whether or not a game is on.
pub struct GameProgressPoller {
    deps: PollDeps,
    transport: Option<Arc<dyn PushTransport>>,
    message_types: MessageTypes,
}

impl GameProgressPoller {
    /// Poller registering filters on `transport`, if any.
    pub fn new(
        deps: PollDeps,
        transport: Option<Arc<dyn PushTransport>>,
        message_types: MessageTypes,
    ) -> Self {
        Self {
            deps,
            transport,
            message_types,
        }
    }

    async fn register(&self) -> Result<(), PollError> {
        self.deps.scraper.register_helpers().await?;
        if let Some(transport) = &self.transport {
            transport.register_filters(&self.message_types).await?;
            transport.register_in_game_functions().await?;
        }
        Ok(())
    }

    async fn step(&self) -> Result<(), PollError> {
        if let Err(err) = self.register().await {
            if err.is_fatal() {
                return Err(err);
            }
            debug!(error = %err, "registration failed, retrying next tick");
        }
        if let Some(user_id) = self.deps.scraper.user_id().await? {
            self.deps.sync.notify_game_session(&user_id);
        }
        let sequence = self.deps.scraper.game_sequence().await?;
        self.deps.sync.notify_game_sequence(sequence);
        Ok(())
    }
}

#[async_trait]
impl PollJob for GameProgressPoller {
    fn name(&self) -> &'static str {
        "game_progress"
    }

    fn cadence(&self) -> Cadence {
        Cadence::Primary
    }

    fn is_active(&self) -> bool {
        self.deps.sync.am_i_gaming()
    }

    async fn poll(&mut self) -> Result<(), PollError> {
        self.step().await
    }

    async fn idle(&mut self) -> Result<(), PollError> {
        self.step().await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Classic turns
// ─────────────────────────────────────────────────────────────────────────────

/// Turn ownership and turn seat.
///
/// Both facts are read by this one poller so their writes never race each
/// other. The page reports a seat; it is lifted to an absolute turn index
/// from the session's running counter.
pub struct ClassicTurnPoller {
    deps: PollDeps,
    dom_is_my_turn: bool,
    dom_seat: Option<usize>,
}

impl ClassicTurnPoller {
    /// Poller with no turn seen yet.
    pub fn new(deps: PollDeps) -> Self {
        Self {
            deps,
            dom_is_my_turn: false,
            dom_seat: None,
        }
    }

    fn usable(&self, condition: &WordCondition) -> bool {
        !condition.is_empty() || self.deps.sync.game_mode().is_free()
    }

    async fn check_my_turn(&mut self) -> Result<(), PollError> {
        if !self.deps.scraper.is_my_turn().await? || self.dom_is_my_turn {
            return Ok(());
        }
        let condition = self.deps.read_condition().await?;
        if !self.usable(&condition) {
            return Ok(());
        }
        self.dom_is_my_turn = true;
        self.deps
            .sync
            .notify_classic_turn_start(true, NO_TURN, condition);
        Ok(())
    }

    async fn check_turn_seat(&mut self) -> Result<(), PollError> {
        let sync = &self.deps.sync;
        let relative = sync.relative_turn();
        let synced = usize::try_from(relative).ok();
        if self.dom_seat.is_some() && self.dom_seat != synced {
            trace!(dom_seat = ?self.dom_seat, relative, "turn seat resynchronized");
            self.dom_seat = synced;
            return Ok(());
        }

        let seat = self.deps.scraper.turn_seat().await?;
        if seat == self.dom_seat {
            return Ok(());
        }
        if self.dom_seat.take().is_some() {
            sync.notify_classic_turn_end_ok("");
            self.dom_is_my_turn = false;
        }
        let Some(seat) = seat else {
            return Ok(());
        };

        let condition = self.deps.read_condition().await?;
        if !self.usable(&condition) {
            return Ok(());
        }
        let index = sync.next_turn_index_for_seat(seat);
        sync.notify_classic_turn_start(false, index, condition);
        self.dom_seat = Some(seat);
        Ok(())
    }
}

#[async_trait]
impl PollJob for ClassicTurnPoller {
    fn name(&self) -> &'static str {
        "classic_turn"
    }

    fn cadence(&self) -> Cadence {
        Cadence::Primary
    }

    fn is_active(&self) -> bool {
        let sync = &self.deps.sync;
        sync.am_i_gaming() && sync.game_mode().impl_mode() != ImplMode::TypingBattle
    }

    async fn poll(&mut self) -> Result<(), PollError> {
        self.check_my_turn().await?;
        self.check_turn_seat().await
    }

    async fn idle(&mut self) -> Result<(), PollError> {
        self.dom_is_my_turn = false;
        self.dom_seat = None;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Single-fact pollers
// ─────────────────────────────────────────────────────────────────────────────

/// Round index.
pub struct RoundPoller(pub PollDeps);

#[async_trait]
impl PollJob for RoundPoller {
    fn name(&self) -> &'static str {
        "round"
    }

    fn cadence(&self) -> Cadence {
        Cadence::Primary
    }

    fn is_active(&self) -> bool {
        self.0.sync.am_i_gaming()
    }

    async fn poll(&mut self) -> Result<(), PollError> {
        let round = self.0.scraper.round_index().await?;
        self.0.sync.notify_round_change(round);
        Ok(())
    }
}

/// Rejection banner.
pub struct WordErrorPoller(pub PollDeps);

#[async_trait]
impl PollJob for WordErrorPoller {
    fn name(&self) -> &'static str {
        "word_error"
    }

    fn cadence(&self) -> Cadence {
        Cadence::Intense
    }

    fn is_active(&self) -> bool {
        self.0.sync.am_i_gaming()
    }

    async fn poll(&mut self) -> Result<(), PollError> {
        let Some(text) = self.0.scraper.unsupported_word().await? else {
            return Ok(());
        };
        let code = TurnErrorCode::from_page_text(&text);
        let word = text.split_once(':').map_or(text.as_str(), |(_, w)| w).trim();
        self.0.sync.notify_turn_error(word, code, true);
        Ok(())
    }
}

/// Example word shown after a turn.
pub struct WordHintPoller(pub PollDeps);

#[async_trait]
impl PollJob for WordHintPoller {
    fn name(&self) -> &'static str {
        "word_hint"
    }

    fn cadence(&self) -> Cadence {
        Cadence::Primary
    }

    fn is_active(&self) -> bool {
        self.0.sync.am_i_gaming()
    }

    async fn poll(&mut self) -> Result<(), PollError> {
        match self.0.scraper.example_word().await? {
            Some(hint) if !hint.trim().is_empty() && !hint.starts_with(GAME_OVER_TEXT) => {
                self.0.sync.notify_word_hint(&hint);
            }
            _ => {}
        }
        Ok(())
    }
}

/// History panel.
pub struct WordHistoryPoller(pub PollDeps);

#[async_trait]
impl PollJob for WordHistoryPoller {
    fn name(&self) -> &'static str {
        "word_history"
    }

    fn cadence(&self) -> Cadence {
        Cadence::Intense
    }

    fn is_active(&self) -> bool {
        self.0.sync.am_i_gaming() && !self.0.sync.game_mode().is_free()
    }

    async fn poll(&mut self) -> Result<(), PollError> {
        let words = self.0.scraper.word_histories().await?;
        self.0.sync.notify_word_histories(&words);
        Ok(())
    }
}

/// Typing-battle prompt.
pub struct TypingWordPoller(pub PollDeps);

#[async_trait]
impl PollJob for TypingWordPoller {
    fn name(&self) -> &'static str {
        "typing_word"
    }

    fn cadence(&self) -> Cadence {
        Cadence::Intense
    }

    fn is_active(&self) -> bool {
        self.0.sync.am_i_gaming() && self.0.sync.game_mode() == GameMode::TypingBattle
    }

    async fn poll(&mut self) -> Result<(), PollError> {
        if !self.0.scraper.is_my_turn().await? {
            return Ok(());
        }
        let Some(text) = self.0.scraper.typing_word().await? else {
            return Ok(());
        };
        if let Some(word) = text.split_whitespace().next() {
            self.0.sync.notify_typing_battle_word(word);
        }
        Ok(())
    }
}

/// Room mode header.
pub struct GameModePoller(pub PollDeps);

#[async_trait]
impl PollJob for GameModePoller {
    fn name(&self) -> &'static str {
        "game_mode"
    }

    fn cadence(&self) -> Cadence {
        Cadence::Slow
    }

    fn is_active(&self) -> bool {
        true
    }

    async fn poll(&mut self) -> Result<(), PollError> {
        let mode = self.0.scraper.game_mode().await?;
        if mode != GameMode::None {
            self.0.sync.notify_game_mode(mode, true);
        }
        Ok(())
    }
}
