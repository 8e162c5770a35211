//! Per-session game state.
//!
//! [`SessionState`] is plain data with invariant-preserving mutators. The
//! [`Synchronizer`](crate::Synchronizer) is its only writer and always holds
//! the session lock while mutating it.
//!
//! Invariants:
//! - `game_sequence` is empty exactly when I am not gaming
//! - a turn index other than `-1` implies I am gaming
//! - relative turn is `turn_index mod len(game_sequence)`

use kkutu_core::{GameMode, PlayerId, WordCondition};
use serde::Serialize;

/// Turn index meaning "no turn yet".
pub const NO_TURN: i64 = -1;

/// Identity, roster, turn, round, mode and condition of one joined game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    my_user_id: PlayerId,
    game_mode: GameMode,
    game_sequence: Vec<PlayerId>,
    turn_index: i64,
    is_turn_in_progress: bool,
    word_condition: WordCondition,
    previous_turn_mission: String,
    round_condition: Option<WordCondition>,
    typing_word_index: usize,
    typing_word_list: Vec<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(PlayerId::default())
    }
}

impl SessionState {
    /// Fresh state for `my_user_id`; not gaming, no turn.
    pub fn new(my_user_id: PlayerId) -> Self {
        Self {
            my_user_id,
            game_mode: GameMode::None,
            game_sequence: Vec::new(),
            turn_index: NO_TURN,
            is_turn_in_progress: false,
            word_condition: WordCondition::empty(),
            previous_turn_mission: String::new(),
            round_condition: None,
            typing_word_index: 0,
            typing_word_list: Vec::new(),
        }
    }

    // ── Accessors ───────────────────────────────────────────────────

    /// My player id; empty before the first identity report.
    pub fn my_user_id(&self) -> &PlayerId {
        &self.my_user_id
    }

    /// No identity known yet.
    pub fn is_anonymous(&self) -> bool {
        self.my_user_id.is_empty()
    }

    /// I am seated in the running game.
    pub fn am_i_gaming(&self) -> bool {
        !self.game_sequence.is_empty()
    }

    /// Current rule variant.
    pub fn game_mode(&self) -> GameMode {
        self.game_mode
    }

    /// Turn order; empty when not gaming.
    pub fn game_sequence(&self) -> &[PlayerId] {
        &self.game_sequence
    }

    /// Absolute turn index, or [`NO_TURN`].
    pub fn turn_index(&self) -> i64 {
        self.turn_index
    }

    /// A turn has started and not ended.
    pub fn is_turn_in_progress(&self) -> bool {
        self.is_turn_in_progress
    }

    /// Condition of the latest turn.
    pub fn word_condition(&self) -> &WordCondition {
        &self.word_condition
    }

    /// Mission character of the player seated before me.
    pub fn previous_turn_mission(&self) -> &str {
        &self.previous_turn_mission
    }

    /// Hunmin: the round's base condition.
    pub fn round_condition(&self) -> Option<&WordCondition> {
        self.round_condition.as_ref()
    }

    /// Typing battle: position in the word list.
    pub fn typing_word_index(&self) -> usize {
        self.typing_word_index
    }

    /// Typing battle: the round's words.
    pub fn typing_word_list(&self) -> &[String] {
        &self.typing_word_list
    }

    // ── Turn arithmetic ─────────────────────────────────────────────

    /// My seat in the turn order.
    pub fn my_ordinal(&self) -> Option<usize> {
        self.game_sequence
            .iter()
            .position(|p| *p == self.my_user_id)
    }

    /// Seat acting on turn `index`.
    pub fn seat_of(&self, index: i64) -> Option<usize> {
        let len = self.game_sequence.len() as i64;
        (len > 0 && index >= 0).then(|| index.rem_euclid(len) as usize)
    }

    /// Seat acting on the current turn, or `-1` without a sequence or turn.
    pub fn relative_turn(&self) -> i64 {
        self.seat_of(self.turn_index).map_or(NO_TURN, |seat| seat as i64)
    }

    /// The current turn is mine.
    pub fn is_my_turn(&self) -> bool {
        self.my_ordinal()
            .is_some_and(|ordinal| self.relative_turn() == ordinal as i64)
    }

    /// Seat of the player acting immediately before me.
    pub fn previous_player_seat(&self) -> Option<usize> {
        let len = self.game_sequence.len();
        self.my_ordinal().map(|ordinal| (ordinal + len - 1) % len)
    }

    /// Lift a seat to an absolute turn index.
    ///
    /// The result is the smallest index at or after the current one whose
    /// seat is `seat`. The current index itself only qualifies while its
    /// turn is still in progress. Without a current turn the seat is
    /// returned as-is.
    pub fn next_turn_index_for_seat(&self, seat: usize) -> i64 {
        let len = self.game_sequence.len();
        if len == 0 {
            return NO_TURN;
        }
        let seat = seat % len;
        let Some(current_seat) = self.seat_of(self.turn_index) else {
            return seat as i64;
        };
        let delta = (seat + len - current_seat) % len;
        if delta == 0 && !self.is_turn_in_progress {
            self.turn_index + len as i64
        } else {
            self.turn_index + delta as i64
        }
    }

    // ── Mutators ────────────────────────────────────────────────────

    /// Replace the roster. A roster that does not include me is stored as
    /// empty, and leaving the game clears every turn-scoped field.
    ///
    /// Returns whether I am gaming afterwards.
    pub fn set_game_sequence(&mut self, sequence: Vec<PlayerId>) -> bool {
        if sequence.contains(&self.my_user_id) && !self.is_anonymous() {
            self.game_sequence = sequence;
        } else {
            self.game_sequence.clear();
            self.turn_index = NO_TURN;
            self.is_turn_in_progress = false;
            self.word_condition = WordCondition::empty();
            self.previous_turn_mission.clear();
            self.round_condition = None;
            self.typing_word_index = 0;
            self.typing_word_list.clear();
        }
        self.am_i_gaming()
    }

    /// Set the mode. Returns whether it changed.
    pub fn set_game_mode(&mut self, mode: GameMode) -> bool {
        let changed = self.game_mode != mode;
        self.game_mode = mode;
        changed
    }

    /// Begin turn `index`. Refused (returns `false`) when not gaming or
    /// when `index` is negative.
    pub fn begin_turn(&mut self, index: i64, condition: WordCondition) -> bool {
        if !self.am_i_gaming() || index < 0 {
            return false;
        }
        self.turn_index = index;
        self.is_turn_in_progress = true;
        self.word_condition = condition;
        true
    }

    /// End the current turn. Returns `false` if none was in progress.
    pub fn end_turn(&mut self) -> bool {
        let was = self.is_turn_in_progress;
        self.is_turn_in_progress = false;
        was
    }

    /// Round boundary: forget the turn counter.
    pub fn reset_turn(&mut self) {
        self.turn_index = NO_TURN;
        self.is_turn_in_progress = false;
    }

    /// Remember the preceding player's mission character.
    pub fn set_previous_turn_mission(&mut self, mission: impl Into<String>) {
        self.previous_turn_mission = mission.into();
    }

    /// Hunmin: remember the round's base condition.
    pub fn set_round_condition(&mut self, condition: WordCondition) {
        self.round_condition = Some(condition);
    }

    /// Typing battle: new word list, back to the first word.
    pub fn set_typing_words(&mut self, words: Vec<String>) {
        self.typing_word_list = words;
        self.typing_word_index = 0;
    }

    /// Typing battle: rewind to the first word and return it.
    pub fn rewind_typing_word(&mut self) -> Option<&str> {
        self.typing_word_index = 0;
        self.typing_word_list.first().map(String::as_str)
    }

    /// Typing battle: step to the next word (wrapping) and return it.
    pub fn advance_typing_word(&mut self) -> Option<&str> {
        if self.typing_word_list.is_empty() {
            return None;
        }
        self.typing_word_index = (self.typing_word_index + 1) % self.typing_word_list.len();
        Some(&self.typing_word_list[self.typing_word_index])
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
