//! Lifecycle events.
//!
//! [`LifecycleEvent`] is the only thing that leaves the sync core. Every
//! variant carries a [`BaseEvent`] (sync session id plus timestamp) and is
//! serialized with a `type` tag so consumers can forward events as JSON.

use serde::{Deserialize, Serialize};

use crate::condition::WordCondition;
use crate::ids::PlayerId;
use crate::mode::GameMode;
use crate::records::TurnErrorCode;

/// Common fields for all lifecycle events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseEvent {
    /// Sync session that produced the event.
    pub session_id: String,
    /// RFC 3339 timestamp.
    pub timestamp: String,
}

impl BaseEvent {
    /// Base fields stamped with the current UTC time.
    #[must_use]
    pub fn now(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Transition raised by the synchronizer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LifecycleEvent {
    /// I joined the running game's turn order.
    #[serde(rename = "game_started")]
    GameStarted {
        /// Base fields.
        #[serde(flatten)]
        base: BaseEvent,
        /// Turn order at game start.
        #[serde(rename = "gameSequence")]
        game_sequence: Vec<PlayerId>,
    },

    /// I left the turn order (game over or kicked).
    #[serde(rename = "game_ended")]
    GameEnded {
        /// Base fields.
        #[serde(flatten)]
        base: BaseEvent,
    },

    /// My identity changed; all session state was replaced.
    #[serde(rename = "session_changed")]
    SessionChanged {
        /// Base fields.
        #[serde(flatten)]
        base: BaseEvent,
        /// New player id.
        #[serde(rename = "userId")]
        user_id: PlayerId,
    },

    /// A new round began.
    #[serde(rename = "round_changed")]
    RoundChanged {
        /// Base fields.
        #[serde(flatten)]
        base: BaseEvent,
        /// Round number (1-based).
        round: i32,
    },

    /// The room switched rule variant.
    #[serde(rename = "game_mode_changed")]
    GameModeChanged {
        /// Base fields.
        #[serde(flatten)]
        base: BaseEvent,
        /// New mode.
        mode: GameMode,
    },

    /// A turn started.
    #[serde(rename = "turn_started")]
    TurnStarted {
        /// Base fields.
        #[serde(flatten)]
        base: BaseEvent,
        /// Absolute turn index.
        #[serde(rename = "turnIndex")]
        turn_index: i64,
        /// Acting seat.
        #[serde(rename = "relativeTurn")]
        relative_turn: i64,
        /// The acting seat is mine.
        #[serde(rename = "isMyTurn")]
        is_my_turn: bool,
        /// Condition for this turn.
        condition: WordCondition,
        /// Mission character of the player seated before me, if cached.
        #[serde(rename = "previousTurnMission", skip_serializing_if = "String::is_empty", default)]
        previous_turn_mission: String,
    },

    /// The current turn ended.
    #[serde(rename = "turn_ended")]
    TurnEnded {
        /// Base fields.
        #[serde(flatten)]
        base: BaseEvent,
        /// Absolute index of the turn that ended.
        #[serde(rename = "turnIndex")]
        turn_index: i64,
        /// The ended turn was mine.
        #[serde(rename = "wasMyTurn")]
        was_my_turn: bool,
        /// Accepted word; may be empty.
        value: String,
    },

    /// The active condition no longer matches a computed answer.
    #[serde(rename = "path_rescan_requested")]
    PathRescanRequested {
        /// Base fields.
        #[serde(flatten)]
        base: BaseEvent,
        /// Condition to search for instead.
        condition: WordCondition,
    },

    /// A submitted word was rejected.
    #[serde(rename = "unsupported_word_entered")]
    UnsupportedWordEntered {
        /// Base fields.
        #[serde(flatten)]
        base: BaseEvent,
        /// Rejected word (or page banner text).
        word: String,
        /// Rejection reason.
        code: TurnErrorCode,
        /// Word exists but was refused for another reason.
        #[serde(rename = "isExistingWord")]
        is_existing_word: bool,
        /// Word was refused as an end-word.
        #[serde(rename = "isEndWord")]
        is_end_word: bool,
        /// The rejection happened on my turn.
        #[serde(rename = "isMyTurn")]
        is_my_turn: bool,
    },

    /// An example answer was revealed.
    #[serde(rename = "hint_word_presented")]
    HintWordPresented {
        /// Base fields.
        #[serde(flatten)]
        base: BaseEvent,
        /// Example word.
        word: String,
    },

    /// Typing battle: the word to type now.
    #[serde(rename = "typing_word_presented")]
    TypingWordPresented {
        /// Base fields.
        #[serde(flatten)]
        base: BaseEvent,
        /// Word to type.
        word: String,
    },

    /// A word was played this game for the first time.
    #[serde(rename = "word_history_discovered")]
    WordHistoryDiscovered {
        /// Base fields.
        #[serde(flatten)]
        base: BaseEvent,
        /// Played word.
        word: String,
    },
}

impl LifecycleEvent {
    /// Get the base event fields.
    #[must_use]
    pub fn base(&self) -> &BaseEvent {
        match self {
            Self::GameStarted { base, .. }
            | Self::GameEnded { base }
            | Self::SessionChanged { base, .. }
            | Self::RoundChanged { base, .. }
            | Self::GameModeChanged { base, .. }
            | Self::TurnStarted { base, .. }
            | Self::TurnEnded { base, .. }
            | Self::PathRescanRequested { base, .. }
            | Self::UnsupportedWordEntered { base, .. }
            | Self::HintWordPresented { base, .. }
            | Self::TypingWordPresented { base, .. }
            | Self::WordHistoryDiscovered { base, .. } => base,
        }
    }

    /// Get the event type string (matches the serde tag).
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::GameStarted { .. } => "game_started",
            Self::GameEnded { .. } => "game_ended",
            Self::SessionChanged { .. } => "session_changed",
            Self::RoundChanged { .. } => "round_changed",
            Self::GameModeChanged { .. } => "game_mode_changed",
            Self::TurnStarted { .. } => "turn_started",
            Self::TurnEnded { .. } => "turn_ended",
            Self::PathRescanRequested { .. } => "path_rescan_requested",
            Self::UnsupportedWordEntered { .. } => "unsupported_word_entered",
            Self::HintWordPresented { .. } => "hint_word_presented",
            Self::TypingWordPresented { .. } => "typing_word_presented",
            Self::WordHistoryDiscovered { .. } => "word_history_discovered",
        }
    }
}
