//! Classic-family turn transitions.

use kkutu_core::{LifecycleEvent, WordCondition};
use tracing::{debug, trace};

use super::Synchronizer;
use crate::state::NO_TURN;

impl Synchronizer {
    /// Report that a turn began.
    ///
    /// `turn_index` is absolute; pass `-1` with `is_my_turn` when only "my
    /// turn" is known and the index should be resolved from my seat. Both
    /// channels report the same turn, so a start for the turn already in
    /// progress is dropped.
    pub fn notify_classic_turn_start(
        &self,
        is_my_turn: bool,
        turn_index: i64,
        condition: WordCondition,
    ) {
        self.locked(|state, out| {
            if condition.is_empty() && !state.game_mode().is_free() {
                trace!(turn_index, "turn start without condition");
                return;
            }
            if !state.am_i_gaming() {
                return;
            }

            let mut index = turn_index;
            if is_my_turn && index == NO_TURN {
                let Some(me) = state.my_ordinal() else {
                    return;
                };
                index = state.next_turn_index_for_seat(me);
            }
            let is_my_turn = is_my_turn
                || state
                    .my_ordinal()
                    .is_some_and(|me| state.seat_of(index) == Some(me));

            if index == state.turn_index() && state.is_turn_in_progress() {
                return;
            }
            if !state.begin_turn(index, condition.clone()) {
                return;
            }
            if !is_my_turn
                && state
                    .previous_player_seat()
                    .is_some_and(|seat| state.relative_turn() == seat as i64)
            {
                state.set_previous_turn_mission(condition.mission_char.clone());
            }

            debug!(
                turn_index = index,
                relative_turn = state.relative_turn(),
                is_my_turn,
                condition = %condition,
                "turn started"
            );
            out.push(LifecycleEvent::TurnStarted {
                base: self.base(),
                turn_index: index,
                relative_turn: state.relative_turn(),
                is_my_turn,
                condition,
                previous_turn_mission: state.previous_turn_mission().to_owned(),
            });
        });
    }

    /// Report that the current turn ended with an accepted word.
    pub fn notify_classic_turn_end_ok(&self, value: &str) {
        self.locked(|state, out| {
            if !state.am_i_gaming() || !state.end_turn() {
                return;
            }
            self.caches.turn_error.clear();
            debug!(turn_index = state.turn_index(), value, "turn ended");
            out.push(LifecycleEvent::TurnEnded {
                base: self.base(),
                turn_index: state.turn_index(),
                was_my_turn: state.is_my_turn(),
                value: value.to_owned(),
            });
        });
    }
}
