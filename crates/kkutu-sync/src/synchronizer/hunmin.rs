//! Hunmin (initial-consonant) transitions.

use kkutu_core::{GameMode, SyncError, WordCondition};
use tracing::trace;

use super::Synchronizer;

impl Synchronizer {
    /// Round-ready: new round index and the round's base condition.
    pub fn notify_hunmin_round_ready(&self, round: i32, condition: WordCondition) {
        self.notify_round_change(round);
        self.locked(|state, _| {
            trace!(round, condition = %condition, "hunmin round condition");
            state.set_round_condition(condition);
        });
    }

    /// Turn start: the round condition plus this turn's mission character.
    pub fn notify_hunmin_turn_start(
        &self,
        turn_index: i64,
        mission_char: &str,
    ) -> Result<(), SyncError> {
        let guard = self.session.lock();
        let base = guard.borrow().round_condition().cloned();
        let Some(base) = base else {
            return Err(SyncError::RoundNotReady {
                mode: GameMode::Hunmin,
            });
        };
        self.notify_classic_turn_start(false, turn_index, base.with_mission_char(mission_char));
        drop(guard);
        Ok(())
    }
}
