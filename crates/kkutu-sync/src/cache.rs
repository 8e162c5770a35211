//! Per-fact deduplication caches.
//!
//! Each cache has its own lock so unrelated facts never contend. A cache
//! lock is never held while taking the session lock.

use std::collections::HashSet;
use std::time::Duration;

use kkutu_core::PlayerId;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::time::Instant;

/// Last observed value of one fact.
pub(crate) struct LastSeen<T> {
    value: Mutex<Option<T>>,
}

impl<T: Clone> LastSeen<T> {
    pub(crate) fn new() -> Self {
        Self {
            value: Mutex::new(None),
        }
    }

    /// Store `value` unless `same` says it matches the cached one.
    /// Returns `true` when the value is new.
    pub(crate) fn observe_with(&self, value: T, same: impl Fn(&T, &T) -> bool) -> bool {
        let mut cached = self.value.lock();
        if cached.as_ref().is_some_and(|c| same(c, &value)) {
            return false;
        }
        *cached = Some(value);
        true
    }

    pub(crate) fn get(&self) -> Option<T> {
        self.value.lock().clone()
    }

    pub(crate) fn clear(&self) {
        *self.value.lock() = None;
    }
}

impl<T: Clone + PartialEq> LastSeen<T> {
    pub(crate) fn observe(&self, value: T) -> bool {
        self.observe_with(value, PartialEq::eq)
    }
}

impl LastSeen<String> {
    pub(crate) fn observe_ignore_case(&self, value: &str) -> bool {
        self.observe_with(value.to_owned(), |a, b| eq_ignore_case(a, b))
    }
}

/// Typing-battle word with the time it was last presented.
pub(crate) struct TypingWordCache {
    inner: Mutex<Option<(String, Instant)>>,
}

impl TypingWordCache {
    fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }

    /// New unless it equals the cached word and was presented within
    /// `repeat_after`.
    pub(crate) fn observe(&self, word: &str, repeat_after: Duration) -> bool {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        if let Some((cached, at)) = inner.as_ref() {
            if eq_ignore_case(cached, word) && now.duration_since(*at) <= repeat_after {
                return false;
            }
        }
        *inner = Some((word.to_owned(), now));
        true
    }

    /// Record `word` as presented now without deduplicating.
    pub(crate) fn remember(&self, word: &str) {
        *self.inner.lock() = Some((word.to_owned(), Instant::now()));
    }

    fn get(&self) -> Option<String> {
        self.inner.lock().as_ref().map(|(w, _)| w.clone())
    }

    fn clear(&self) {
        *self.inner.lock() = None;
    }
}

#[derive(Default)]
struct History {
    last: Option<String>,
    seen: HashSet<String>,
}

/// Every word seen in the history this round.
pub(crate) struct WordHistoryCache {
    inner: Mutex<History>,
}

impl WordHistoryCache {
    fn new() -> Self {
        Self {
            inner: Mutex::new(History::default()),
        }
    }

    /// One item from the push channel. New unless it matches the last item
    /// or any item seen before.
    pub(crate) fn observe_one(&self, word: &str) -> bool {
        let mut history = self.inner.lock();
        Self::insert(&mut history, word)
    }

    /// A full list from the page. Returns the entries not seen before, in
    /// list order.
    pub(crate) fn observe_many(&self, words: &[String]) -> Vec<String> {
        let mut history = self.inner.lock();
        words
            .iter()
            .filter(|w| !w.trim().is_empty())
            .filter(|w| Self::insert(&mut history, w))
            .cloned()
            .collect()
    }

    fn insert(history: &mut History, word: &str) -> bool {
        if history.last.as_deref().is_some_and(|l| eq_ignore_case(l, word)) {
            return false;
        }
        let key = word.to_lowercase();
        if !history.seen.insert(key) {
            return false;
        }
        history.last = Some(word.to_owned());
        true
    }

    fn len(&self) -> usize {
        self.inner.lock().seen.len()
    }

    fn clear(&self) {
        *self.inner.lock() = History::default();
    }
}

/// All deduplication caches of one synchronizer.
pub(crate) struct SyncCaches {
    pub(crate) roster: LastSeen<Vec<PlayerId>>,
    pub(crate) round: LastSeen<i32>,
    pub(crate) turn_error: LastSeen<String>,
    pub(crate) hint: LastSeen<String>,
    pub(crate) typing_word: TypingWordCache,
    pub(crate) word_history: WordHistoryCache,
}

impl SyncCaches {
    pub(crate) fn new() -> Self {
        Self {
            roster: LastSeen::new(),
            round: LastSeen::new(),
            turn_error: LastSeen::new(),
            hint: LastSeen::new(),
            typing_word: TypingWordCache::new(),
            word_history: WordHistoryCache::new(),
        }
    }

    /// Caches that only make sense within one round.
    pub(crate) fn clear_round_scoped(&self) {
        self.turn_error.clear();
        self.hint.clear();
        self.typing_word.clear();
        self.word_history.clear();
    }

    /// Caches that only make sense within one game.
    pub(crate) fn clear_game_scoped(&self) {
        self.clear_round_scoped();
        self.round.clear();
    }

    /// Everything, including the roster.
    pub(crate) fn clear_all(&self) {
        self.clear_game_scoped();
        self.roster.clear();
    }

    pub(crate) fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            roster: self.roster.get(),
            round: self.round.get(),
            turn_error: self.turn_error.get(),
            hint: self.hint.get(),
            typing_word: self.typing_word.get(),
            word_history_len: self.word_history.len(),
        }
    }
}

/// Point-in-time copy of the deduplication caches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheSnapshot {
    /// Last roster reported.
    pub roster: Option<Vec<PlayerId>>,
    /// Last round index reported.
    pub round: Option<i32>,
    /// Last rejected word.
    pub turn_error: Option<String>,
    /// Last hint word.
    pub hint: Option<String>,
    /// Last typing word presented.
    pub typing_word: Option<String>,
    /// Number of distinct history words this round.
    pub word_history_len: usize,
}

impl CacheSnapshot {
    /// No game-scoped cache holds a value.
    pub fn game_scoped_empty(&self) -> bool {
        self.round.is_none()
            && self.turn_error.is_none()
            && self.hint.is_none()
            && self.typing_word.is_none()
            && self.word_history_len == 0
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
