//! Fakes shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use kkutu_core::{GameMode, LifecycleEvent, PlayerId, ScrapeError, TransportError};
use kkutu_settings::SyncSettings;
use kkutu_sync::{
    LifecycleEventBus, MessageTypes, PageScraper, PushMessage, PushTransport, Subscription,
    SyncContext,
};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::broadcast;

/// What the fake page currently shows.
#[derive(Clone, Debug, Default)]
pub struct PageFacts {
    pub user_id: Option<String>,
    pub game_sequence: Vec<PlayerId>,
    pub round_index: i32,
    pub presented_word: String,
    pub mission_char: Option<String>,
    pub word_length: Option<usize>,
    pub unsupported_word: Option<String>,
    pub example_word: Option<String>,
    pub game_mode: GameMode,
    pub is_my_turn: bool,
    pub turn_seat: Option<usize>,
    pub word_histories: Vec<String>,
    pub typing_word: Option<String>,
    pub turn_time: Option<f64>,
    pub round_time: Option<f64>,
}

#[derive(Default)]
struct PageInner {
    facts: PageFacts,
    blind: bool,
    disconnected: bool,
}

/// Scripted page.
#[derive(Default)]
pub struct FakePage {
    inner: Mutex<PageInner>,
    helper_registrations: AtomicUsize,
}

impl FakePage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Change what the page shows.
    pub fn update(&self, f: impl FnOnce(&mut PageFacts)) {
        f(&mut self.inner.lock().facts);
    }

    /// Every read fails transiently.
    pub fn set_blind(&self, blind: bool) {
        self.inner.lock().blind = blind;
    }

    /// Every read fails fatally.
    pub fn disconnect(&self) {
        self.inner.lock().disconnected = true;
    }

    pub fn helper_registrations(&self) -> usize {
        self.helper_registrations.load(Ordering::SeqCst)
    }

    fn read<T>(
        &self,
        fact: &'static str,
        f: impl FnOnce(&PageFacts) -> T,
    ) -> Result<T, ScrapeError> {
        let inner = self.inner.lock();
        if inner.disconnected {
            return Err(ScrapeError::Disconnected("page closed".into()));
        }
        if inner.blind {
            return Err(ScrapeError::unavailable(fact, "element not found"));
        }
        Ok(f(&inner.facts))
    }
}

#[async_trait]
impl PageScraper for FakePage {
    async fn register_helpers(&self) -> Result<(), ScrapeError> {
        self.read("helpers", |_| ())?;
        let _ = self.helper_registrations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn user_id(&self) -> Result<Option<String>, ScrapeError> {
        self.read("user_id", |f| f.user_id.clone())
    }

    async fn game_sequence(&self) -> Result<Vec<PlayerId>, ScrapeError> {
        self.read("game_sequence", |f| f.game_sequence.clone())
    }

    async fn round_index(&self) -> Result<i32, ScrapeError> {
        self.read("round_index", |f| f.round_index)
    }

    async fn presented_word(&self) -> Result<String, ScrapeError> {
        self.read("presented_word", |f| f.presented_word.clone())
    }

    async fn mission_char(&self) -> Result<Option<String>, ScrapeError> {
        self.read("mission_char", |f| f.mission_char.clone())
    }

    async fn word_length(&self) -> Result<Option<usize>, ScrapeError> {
        self.read("word_length", |f| f.word_length)
    }

    async fn unsupported_word(&self) -> Result<Option<String>, ScrapeError> {
        self.read("unsupported_word", |f| f.unsupported_word.clone())
    }

    async fn example_word(&self) -> Result<Option<String>, ScrapeError> {
        self.read("example_word", |f| f.example_word.clone())
    }

    async fn game_mode(&self) -> Result<GameMode, ScrapeError> {
        self.read("game_mode", |f| f.game_mode)
    }

    async fn is_my_turn(&self) -> Result<bool, ScrapeError> {
        self.read("is_my_turn", |f| f.is_my_turn)
    }

    async fn turn_seat(&self) -> Result<Option<usize>, ScrapeError> {
        self.read("turn_seat", |f| f.turn_seat)
    }

    async fn word_histories(&self) -> Result<Vec<String>, ScrapeError> {
        self.read("word_histories", |f| f.word_histories.clone())
    }

    async fn typing_word(&self) -> Result<Option<String>, ScrapeError> {
        self.read("typing_word", |f| f.typing_word.clone())
    }

    async fn turn_time(&self) -> Result<Option<f64>, ScrapeError> {
        self.read("turn_time", |f| f.turn_time)
    }

    async fn round_time(&self) -> Result<Option<f64>, ScrapeError> {
        self.read("round_time", |f| f.round_time)
    }
}

/// Push transport fed by the test.
pub struct FakeTransport {
    tx: broadcast::Sender<PushMessage>,
    filters: Mutex<Vec<MessageTypes>>,
}

impl FakeTransport {
    pub fn new() -> Arc<Self> {
        let (tx, _) = broadcast::channel(64);
        Arc::new(Self {
            tx,
            filters: Mutex::new(Vec::new()),
        })
    }

    /// Deliver a message to every subscriber.
    pub fn push(&self, kind: &str, payload: Value) {
        let _ = self.tx.send(PushMessage::new(kind, payload));
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn last_filters(&self) -> Option<MessageTypes> {
        self.filters.lock().last().cloned()
    }
}

#[async_trait]
impl PushTransport for FakeTransport {
    fn subscribe(&self) -> broadcast::Receiver<PushMessage> {
        self.tx.subscribe()
    }

    async fn register_filters(&self, types: &MessageTypes) -> Result<(), TransportError> {
        self.filters.lock().push(types.clone());
        Ok(())
    }
}

/// Collects every event published on a bus.
pub struct Recorder {
    events: Arc<Mutex<Vec<LifecycleEvent>>>,
    _sub: Subscription,
}

impl Recorder {
    pub fn attach(bus: &Arc<LifecycleEventBus>) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let sub = bus.subscribe(move |e: &LifecycleEvent| sink.lock().push(e.clone()));
        Self { events, _sub: sub }
    }

    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, event_type: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.event_type() == event_type)
            .count()
    }

    pub fn of_type(&self, event_type: &str) -> Vec<LifecycleEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.event_type() == event_type)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

/// Context with short idle intervals so tests do not wait seconds for a
/// poller to wake up.
pub fn fast_context() -> SyncContext {
    let mut settings = SyncSettings::default();
    settings.polling.idle_interval_ms = 200;
    settings.polling.slow_interval_ms = 200;
    SyncContext::new(settings)
}

pub fn ids(names: &[&str]) -> Vec<PlayerId> {
    names.iter().map(|n| PlayerId::from(*n)).collect()
}

/// Let spawned pollers run for `ms` of (paused) time.
pub async fn run_for(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
