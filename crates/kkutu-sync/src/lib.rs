//! # kkutu-sync
//!
//! Keeps one consistent model of a word-chain game while two unreliable
//! channels report on it:
//!
//! - [`polling`]: independently scheduled tasks re-reading single facts
//!   from the rendered page.
//! - [`dispatch`]: routes decoded server push messages to typed handlers,
//!   keyed by message type and the current mode family.
//!
//! Both call into the [`Synchronizer`], the sole writer of
//! [`SessionState`]. It drops stale and duplicate facts and raises a
//! [`LifecycleEvent`](kkutu_core::LifecycleEvent) on the
//! [`LifecycleEventBus`] only for genuine transitions. [`GameSession`] ties
//! the channels together under one cancellation token.

#![deny(unsafe_code)]

pub mod bus;
mod cache;
pub mod context;
pub mod dispatch;
pub mod errors;
pub mod polling;
pub mod session;
pub mod state;
pub mod synchronizer;

pub use bus::{LifecycleEventBus, LifecycleHandler, Subscription};
pub use cache::CacheSnapshot;
pub use context::SyncContext;
pub use dispatch::{
    EventChannel, JsonPushParser, MessageTypes, PushMessage, PushParser, PushTransport, Route,
    RoutingTable,
};
pub use errors::{DispatchError, PollError};
pub use polling::{Cadence, PageScraper, PollDeps, PollJob, PollSchedule, PollerExit};
pub use session::GameSession;
pub use state::SessionState;
pub use synchronizer::Synchronizer;
