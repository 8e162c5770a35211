//! # kkutu-core
//!
//! Foundation crate for the word-chain game sync core. Everything above it
//! (settings, synchronizer, pollers, push dispatch) depends on these types.
//!
//! - **Identifiers**: branded newtypes for players and sync sessions
//! - **Game modes**: rule variants, room-code mapping, condition-node extraction
//! - **Word conditions**: the constraint a valid answer must satisfy
//! - **Push records**: typed payloads decoded from server push messages
//! - **Lifecycle events**: the outward event stream and its payloads
//! - **Errors**: scrape, parse, sync and transport failures
//! - **Logging**: `tracing` subscriber setup and capture helpers for tests

#![deny(unsafe_code)]

pub mod condition;
pub mod errors;
pub mod events;
pub mod ids;
pub mod logging;
pub mod mode;
pub mod records;

pub use condition::WordCondition;
pub use errors::{ParseError, ScrapeError, SyncError, TransportError};
pub use events::{BaseEvent, LifecycleEvent};
pub use ids::{PlayerId, SyncSessionId};
pub use mode::{GameMode, ImplMode};
pub use records::TurnErrorCode;
