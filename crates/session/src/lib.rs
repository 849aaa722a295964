//! Session lifecycle management.
//!
//! One connection state machine per session drives a transport client
//! through pairing, connection, bounded reconnects and terminal cleanup;
//! the registry is the single source of truth for create/lookup/delete and
//! guarantees at most one live machine per session id.

pub mod events;
mod machine;
pub mod pairing;
pub mod registry;
pub mod retry;
pub mod snapshot;

pub use events::LifecycleEvent;
pub use registry::SessionRegistry;
pub use retry::{RetryDecision, RetryPolicy};
pub use snapshot::{SessionSnapshot, SessionState};
