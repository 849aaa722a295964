//! Interfaces to the wire-level messaging network.
//!
//! The actual protocol implementation is an external collaborator; this
//! crate defines the seams the session layer drives it through — the
//! transport client and factory traits, connection events, credential
//! persistence, and network addressing — plus a loopback dev transport and
//! a scripted double for tests.

pub mod client;
pub mod credentials;
pub mod dev;
pub mod event;
pub mod jid;
pub mod message;
pub mod testing;

pub use client::{EventSink, TransportCapabilities, TransportClient, TransportFactory};
pub use credentials::{CredentialStore, FsCredentialStore};
pub use event::{DisconnectReason, TransportEvent};
pub use jid::Jid;
pub use message::{MessageId, OutboundMessage};
