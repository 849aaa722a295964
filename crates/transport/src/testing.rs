//! Deterministic transport doubles for tests: a scripted factory whose
//! event sinks the test drives by hand, and an in-memory credential store.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use {anyhow::Result, async_trait::async_trait, tokio::sync::Notify};

use crate::{
    client::{EventSink, TransportCapabilities, TransportClient, TransportFactory},
    credentials::CredentialStore,
    jid::Jid,
    message::{MessageId, OutboundMessage},
};

/// One recorded connection attempt: the sink the test emits transport
/// events through, and the client handed to the session machine.
#[derive(Clone)]
pub struct ScriptedConnection {
    pub session_id: String,
    pub credentials: Option<Vec<u8>>,
    pub events: EventSink,
    pub client: Arc<ScriptedClient>,
}

#[derive(Default)]
struct FactoryState {
    connections: Vec<ScriptedConnection>,
}

/// Factory double recording every connection attempt.
#[derive(Clone, Default)]
pub struct ScriptedFactory {
    state: Arc<Mutex<FactoryState>>,
    connected: Arc<Notify>,
    capabilities: Arc<Mutex<TransportCapabilities>>,
    fail_connects: Arc<AtomicBool>,
}

impl ScriptedFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_capabilities(&self, caps: TransportCapabilities) {
        *lock(&self.capabilities) = caps;
    }

    /// Make subsequent connect calls fail at the factory level.
    pub fn set_fail_connects(&self, fail: bool) {
        self.fail_connects.store(fail, Ordering::SeqCst);
    }

    pub fn connect_count(&self) -> usize {
        lock(&self.state).connections.len()
    }

    pub fn connection(&self, index: usize) -> Option<ScriptedConnection> {
        lock(&self.state).connections.get(index).cloned()
    }

    pub fn last_connection(&self) -> Option<ScriptedConnection> {
        lock(&self.state).connections.last().cloned()
    }

    /// Wait until at least `count` connection attempts were made.
    pub async fn wait_for_connects(&self, count: usize) {
        loop {
            let notified = self.connected.notified();
            if self.connect_count() >= count {
                return;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl TransportFactory for ScriptedFactory {
    async fn connect(
        &self,
        session_id: &str,
        credentials: Option<Vec<u8>>,
        events: EventSink,
    ) -> Result<(Arc<dyn TransportClient>, TransportCapabilities)> {
        let fail = self.fail_connects.load(Ordering::SeqCst);
        let client = Arc::new(ScriptedClient::default());
        lock(&self.state).connections.push(ScriptedConnection {
            session_id: session_id.to_string(),
            credentials,
            events,
            client: Arc::clone(&client),
        });
        self.connected.notify_waiters();

        if fail {
            anyhow::bail!("scripted connect failure");
        }
        let client: Arc<dyn TransportClient> = client;
        Ok((client, *lock(&self.capabilities)))
    }
}

/// Client double recording sends and teardown calls.
#[derive(Default)]
pub struct ScriptedClient {
    sent: Mutex<Vec<(Jid, OutboundMessage)>>,
    fail_sends: AtomicBool,
    logouts: AtomicUsize,
    shutdowns: AtomicUsize,
}

impl ScriptedClient {
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<(Jid, OutboundMessage)> {
        lock(&self.sent).clone()
    }

    pub fn sent_count(&self) -> usize {
        lock(&self.sent).len()
    }

    pub fn logout_count(&self) -> usize {
        self.logouts.load(Ordering::SeqCst)
    }

    pub fn shutdown_count(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransportClient for ScriptedClient {
    async fn send_message(&self, to: &Jid, message: OutboundMessage) -> Result<MessageId> {
        if self.fail_sends.load(Ordering::SeqCst) {
            anyhow::bail!("scripted send failure");
        }
        let mut sent = lock(&self.sent);
        sent.push((to.clone(), message));
        Ok(MessageId(format!("MSG-{}", sent.len())))
    }

    async fn logout(&self) -> Result<()> {
        self.logouts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}

/// In-memory credential store for tests.
#[derive(Default)]
pub struct MemoryCredentialStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    erases: AtomicUsize,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, session_id: &str) -> Option<Vec<u8>> {
        lock(&self.blobs).get(session_id).cloned()
    }

    pub fn erase_count(&self) -> usize {
        self.erases.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self, session_id: &str) -> Result<Option<Vec<u8>>> {
        Ok(lock(&self.blobs).get(session_id).cloned())
    }

    async fn save(&self, session_id: &str, blob: &[u8]) -> Result<()> {
        lock(&self.blobs).insert(session_id.to_string(), blob.to_vec());
        Ok(())
    }

    async fn erase(&self, session_id: &str) -> Result<()> {
        lock(&self.blobs).remove(session_id);
        self.erases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
