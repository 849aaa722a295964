use std::sync::Arc;

use {
    dashmap::{DashMap, mapref::entry::Entry},
    tokio::sync::{RwLock, broadcast},
    tokio_util::sync::CancellationToken,
    tracing::{error, info, warn},
};

use {
    waygate_common::{Error, Result},
    waygate_transport::{CredentialStore, TransportClient, TransportFactory},
};

use crate::{
    events::{EVENT_BUFFER, EventBus, LifecycleEvent},
    machine,
    pairing::PairingCache,
    retry::RetryPolicy,
    snapshot::{SessionSnapshot, SessionState},
};

/// State shared between the registry and every session machine.
pub(crate) struct Shared {
    pub(crate) sessions: DashMap<String, Arc<SessionHandle>>,
    pub(crate) pairing: PairingCache,
    pub(crate) bus: EventBus,
    pub(crate) credentials: Arc<dyn CredentialStore>,
    pub(crate) factory: Arc<dyn TransportFactory>,
    pub(crate) policy: RetryPolicy,
}

/// Registry-side handle to one live session machine.
pub(crate) struct SessionHandle {
    pub(crate) id: String,
    snapshot: RwLock<SessionSnapshot>,
    /// Current transport client, swapped on every reconnect attempt.
    pub(crate) transport: RwLock<Option<Arc<dyn TransportClient>>>,
    /// Cancelling stops the machine, including a pending retry timer.
    pub(crate) cancel: CancellationToken,
}

impl SessionHandle {
    pub(crate) fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            snapshot: RwLock::new(SessionSnapshot::new(id)),
            transport: RwLock::new(None),
            cancel: CancellationToken::new(),
        }
    }

    pub(crate) async fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.read().await.clone()
    }

    pub(crate) async fn update(&self, f: impl FnOnce(&mut SessionSnapshot)) {
        f(&mut *self.snapshot.write().await);
    }

    pub(crate) async fn transport(&self) -> Option<Arc<dyn TransportClient>> {
        self.transport.read().await.clone()
    }
}

/// Single source of truth for sessions: create, look up, enumerate, erase.
/// At most one live state machine exists per id.
#[derive(Clone)]
pub struct SessionRegistry {
    shared: Arc<Shared>,
}

impl SessionRegistry {
    pub fn new(
        factory: Arc<dyn TransportFactory>,
        credentials: Arc<dyn CredentialStore>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                sessions: DashMap::new(),
                pairing: PairingCache::new(),
                bus: EventBus::new(EVENT_BUFFER),
                credentials,
                factory,
                policy,
            }),
        }
    }

    /// Return the existing session for `id`, or start a new machine.
    ///
    /// Safe under concurrent calls for the same id: the map entry decides,
    /// and only the vacant branch spawns a machine.
    pub async fn create(&self, id: &str) -> (SessionSnapshot, bool) {
        loop {
            let (handle, is_new) = match self.shared.sessions.entry(id.to_string()) {
                Entry::Occupied(entry) => (Arc::clone(entry.get()), false),
                Entry::Vacant(entry) => {
                    info!(session = %id, "creating session");
                    let handle = machine::spawn(id, Arc::clone(&self.shared));
                    entry.insert(Arc::clone(&handle));
                    (handle, true)
                },
            };
            let snapshot = handle.snapshot().await;
            if !is_new && snapshot.state == SessionState::Terminated {
                // Entry caught mid-termination; drop it and start fresh.
                self.shared
                    .sessions
                    .remove_if(id, |_, entry| Arc::ptr_eq(entry, &handle));
                continue;
            }
            return (snapshot, is_new);
        }
    }

    pub async fn get(&self, id: &str) -> Option<SessionSnapshot> {
        let handle = self.handle(id)?;
        Some(handle.snapshot().await)
    }

    /// Point-in-time view of all sessions, each entry snapshotted
    /// atomically. Order is not meaningful.
    pub async fn list(&self) -> Vec<SessionSnapshot> {
        let handles: Vec<_> = self
            .shared
            .sessions
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        let mut snapshots = Vec::with_capacity(handles.len());
        for handle in handles {
            snapshots.push(handle.snapshot().await);
        }
        snapshots
    }

    /// Current pairing artifact, if the session is awaiting a scan.
    pub fn pairing_artifact(&self, id: &str) -> Option<String> {
        self.shared.pairing.get(id)
    }

    /// Subscribe to lifecycle events for all sessions.
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.shared.bus.subscribe()
    }

    /// The live transport for `id`, if one is currently attached.
    pub async fn transport(&self, id: &str) -> Option<Arc<dyn TransportClient>> {
        let handle = self.handle(id)?;
        handle.transport().await
    }

    /// Erase a session: stop its machine, tear down the transport, delete
    /// credentials, drop the registry entry.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.teardown(id, false).await
    }

    /// Request an authoritative logout from the network, then erase.
    pub async fn logout(&self, id: &str) -> Result<()> {
        self.teardown(id, true).await
    }

    fn handle(&self, id: &str) -> Option<Arc<SessionHandle>> {
        self.shared
            .sessions
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
    }

    async fn teardown(&self, id: &str, logout: bool) -> Result<()> {
        let handle = self.handle(id).ok_or_else(|| Error::NotFound(id.to_string()))?;

        // Stop the machine first so a pending retry cannot resurrect the
        // session while we clean up.
        handle.cancel.cancel();

        if let Some(client) = handle.transport.write().await.take() {
            if logout {
                if let Err(e) = client.logout().await {
                    warn!(session = %id, error = %e, "logout request failed, erasing anyway");
                }
            }
            client.shutdown().await;
        }

        if let Err(e) = self.shared.credentials.erase(id).await {
            error!(session = %id, error = %e, "credential erasure failed");
        }
        self.shared.pairing.clear(id);
        handle
            .update(|s| {
                s.state = SessionState::Terminated;
                s.identity = None;
            })
            .await;
        self.shared
            .sessions
            .remove_if(id, |_, entry| Arc::ptr_eq(entry, &handle));
        info!(session = %id, logout, "session erased");
        Ok(())
    }
}
