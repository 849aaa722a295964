//! Per-session connection state machine.
//!
//! One task per session owns the lifecycle: it drives the transport
//! factory through connect attempts and reacts to transport events, one at
//! a time in arrival order. Reconnects are scheduled here as a cancellable
//! timer rather than re-entering the initialize path from inside an event
//! handler, so retry timing is testable and a delete can always interrupt.

use std::sync::Arc;

use {
    tokio::sync::mpsc,
    tracing::{debug, error, info, warn},
};

use {
    waygate_common::SessionIdentity,
    waygate_transport::{DisconnectReason, EventSink, TransportEvent},
};

use crate::{
    events::LifecycleEvent,
    pairing,
    registry::{SessionHandle, Shared},
    retry::RetryDecision,
    snapshot::SessionState,
};

/// Start the machine for a fresh session and hand its registry-side handle
/// back. The caller inserts the handle into the session map.
pub(crate) fn spawn(id: &str, shared: Arc<Shared>) -> Arc<SessionHandle> {
    let (sink, events) = mpsc::unbounded_channel();
    let handle = Arc::new(SessionHandle::new(id));
    tokio::spawn(run(Arc::clone(&handle), shared, events, sink));
    handle
}

async fn run(
    handle: Arc<SessionHandle>,
    shared: Arc<Shared>,
    mut events: mpsc::UnboundedReceiver<TransportEvent>,
    sink: EventSink,
) {
    let id = handle.id.clone();
    // Attempts made in the current disconnect episode; reset on connect.
    let mut retry_count: u32 = 0;

    loop {
        // Initialize sequence: a fresh transport client per attempt.
        handle
            .update(|s| {
                s.state = SessionState::Initializing;
                s.retry_count = retry_count;
            })
            .await;

        let credentials = match shared.credentials.load(&id).await {
            Ok(blob) => blob,
            Err(e) => {
                warn!(session = %id, error = %e, "credential load failed, starting unpaired");
                None
            },
        };

        let connected = tokio::select! {
            _ = handle.cancel.cancelled() => return,
            result = shared.factory.connect(&id, credentials, sink.clone()) => result,
        };

        match connected {
            Ok((client, capabilities)) => {
                *handle.transport.write().await = Some(client);
                if !capabilities.archive {
                    warn!(session = %id, "transport is missing the archive capability");
                }
                handle.update(|s| s.degraded = !capabilities.archive).await;
            },
            Err(e) => {
                error!(session = %id, error = %e, "transport connect failed");
                let reason = DisconnectReason::ConnectionLost;
                handle.update(|s| s.last_disconnect = Some(reason)).await;
                match shared.policy.decide(reason, retry_count) {
                    RetryDecision::Stop => {
                        terminate(&handle, &shared, reason).await;
                        return;
                    },
                    RetryDecision::RetryAfter(delay) => {
                        retry_count += 1;
                        handle
                            .update(|s| {
                                s.state = SessionState::Reconnecting;
                                s.retry_count = retry_count;
                            })
                            .await;
                        tokio::select! {
                            _ = handle.cancel.cancelled() => return,
                            _ = tokio::time::sleep(delay) => {},
                        }
                        continue;
                    },
                }
            },
        }

        // Drain transport events until this connection ends.
        let delay = loop {
            let event = tokio::select! {
                _ = handle.cancel.cancelled() => return,
                event = events.recv() => match event {
                    Some(event) => event,
                    None => return,
                },
            };

            match event {
                TransportEvent::PairingCode(code) => {
                    let artifact = match pairing::render_artifact(&code) {
                        Ok(artifact) => artifact,
                        Err(e) => {
                            warn!(session = %id, error = %e, "pairing render failed, using raw code");
                            code
                        },
                    };
                    shared.pairing.set(&id, artifact.clone());
                    handle.update(|s| s.state = SessionState::AwaitingPairing).await;
                    debug!(session = %id, "pairing code ready");
                    shared.bus.publish(LifecycleEvent::PairingReady {
                        session_id: id.clone(),
                        qr: artifact,
                    });
                },

                TransportEvent::Connected {
                    phone_number,
                    display_name,
                } => {
                    retry_count = 0;
                    shared.pairing.clear(&id);
                    let identity = SessionIdentity {
                        phone_number,
                        display_name,
                    };
                    handle
                        .update(|s| {
                            s.state = SessionState::Connected;
                            s.retry_count = 0;
                            s.identity = Some(identity.clone());
                        })
                        .await;
                    info!(session = %id, phone = %identity.phone_number, "session connected");
                    shared.bus.publish(LifecycleEvent::Connected {
                        session_id: id.clone(),
                        phone: identity.phone_number,
                        name: identity.display_name,
                    });
                },

                TransportEvent::CredentialsUpdated(blob) => {
                    if let Err(e) = shared.credentials.save(&id, &blob).await {
                        error!(session = %id, error = %e, "failed to persist credentials");
                    }
                },

                TransportEvent::Disconnected(reason) => {
                    info!(session = %id, reason = ?reason, code = reason.code(), "connection closed");
                    handle
                        .update(|s| {
                            s.last_disconnect = Some(reason);
                            s.identity = None;
                        })
                        .await;
                    match shared.policy.decide(reason, retry_count) {
                        RetryDecision::Stop => {
                            terminate(&handle, &shared, reason).await;
                            return;
                        },
                        RetryDecision::RetryAfter(delay) => {
                            retry_count += 1;
                            handle
                                .update(|s| {
                                    s.state = SessionState::Reconnecting;
                                    s.retry_count = retry_count;
                                })
                                .await;
                            break delay;
                        },
                    }
                },
            }
        };

        // Settle this episode before the next attempt: the old transport
        // goes down first so it cannot emit into the new connection.
        if let Some(old) = handle.transport.write().await.take() {
            old.shutdown().await;
        }
        info!(
            session = %id,
            attempt = retry_count,
            max = shared.policy.max_retries,
            "reconnecting after delay"
        );
        tokio::select! {
            _ = handle.cancel.cancelled() => return,
            _ = tokio::time::sleep(delay) => {},
        }
    }
}

/// Irreversible cleanup. Every step is idempotent; the registry's own
/// delete path may run the same sequence concurrently.
async fn terminate(handle: &Arc<SessionHandle>, shared: &Shared, reason: DisconnectReason) {
    let id = &handle.id;
    if let Some(client) = handle.transport.write().await.take() {
        client.shutdown().await;
    }
    if let Err(e) = shared.credentials.erase(id).await {
        error!(session = %id, error = %e, "credential erasure failed");
    }
    shared.pairing.clear(id);
    handle
        .update(|s| {
            s.state = SessionState::Terminated;
            s.identity = None;
        })
        .await;
    shared
        .sessions
        .remove_if(id, |_, entry| Arc::ptr_eq(entry, handle));
    warn!(session = %id, reason = ?reason, "session terminated");
    shared.bus.publish(LifecycleEvent::Terminated {
        session_id: id.clone(),
        reason,
    });
}
