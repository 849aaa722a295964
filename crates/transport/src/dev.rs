//! Loopback transport for running the gateway without a wire-protocol
//! backend: every connection emits a pairing code, then reports connected
//! after a simulated scan delay. Messages are accepted and logged.

use std::{sync::Arc, time::Duration};

use {
    anyhow::Result,
    async_trait::async_trait,
    tokio_util::sync::CancellationToken,
    tracing::{debug, info},
};

use crate::{
    client::{EventSink, TransportCapabilities, TransportClient, TransportFactory},
    event::{DisconnectReason, TransportEvent},
    jid::Jid,
    message::{MessageId, OutboundMessage},
};

pub struct DevTransportFactory {
    scan_delay: Duration,
}

impl DevTransportFactory {
    pub fn new(scan_delay: Duration) -> Self {
        Self { scan_delay }
    }
}

#[async_trait]
impl TransportFactory for DevTransportFactory {
    async fn connect(
        &self,
        session_id: &str,
        credentials: Option<Vec<u8>>,
        events: EventSink,
    ) -> Result<(Arc<dyn TransportClient>, TransportCapabilities)> {
        let cancel = CancellationToken::new();
        let client: Arc<dyn TransportClient> = Arc::new(DevTransportClient {
            session_id: session_id.to_string(),
            events: events.clone(),
            cancel: cancel.clone(),
        });

        let phone_number = synth_phone(session_id);
        let already_paired = credentials.is_some();
        let scan_delay = self.scan_delay;
        let id = session_id.to_string();
        tokio::spawn(async move {
            if !already_paired {
                let code = format!("WG-DEV-{}", uuid::Uuid::new_v4());
                if events.send(TransportEvent::PairingCode(code)).is_err() {
                    return;
                }
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(scan_delay) => {},
                }
                let _ = events.send(TransportEvent::CredentialsUpdated(
                    format!("dev-creds:{id}").into_bytes(),
                ));
            }
            let _ = events.send(TransportEvent::Connected {
                phone_number,
                display_name: Some("Dev Device".into()),
            });
        });

        Ok((client, TransportCapabilities::default()))
    }
}

struct DevTransportClient {
    session_id: String,
    events: EventSink,
    cancel: CancellationToken,
}

#[async_trait]
impl TransportClient for DevTransportClient {
    async fn send_message(&self, to: &Jid, message: OutboundMessage) -> Result<MessageId> {
        info!(
            session = %self.session_id,
            to = %to,
            kind = message.kind(),
            "dev transport accepted message"
        );
        Ok(MessageId(uuid::Uuid::new_v4().to_string()))
    }

    async fn logout(&self) -> Result<()> {
        let _ = self
            .events
            .send(TransportEvent::Disconnected(DisconnectReason::LoggedOut));
        Ok(())
    }

    async fn shutdown(&self) {
        debug!(session = %self.session_id, "dev transport shut down");
        self.cancel.cancel();
    }
}

/// Stable fake phone number derived from the session id.
fn synth_phone(session_id: &str) -> String {
    let hash = session_id
        .bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)));
    format!("1555{:07}", hash % 10_000_000)
}
