//! Outbound dispatch: validates that a session can send, normalizes the
//! recipient, resolves media, and forwards to the session's transport.
//! Send failures are surfaced as-is — the reconnect policy never covers
//! sends, resending is the caller's job.

pub mod payload;

use std::sync::Arc;

use {bytes::Bytes, tracing::debug};

use {
    waygate_common::{Error, Result},
    waygate_media::{Fetcher, HttpFetcher, MediaSource},
    waygate_session::{SessionRegistry, SessionState},
    waygate_transport::{Jid, MessageId, OutboundMessage},
};

pub use payload::SendPayload;

use payload::{
    DEFAULT_DOCUMENT_FILENAME, DEFAULT_DOCUMENT_MIMETYPE, DEFAULT_VOICE_MIMETYPE, vcard,
};

pub struct Dispatcher {
    registry: SessionRegistry,
    fetcher: Arc<dyn Fetcher>,
}

impl Dispatcher {
    pub fn new(registry: SessionRegistry) -> Self {
        Self::with_fetcher(registry, Arc::new(HttpFetcher::new()))
    }

    pub fn with_fetcher(registry: SessionRegistry, fetcher: Arc<dyn Fetcher>) -> Self {
        Self { registry, fetcher }
    }

    /// Send a typed payload to `to` through the session's transport.
    ///
    /// Precondition: the session exists and is connected; otherwise no
    /// transport call is attempted and no media is fetched.
    pub async fn send(
        &self,
        session_id: &str,
        to: &str,
        payload: SendPayload,
    ) -> Result<MessageId> {
        let to = to.trim();
        if to.is_empty() {
            return Err(Error::Validation("to is required".into()));
        }

        let snapshot = self
            .registry
            .get(session_id)
            .await
            .ok_or_else(|| Error::NotFound(session_id.to_string()))?;
        if snapshot.state != SessionState::Connected {
            return Err(Error::NotConnected(session_id.to_string()));
        }
        let transport = self
            .registry
            .transport(session_id)
            .await
            .ok_or_else(|| Error::NotConnected(session_id.to_string()))?;

        let jid = Jid::normalize(to);
        let message = self.resolve(payload).await?;
        debug!(session = %session_id, to = %jid, kind = message.kind(), "dispatching message");

        transport
            .send_message(&jid, message)
            .await
            .map_err(|e| Error::Transport(format!("{e:#}")))
    }

    async fn resolve(&self, payload: SendPayload) -> Result<OutboundMessage> {
        Ok(match payload {
            SendPayload::Text { body } => {
                if body.is_empty() {
                    return Err(Error::Validation("message is required".into()));
                }
                OutboundMessage::Text { body }
            },
            SendPayload::Image { media, caption } => OutboundMessage::Image {
                bytes: self.resolve_media(&media).await?,
                caption,
            },
            SendPayload::Video { media, caption } => OutboundMessage::Video {
                bytes: self.resolve_media(&media).await?,
                caption,
            },
            SendPayload::Audio { media, mimetype } => OutboundMessage::Voice {
                bytes: self.resolve_media(&media).await?,
                mimetype: mimetype.unwrap_or_else(|| DEFAULT_VOICE_MIMETYPE.into()),
            },
            SendPayload::Document {
                media,
                filename,
                mimetype,
            } => OutboundMessage::Document {
                bytes: self.resolve_media(&media).await?,
                filename: filename.unwrap_or_else(|| DEFAULT_DOCUMENT_FILENAME.into()),
                mimetype: mimetype.unwrap_or_else(|| DEFAULT_DOCUMENT_MIMETYPE.into()),
            },
            SendPayload::Contact { name, number } => {
                if name.is_empty() || number.is_empty() {
                    return Err(Error::Validation("contact name and number are required".into()));
                }
                OutboundMessage::Contact {
                    vcard: vcard(&name, &number),
                    display_name: name,
                }
            },
        })
    }

    async fn resolve_media(&self, source: &MediaSource) -> Result<Bytes> {
        waygate_media::resolve(source, self.fetcher.as_ref())
            .await
            .map_err(|e| Error::Media(e.to_string()))
    }
}
