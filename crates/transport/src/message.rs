use bytes::Bytes;

/// Provider-assigned identifier of a delivered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageId(pub String);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fully resolved outbound message, ready for the wire. Media bytes have
/// already been fetched or decoded by the dispatcher.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    Text {
        body: String,
    },
    Image {
        bytes: Bytes,
        caption: Option<String>,
    },
    Video {
        bytes: Bytes,
        caption: Option<String>,
    },
    /// Sent as a push-to-talk voice note.
    Voice {
        bytes: Bytes,
        mimetype: String,
    },
    Document {
        bytes: Bytes,
        filename: String,
        mimetype: String,
    },
    Contact {
        display_name: String,
        vcard: String,
    },
}

impl OutboundMessage {
    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Image { .. } => "image",
            Self::Video { .. } => "video",
            Self::Voice { .. } => "audio",
            Self::Document { .. } => "document",
            Self::Contact { .. } => "contact",
        }
    }
}
