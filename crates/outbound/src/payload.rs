use waygate_media::MediaSource;

/// Default mimetype for voice notes.
pub const DEFAULT_VOICE_MIMETYPE: &str = "audio/mp4";
/// Defaults applied when a document send omits metadata.
pub const DEFAULT_DOCUMENT_FILENAME: &str = "document.pdf";
pub const DEFAULT_DOCUMENT_MIMETYPE: &str = "application/pdf";

/// A typed outbound payload as accepted from callers. Media is unresolved
/// at this point; the dispatcher fetches or decodes it before sending.
#[derive(Debug, Clone)]
pub enum SendPayload {
    Text {
        body: String,
    },
    Image {
        media: MediaSource,
        caption: Option<String>,
    },
    Video {
        media: MediaSource,
        caption: Option<String>,
    },
    /// Delivered as a push-to-talk voice note.
    Audio {
        media: MediaSource,
        mimetype: Option<String>,
    },
    Document {
        media: MediaSource,
        filename: Option<String>,
        mimetype: Option<String>,
    },
    Contact {
        name: String,
        number: String,
    },
}

/// Render a contact as a vCard 3.0 body the network understands.
pub fn vcard(name: &str, number: &str) -> String {
    format!(
        "BEGIN:VCARD\nVERSION:3.0\nFN:{name}\nTEL;type=CELL;type=VOICE;waid={number}:{number}\nEND:VCARD"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vcard_carries_name_and_number() {
        let card = vcard("Ada Lovelace", "15551234567");
        assert!(card.starts_with("BEGIN:VCARD\nVERSION:3.0\n"));
        assert!(card.contains("FN:Ada Lovelace"));
        assert!(card.contains("waid=15551234567:15551234567"));
        assert!(card.ends_with("END:VCARD"));
    }
}
