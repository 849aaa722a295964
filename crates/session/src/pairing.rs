use {
    base64::{Engine as _, engine::general_purpose::STANDARD},
    dashmap::DashMap,
    qrcode::{QrCode, render::svg},
};

/// Holds the most recent pairing artifact per session until a successful
/// connect consumes it. Single writer (the session's state machine),
/// multiple readers (status endpoints); the latest artifact wins.
#[derive(Default)]
pub struct PairingCache {
    artifacts: DashMap<String, String>,
}

impl PairingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, session_id: &str, artifact: String) {
        self.artifacts.insert(session_id.to_string(), artifact);
    }

    pub fn get(&self, session_id: &str) -> Option<String> {
        self.artifacts.get(session_id).map(|a| a.value().clone())
    }

    pub fn clear(&self, session_id: &str) {
        self.artifacts.remove(session_id);
    }
}

/// Render a raw pairing code as a scannable QR, packaged as an SVG data
/// URL so it can go straight into an `<img>` tag.
pub fn render_artifact(code: &str) -> anyhow::Result<String> {
    let qr = QrCode::new(code.as_bytes())?;
    let image = qr
        .render()
        .min_dimensions(256, 256)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#ffffff"))
        .build();
    Ok(format!(
        "data:image/svg+xml;base64,{}",
        STANDARD.encode(image)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_artifact_wins() {
        let cache = PairingCache::new();
        cache.set("a", "first".into());
        cache.set("a", "second".into());
        assert_eq!(cache.get("a").as_deref(), Some("second"));
    }

    #[test]
    fn clear_is_idempotent_and_scoped() {
        let cache = PairingCache::new();
        cache.set("a", "x".into());
        cache.set("b", "y".into());
        cache.clear("a");
        cache.clear("a");
        assert!(cache.get("a").is_none());
        assert_eq!(cache.get("b").as_deref(), Some("y"));
    }

    #[test]
    fn renders_svg_data_url() {
        let artifact = render_artifact("WG-PAIR-12345").unwrap();
        assert!(artifact.starts_with("data:image/svg+xml;base64,"));
        // Distinct codes must render distinct artifacts.
        assert_ne!(artifact, render_artifact("WG-PAIR-67890").unwrap());
    }
}
