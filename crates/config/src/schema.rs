use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WaygateConfig {
    pub server: ServerConfig,
    pub sessions: SessionsConfig,
    pub transport: TransportConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

/// Session lifecycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    /// Directory holding per-session credential material. Defaults to
    /// `<data dir>/auth_sessions` when unset.
    pub auth_dir: Option<PathBuf>,

    /// Reconnect attempts allowed per disconnect episode.
    pub max_retries: u32,

    /// Delay between reconnect attempts.
    pub retry_delay_ms: u64,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            auth_dir: None,
            max_retries: 2,
            retry_delay_ms: 3000,
        }
    }
}

/// Transport backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Dev transport only: how long the simulated device takes to scan the
    /// pairing code before the session reports connected.
    pub pairing_scan_delay_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            pairing_scan_delay_ms: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_policy() {
        let cfg = WaygateConfig::default();
        assert_eq!(cfg.sessions.max_retries, 2);
        assert_eq!(cfg.sessions.retry_delay_ms, 3000);
        assert_eq!(cfg.server.port, 3000);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg: WaygateConfig = toml::from_str("[sessions]\nmax_retries = 5\n").unwrap();
        assert_eq!(cfg.sessions.max_retries, 5);
        assert_eq!(cfg.sessions.retry_delay_ms, 3000);
        assert_eq!(cfg.server.bind, "127.0.0.1");
    }
}
