use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::schema::WaygateConfig;

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["waygate.toml", "waygate.json"];

/// Load config from the given path (format selected by extension).
pub fn load_config(path: &Path) -> anyhow::Result<WaygateConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./waygate.{toml,json}` (project-local)
/// 2. `~/.config/waygate/waygate.{toml,json}` (user-global)
///
/// Returns `WaygateConfig::default()` if no config file is found or the
/// found file fails to parse.
pub fn discover_and_load() -> WaygateConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    WaygateConfig::default()
}

/// Returns the data directory: `~/.waygate/` on all platforms.
pub fn data_dir() -> PathBuf {
    home_dir()
        .map(|h| h.join(".waygate"))
        .unwrap_or_else(|| PathBuf::from(".waygate"))
}

fn find_config_file() -> Option<PathBuf> {
    // Project-local
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    // User-global: ~/.config/waygate/
    if let Some(dir) = home_dir().map(|h| h.join(".config").join("waygate")) {
        for name in CONFIG_FILENAMES {
            let p = dir.join(name);
            if p.exists() {
                return Some(p);
            }
        }
    }

    None
}

fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<WaygateConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
