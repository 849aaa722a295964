use std::path::PathBuf;

use {anyhow::Result, async_trait::async_trait, tracing::debug};

/// Durable storage for opaque credential material, scoped per session id.
/// Erasure is authoritative session erasure and must be idempotent.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn load(&self, session_id: &str) -> Result<Option<Vec<u8>>>;
    async fn save(&self, session_id: &str, blob: &[u8]) -> Result<()>;
    async fn erase(&self, session_id: &str) -> Result<()>;
}

/// Filesystem-backed store: one directory per session id under a root
/// auth directory, credential blob in a single file.
pub struct FsCredentialStore {
    root: PathBuf,
}

const CREDS_FILE: &str = "creds.bin";

impl FsCredentialStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn session_dir(&self, session_id: &str) -> PathBuf {
        self.root.join(session_id)
    }
}

#[async_trait]
impl CredentialStore for FsCredentialStore {
    async fn load(&self, session_id: &str) -> Result<Option<Vec<u8>>> {
        let path = self.session_dir(session_id).join(CREDS_FILE);
        match tokio::fs::read(&path).await {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, session_id: &str, blob: &[u8]) -> Result<()> {
        let dir = self.session_dir(session_id);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(CREDS_FILE), blob).await?;
        Ok(())
    }

    async fn erase(&self, session_id: &str) -> Result<()> {
        let dir = self.session_dir(session_id);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => {
                debug!(session = %session_id, "credential material erased");
                Ok(())
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
