use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("invalid artifact key: {0}")]
    InvalidKey(String),
    #[error("artifact not found: {0}")]
    NotFound(String),
    #[error("artifact I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage for finished audio files, addressed by flat keys
#[async_trait]
pub trait ArtifactRepository: Send + Sync {
    async fn save(&self, key: &str, bytes: &[u8]) -> Result<(), ArtifactError>;

    async fn load(&self, key: &str) -> Result<Vec<u8>, ArtifactError>;

    /// Remove an artifact. Returns `false` when it was already gone.
    async fn delete(&self, key: &str) -> Result<bool, ArtifactError>;
}

/// Artifacts stored as files in a single directory
pub struct FsArtifactRepository {
    root: PathBuf,
}

impl FsArtifactRepository {
    /// Open the repository, creating the directory if needed
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, ArtifactError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, ArtifactError> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(&['/', '\\'][..])
            && !key.contains("..");
        if !valid {
            return Err(ArtifactError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl ArtifactRepository for FsArtifactRepository {
    async fn save(&self, key: &str, bytes: &[u8]) -> Result<(), ArtifactError> {
        let path = self.path_for(key)?;
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(path = %path.display(), size = bytes.len(), "Artifact written");
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Vec<u8>, ArtifactError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(ArtifactError::NotFound(key.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<bool, ArtifactError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Temporary artifact removed");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
