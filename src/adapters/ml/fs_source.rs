//! Implements ArtifactSource over a local directory.

use crate::domain::DomainError;
use crate::ports::ArtifactSource;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

pub struct FsArtifactSource {
    base_dir: PathBuf,
}

impl FsArtifactSource {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Resolves `name` under the base directory. Rejects absolute paths and `..`.
    fn resolve(&self, name: &str) -> Result<PathBuf, DomainError> {
        let rel = Path::new(name);
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(DomainError::Artifact(format!(
                "artifact name escapes base dir: {}",
                name
            )));
        }
        Ok(self.base_dir.join(rel))
    }
}

#[async_trait::async_trait]
impl ArtifactSource for FsArtifactSource {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>, DomainError> {
        let path = self.resolve(name)?;
        fs::read(&path)
            .await
            .map_err(|e| DomainError::Artifact(format!("read {}: {}", path.display(), e)))
    }

    fn describe(&self) -> String {
        self.base_dir.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_relative_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("classifier")).unwrap();
        std::fs::write(dir.path().join("classifier/model.json"), b"{}").unwrap();

        let source = FsArtifactSource::new(dir.path());
        assert_eq!(source.fetch("classifier/model.json").await.unwrap(), b"{}");
    }

    #[tokio::test]
    async fn missing_file_is_artifact_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FsArtifactSource::new(dir.path());
        assert!(matches!(
            source.fetch("nope.json").await,
            Err(DomainError::Artifact(_))
        ));
    }

    #[tokio::test]
    async fn parent_traversal_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let source = FsArtifactSource::new(dir.path());
        assert!(source.fetch("../secret.json").await.is_err());
    }
}
