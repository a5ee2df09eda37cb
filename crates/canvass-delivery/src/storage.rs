//! Local-disk [`FileStorage`].
//!
//! Files live at `<root>/<namespace>/<uuid>-<sanitized name>`. The
//! returned path is relative to the root, so records stay valid if the
//! root moves.

use std::path::{Component, Path, PathBuf};

use canvass_core::delivery::FileStorage;
use canvass_core::error::CanvassResult;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::DeliveryError;

const MAX_NAME_LEN: usize = 100;

#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
}

/// Keep ASCII alphanumerics, `.`, `-` and `_`; everything else becomes
/// `_`. Leading dots are dropped so the result is never hidden.
fn sanitize_filename(raw: &str) -> String {
    let name: String = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let name = name.trim_start_matches('.');
    let name: String = name.chars().take(MAX_NAME_LEN).collect();
    if name.is_empty() {
        "file".to_string()
    } else {
        name
    }
}

fn valid_namespace(namespace: &str) -> bool {
    !namespace.is_empty()
        && namespace
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a stored relative path, refusing anything that could
    /// escape the root.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, DeliveryError> {
        let path = Path::new(relative);
        let safe = !relative.is_empty()
            && path
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(DeliveryError::InvalidPath(relative.to_string()));
        }
        Ok(self.root.join(path))
    }

    async fn write(&self, namespace: &str, filename: &str, bytes: Vec<u8>) -> Result<String, DeliveryError> {
        if !valid_namespace(namespace) {
            return Err(DeliveryError::InvalidPath(namespace.to_string()));
        }
        let relative = format!("{namespace}/{}-{}", Uuid::new_v4(), sanitize_filename(filename));
        let full = self.resolve(&relative)?;

        tokio::fs::create_dir_all(self.root.join(namespace)).await?;
        tokio::fs::write(&full, bytes).await?;
        Ok(relative)
    }

    async fn remove(&self, relative: &str) -> Result<(), DeliveryError> {
        let full = self.resolve(relative)?;
        match tokio::fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = relative, "file already absent");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl FileStorage for LocalFileStorage {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn save(&self, namespace: &str, filename: &str, bytes: Vec<u8>) -> CanvassResult<String> {
        Ok(self.write(namespace, filename, bytes).await?)
    }

    #[instrument(skip(self))]
    async fn delete(&self, path: &str) -> CanvassResult<()> {
        Ok(self.remove(path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_are_sanitized() {
        assert_eq!(sanitize_filename("logo.png"), "logo.png");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\photo 1.jpg"), "photo_1.jpg");
        assert_eq!(sanitize_filename(".htaccess"), "htaccess");
        assert_eq!(sanitize_filename("..."), "file");
        assert_eq!(sanitize_filename(&"a".repeat(300)).len(), MAX_NAME_LEN);
    }

    #[test]
    fn resolve_rejects_escapes() {
        let storage = LocalFileStorage::new("/srv/uploads");
        assert!(storage.resolve("avatars/x.png").is_ok());
        assert!(storage.resolve("../secret").is_err());
        assert!(storage.resolve("avatars/../../secret").is_err());
        assert!(storage.resolve("/etc/passwd").is_err());
        assert!(storage.resolve("").is_err());
    }

    #[tokio::test]
    async fn save_and_delete_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path());

        let path = storage
            .save("avatars", "me.png", vec![1, 2, 3])
            .await
            .unwrap();
        assert!(path.starts_with("avatars/"));
        assert!(path.ends_with("-me.png"));

        let full = dir.path().join(&path);
        assert_eq!(std::fs::read(&full).unwrap(), vec![1, 2, 3]);

        storage.delete(&path).await.unwrap();
        assert!(!full.exists());
        // Deleting twice is fine.
        storage.delete(&path).await.unwrap();
    }

    #[tokio::test]
    async fn same_name_does_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path());

        let a = storage.save("settings", "logo.png", vec![1]).await.unwrap();
        let b = storage.save("settings", "logo.png", vec![2]).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn bad_namespace_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path());
        assert!(storage.save("../up", "x.png", vec![1]).await.is_err());
        assert!(storage.delete("../outside").await.is_err());
    }
}
