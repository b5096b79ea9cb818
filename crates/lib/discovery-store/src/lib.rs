//! Persistent storage of the discovery cache.
//!
//! A [`DiscoveryCacheStore`] owns a single cache file. All stores opened on
//! the same path within a process share one reader/writer lock: loads run in
//! parallel, while a save or clear excludes everything else for the whole
//! encode and persist sequence.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use discovery_record::CachedDiscoverySet;
use tokio::io::AsyncWriteExt as _;

mod lock;

/// Sequence number distinguishing staged files within this process.
static STAGE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Errors returned while loading the cache.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Reading the cache file failed for a reason other than its absence.
    #[error("failed to read cache file {path}: {source}")]
    Read {
        /// Path to the cache file.
        path: PathBuf,

        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors returned while saving the cache.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// The set could not be encoded.
    #[error("failed to encode discovery cache: {0}")]
    Encode(#[source] discovery_codec::EncodeError),

    /// Creating the cache directory failed.
    #[error("failed to create cache directory {path}: {source}")]
    CreateDir {
        /// Path to the directory.
        path: PathBuf,

        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Writing the staged cache file failed.
    #[error("failed to write cache file {path}: {source}")]
    Write {
        /// Path to the staged file.
        path: PathBuf,

        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Moving the staged file over the cache file failed.
    #[error("failed to replace cache file {path}: {source}")]
    Replace {
        /// Path to the cache file.
        path: PathBuf,

        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors returned while clearing the cache.
#[derive(Debug, thiserror::Error)]
pub enum ClearError {
    /// Removing the cache file failed.
    #[error("failed to remove cache file {path}: {source}")]
    Remove {
        /// Path to the cache file.
        path: PathBuf,

        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// The discovery cache file.
#[derive(Debug, Clone)]
pub struct DiscoveryCacheStore {
    /// Path to the cache file.
    path: PathBuf,

    /// Lock shared with every other store on the same path.
    lock: lock::FileLock,
}

impl DiscoveryCacheStore {
    /// Open the store for the cache file at the given path.
    ///
    /// The file does not have to exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock = lock::for_path(&path);
        Self { path, lock }
    }

    /// Path to the cache file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cached set.
    ///
    /// Returns `None` when there is no cache file, or when its contents do
    /// not decode; a corrupt cache is as good as no cache.
    pub async fn load(&self) -> Result<Option<CachedDiscoverySet>, LoadError> {
        let _guard = self.lock.read().await;

        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(cache_path = %self.path.display(), "no discovery cache file");
                return Ok(None);
            }
            Err(source) => {
                return Err(LoadError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        match discovery_codec::decode(&bytes) {
            Ok(set) => {
                tracing::debug!(
                    cache_path = %self.path.display(),
                    records = set.records().len(),
                    "loaded discovery cache"
                );
                Ok(Some(set))
            }
            Err(error) => {
                tracing::warn!(
                    cache_path = %self.path.display(),
                    %error,
                    "ignoring unreadable discovery cache"
                );
                Ok(None)
            }
        }
    }

    /// Replace the cached set.
    ///
    /// The new contents are staged next to the cache file and moved over it,
    /// so the file always holds either the previous or the new set.
    pub async fn save(&self, set: &CachedDiscoverySet) -> Result<(), SaveError> {
        let _guard = self.lock.write().await;

        let bytes = discovery_codec::encode(set).map_err(SaveError::Encode)?;

        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| SaveError::CreateDir {
                    path: dir.to_path_buf(),
                    source,
                })?;
        }

        let staged = self.staged_path();
        if let Err(source) = write_synced(&staged, &bytes).await {
            let _ = tokio::fs::remove_file(&staged).await;
            return Err(SaveError::Write {
                path: staged,
                source,
            });
        }

        if let Err(source) = tokio::fs::rename(&staged, &self.path).await {
            let _ = tokio::fs::remove_file(&staged).await;
            return Err(SaveError::Replace {
                path: self.path.clone(),
                source,
            });
        }

        tracing::debug!(
            cache_path = %self.path.display(),
            owner_identity = set.owner_identity(),
            records = set.records().len(),
            "saved discovery cache"
        );

        Ok(())
    }

    /// Remove the cache file, if any.
    pub async fn clear(&self) -> Result<(), ClearError> {
        let _guard = self.lock.write().await;

        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                tracing::debug!(cache_path = %self.path.display(), "cleared discovery cache");
                Ok(())
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ClearError::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// A fresh sibling path to stage new contents at before replacing the
    /// file.
    ///
    /// Unique per save, so saves that reach the same file through stores
    /// holding different locks never share a staged file.
    fn staged_path(&self) -> PathBuf {
        let seq = STAGE_SEQ.fetch_add(1, Ordering::Relaxed);
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(format!(".{}.{seq}.tmp", std::process::id()));
        self.path.with_file_name(name)
    }
}

/// Write the bytes to a fresh file and flush them to disk.
async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}
