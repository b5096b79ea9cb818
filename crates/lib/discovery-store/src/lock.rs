//! Process-wide registry of per-file reader/writer locks.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, PoisonError, Weak};

use tokio::sync::RwLock;

/// The lock guarding one cache file.
pub(crate) type FileLock = Arc<RwLock<()>>;

/// Live locks keyed by canonical file path.
static LOCKS: LazyLock<Mutex<HashMap<PathBuf, Weak<RwLock<()>>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Get the lock shared by every store opened on `path`, however it is
/// spelled.
///
/// Locks are dropped once the last store referencing them goes away.
pub(crate) fn for_path(path: &Path) -> FileLock {
    let key = canonical_key(path);

    // The map holds no invariants a panicking holder could have broken.
    let mut locks = LOCKS.lock().unwrap_or_else(PoisonError::into_inner);
    locks.retain(|_, lock| lock.strong_count() > 0);

    if let Some(lock) = locks.get(&key).and_then(Weak::upgrade) {
        return lock;
    }

    let lock = Arc::new(RwLock::new(()));
    locks.insert(key, Arc::downgrade(&lock));
    lock
}

/// The registry key for a cache file path.
///
/// The parent directory is resolved through the filesystem when it exists,
/// so symlinks and `..` collapse to one spelling. Otherwise the path is
/// normalized lexically.
fn canonical_key(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let absolute = normalize_lexically(&absolute);

    let (Some(dir), Some(name)) = (absolute.parent(), absolute.file_name()) else {
        return absolute;
    };

    match std::fs::canonicalize(dir) {
        Ok(dir) => dir.join(name),
        Err(_) => absolute,
    }
}

/// Drop `.` components and fold `..` into the preceding component.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_path_shares_lock() {
        let a = for_path(Path::new("/tmp/discovery-store-lock-test/a.bin"));
        let b = for_path(Path::new("/tmp/discovery-store-lock-test/a.bin"));

        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn different_paths_do_not_share_lock() {
        let a = for_path(Path::new("/tmp/discovery-store-lock-test/b.bin"));
        let b = for_path(Path::new("/tmp/discovery-store-lock-test/c.bin"));

        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn relative_and_absolute_spellings_share_lock() {
        let relative = Path::new("discovery-store-lock-test.bin");
        let absolute = std::env::current_dir().unwrap().join(relative);

        let a = for_path(relative);
        let b = for_path(&absolute);

        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn parent_dir_spelling_shares_lock() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let a = for_path(&dir.path().join("sub/../DiscoveryInfo.bin"));
        let b = for_path(&dir.path().join("DiscoveryInfo.bin"));

        assert!(Arc::ptr_eq(&a, &b));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_dir_shares_lock() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real");
        std::fs::create_dir(&real).unwrap();
        std::os::unix::fs::symlink(&real, dir.path().join("link")).unwrap();

        let a = for_path(&dir.path().join("link/DiscoveryInfo.bin"));
        let b = for_path(&real.join("DiscoveryInfo.bin"));

        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn missing_dir_is_normalized_lexically() {
        assert_eq!(
            canonical_key(Path::new("/no-such-dir-for-lock-test/x/./../y/c.bin")),
            PathBuf::from("/no-such-dir-for-lock-test/y/c.bin")
        );
    }
}
