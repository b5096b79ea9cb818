//! Opinionated default file paths for the discovery cache.

use std::path::PathBuf;

use either::Either;

/// Application directory name used under the platform base directories.
const APP_DIR: &str = "discovery-cache";

/// Cache file name.
pub const CACHE_FILE_NAME: &str = "DiscoveryInfo.bin";

/// Where the discovery cache looks for its config when nothing overrides it.
///
/// Per-user locations win over `/etc`; within the user's own files the
/// platform config directory is checked before dotfiles in the home dir.
pub fn defaults() -> impl Iterator<Item = PathBuf> {
    let user_config = dirs::config_dir().into_iter().flat_map(|dir| {
        [
            dir.join(APP_DIR).join("config.yaml"),
            dir.join(format!("{APP_DIR}.yaml")),
        ]
    });
    let home_dotfiles = dirs::home_dir().into_iter().flat_map(|dir| {
        [
            dir.join(format!(".{APP_DIR}.yaml")),
            dir.join(format!(".{APP_DIR}")).join("config.yaml"),
        ]
    });
    let system_wide =
        std::iter::once_with(|| PathBuf::from("/etc").join(APP_DIR).join("config.yaml"));

    user_config.chain(home_dotfiles).chain(system_wide)
}

/// Config candidates for one lookup.
///
/// An override replaces the default search entirely instead of being tried
/// first.
pub fn resolve(override_path: Option<PathBuf>) -> impl Iterator<Item = PathBuf> {
    match override_path {
        Some(path) => Either::Left(std::iter::once(path)),
        None => Either::Right(defaults()),
    }
}

/// The default cache file location, in the per-user local data directory.
///
/// Returns `None` on platforms without such a directory.
pub fn default_cache_file() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join(APP_DIR).join(CACHE_FILE_NAME))
}
