//! Configuration loading for the discovery cache.
//!
//! Reads the first existing file among the candidate paths and parses it as
//! YAML.

use std::path::{Path, PathBuf};

use config_core::Config;

/// Environment variable overriding the configuration file path.
pub const CONFIG_ENV_VAR: &str = "DISCOVERY_CACHE_CONFIG";

/// A configuration along with the file it was loaded from.
#[derive(Debug)]
pub struct Loaded {
    /// The parsed configuration.
    pub config: Config,

    /// The file it was read from.
    pub path: PathBuf,
}

/// Failure to obtain the raw text of a discovery cache config file.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// Every candidate location was checked and none holds a file.
    #[error("no discovery cache config at any of {paths:?}")]
    NotFound {
        /// Candidate locations, in the order they were checked.
        paths: Vec<PathBuf>,
    },

    /// A config file exists but reading it failed.
    #[error("reading discovery cache config {path}: {source}")]
    Read {
        /// The config file that failed to read.
        path: PathBuf,

        /// I/O failure from the filesystem.
        #[source]
        source: std::io::Error,
    },
}

/// Failure to load a discovery cache config.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// No config text could be obtained.
    #[error(transparent)]
    Read(ReadError),

    /// The config file is not a valid discovery cache config.
    #[error("parsing discovery cache config {path}: {source}")]
    Parse {
        /// The config file that failed to parse.
        path: PathBuf,

        /// YAML syntax or schema error.
        #[source]
        source: serde_yaml_bw::Error,
    },
}

/// Load the config honoring [`CONFIG_ENV_VAR`].
///
/// When the variable is set its path is the only candidate, and a missing
/// file there is an error rather than a fallback to the default locations.
#[cfg(feature = "env")]
pub async fn with_default_env_var() -> Result<Loaded, WithDefaultEnvVarError> {
    let override_path = envfury::maybe(CONFIG_ENV_VAR).map_err(WithDefaultEnvVarError::Env)?;
    with(override_path)
        .await
        .map_err(WithDefaultEnvVarError::Load)
}

/// Failure of [`with_default_env_var`].
#[cfg(feature = "env")]
#[derive(Debug, thiserror::Error)]
pub enum WithDefaultEnvVarError {
    /// [`CONFIG_ENV_VAR`] is set but does not hold a usable path.
    #[error("invalid DISCOVERY_CACHE_CONFIG: {0}")]
    Env(#[source] envfury::Error<envfury::ValueError<<PathBuf as std::str::FromStr>::Err>>),

    /// The selected config could not be loaded.
    #[error(transparent)]
    Load(LoadError),
}

/// Load the config from `override_path` alone, or from the first default
/// location holding a file.
pub async fn with(override_path: Option<PathBuf>) -> Result<Loaded, LoadError> {
    let candidates: Vec<PathBuf> = config_paths::resolve(override_path).collect();
    let (path, contents) = read_first(&candidates).await.map_err(LoadError::Read)?;

    match parse_str(&contents) {
        Ok(config) => Ok(Loaded { config, path }),
        Err(source) => Err(LoadError::Parse { path, source }),
    }
}

/// Parse a YAML document into a [`Config`].
pub fn parse_str(contents: &str) -> Result<Config, serde_yaml_bw::Error> {
    serde_yaml_bw::from_str(contents)
}

/// Read the first candidate that exists, returning its path and text.
///
/// Absent candidates are skipped; any other I/O failure stops the search.
pub async fn read_first<P>(candidates: &[P]) -> Result<(PathBuf, String), ReadError>
where
    P: AsRef<Path>,
{
    for candidate in candidates.iter().map(AsRef::as_ref) {
        let source = match tokio::fs::read_to_string(candidate).await {
            Ok(contents) => return Ok((candidate.to_owned(), contents)),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => continue,
            Err(error) => error,
        };
        return Err(ReadError::Read {
            path: candidate.to_owned(),
            source,
        });
    }

    Err(ReadError::NotFound {
        paths: candidates.iter().map(|c| c.as_ref().to_owned()).collect(),
    })
}
