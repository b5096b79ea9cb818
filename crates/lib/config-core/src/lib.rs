//! Shared configuration types for the discovery cache.

/// Default discovery service endpoint.
pub const DEFAULT_DISCOVERY_ENDPOINT: &str = "https://api.office.com/discovery/v1.0/me/";

/// Default resource the discovery service tokens are scoped to.
pub const DEFAULT_DISCOVERY_RESOURCE_ID: &str = "https://api.office.com/discovery/";

/// Root configuration.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    /// Discovery service settings.
    #[cfg_attr(feature = "serde", serde(default))]
    pub discovery: DiscoveryConfig,

    /// Cache file settings.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cache: CacheConfig,

    /// The signed-in identity and its tokens.
    pub identity: IdentityConfig,
}

/// Discovery service settings.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryConfig {
    /// Discovery service endpoint.
    #[cfg_attr(feature = "serde", serde(default = "default_endpoint"))]
    pub endpoint: String,

    /// Resource the discovery service tokens are scoped to.
    #[cfg_attr(feature = "serde", serde(default = "default_resource_id"))]
    pub resource_id: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            resource_id: default_resource_id(),
        }
    }
}

/// Default for [`DiscoveryConfig::endpoint`].
fn default_endpoint() -> String {
    DEFAULT_DISCOVERY_ENDPOINT.to_owned()
}

/// Default for [`DiscoveryConfig::resource_id`].
fn default_resource_id() -> String {
    DEFAULT_DISCOVERY_RESOURCE_ID.to_owned()
}

/// Cache file settings.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CacheConfig {
    /// Cache file path override. Defaults to the per-user local data dir.
    pub path: Option<std::path::PathBuf>,
}

/// The signed-in identity.
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IdentityConfig {
    /// Stable unique identifier of the user.
    pub user_id: String,

    /// Pre-issued access tokens keyed by resource ID.
    #[cfg_attr(feature = "serde", serde(default))]
    pub access_tokens: std::collections::HashMap<String, String>,
}
