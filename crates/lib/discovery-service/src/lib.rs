//! Discovery cache service.
//!
//! The [`DiscoveryCacheService`] is the only place that decides whether the
//! persisted discovery set can be trusted. A cached set is served only if it
//! exists, holds the requested capability and still belongs to the currently
//! signed-in user; otherwise the whole set is rediscovered and replaced.

use authenticator_core::{AcquireTokenError, AcquireTokenSilentError, Authenticator};
use discovery_provider_core::DiscoveryProvider;
use discovery_record::{CachedDiscoverySet, DiscoveryRecord, Records};
use discovery_store::DiscoveryCacheStore;

/// Errors returned by the discovery cache service.
#[derive(Debug, thiserror::Error)]
pub enum Error<Provider: DiscoveryProvider> {
    /// The user canceled the sign-in.
    #[error("sign-in canceled")]
    AuthCanceled,

    /// The authenticator failed.
    #[error("authentication failed ({code}): {description}")]
    AuthFailed {
        /// Machine-readable error code.
        code: String,

        /// Human-readable error description.
        description: String,
    },

    /// Authentication succeeded but the discovery call failed.
    #[error("discovery service unavailable: {0}")]
    DiscoveryUnavailable(#[source] Provider::Error),

    /// Loading the cache failed.
    #[error("unable to load discovery cache: {0}")]
    StorageLoad(#[source] discovery_store::LoadError),

    /// Saving the refreshed cache failed.
    #[error("unable to save discovery cache: {0}")]
    StorageSave(#[source] discovery_store::SaveError),

    /// The signed-in user has no such capability, even after a refresh.
    #[error("capability \"{0}\" is not available to the signed-in user")]
    CapabilityNotFound(String),
}

impl<Provider: DiscoveryProvider> Error<Provider> {
    /// Whether this error is the user deliberately canceling sign-in.
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::AuthCanceled)
    }
}

impl<Provider: DiscoveryProvider> From<AcquireTokenError> for Error<Provider> {
    fn from(error: AcquireTokenError) -> Self {
        match error {
            AcquireTokenError::Canceled => Self::AuthCanceled,
            AcquireTokenError::Failed { code, description } => {
                Self::AuthFailed { code, description }
            }
        }
    }
}

/// Why the cached set is being replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshReason {
    /// Nothing usable is cached.
    Absent,

    /// The cached set lacks the requested capability.
    MissingCapability,

    /// The cached set belongs to another user.
    IdentityMismatch,
}

impl RefreshReason {
    /// Short name for logging.
    const fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::MissingCapability => "missing_capability",
            Self::IdentityMismatch => "identity_mismatch",
        }
    }
}

/// Parameters for [`DiscoveryCacheService::new`].
pub struct Params<Auth, Provider> {
    /// The authenticator used to establish the user identity.
    pub authenticator: Auth,

    /// The discovery provider used to refresh the cache.
    pub provider: Provider,

    /// The persistent cache.
    pub store: DiscoveryCacheStore,

    /// The resource the discovery service tokens are scoped to.
    pub discovery_resource_id: String,
}

/// Serves capability discovery results, from the cache when it is valid.
pub struct DiscoveryCacheService<Auth, Provider> {
    /// The authenticator used to establish the user identity.
    authenticator: Auth,

    /// The discovery provider used to refresh the cache.
    provider: Provider,

    /// The persistent cache.
    store: DiscoveryCacheStore,

    /// The resource the discovery service tokens are scoped to.
    discovery_resource_id: String,
}

impl<Auth, Provider> DiscoveryCacheService<Auth, Provider>
where
    Auth: Authenticator,
    Provider: DiscoveryProvider,
{
    /// Create a new service.
    pub fn new(params: Params<Auth, Provider>) -> Self {
        let Params {
            authenticator,
            provider,
            store,
            discovery_resource_id,
        } = params;

        Self {
            authenticator,
            provider,
            store,
            discovery_resource_id,
        }
    }

    /// The persistent cache backing this service.
    pub fn store(&self) -> &DiscoveryCacheStore {
        &self.store
    }

    /// Get the discovery record for a single capability.
    pub async fn get_capability(&self, name: &str) -> Result<DiscoveryRecord, Error<Provider>> {
        let reason = match self.load().await? {
            None => RefreshReason::Absent,
            Some(cached) => match cached.get(name) {
                None => RefreshReason::MissingCapability,
                Some(record) => {
                    if self
                        .is_current_owner(&cached, record.service_resource_id())
                        .await?
                    {
                        tracing::debug!(capability = name, "serving capability from cache");
                        return Ok(record.clone());
                    }
                    RefreshReason::IdentityMismatch
                }
            },
        };

        let fresh = self.refresh(reason).await?;
        fresh
            .get(name)
            .cloned()
            .ok_or_else(|| Error::CapabilityNotFound(name.to_owned()))
    }

    /// Get the discovery records for every capability.
    pub async fn get_all_capabilities(&self) -> Result<Records, Error<Provider>> {
        let reason = match self.load().await? {
            None => RefreshReason::Absent,
            Some(cached) => {
                if self
                    .is_current_owner(&cached, &self.discovery_resource_id)
                    .await?
                {
                    tracing::debug!(
                        records = cached.records().len(),
                        "serving all capabilities from cache"
                    );
                    return Ok(cached.into_records());
                }
                RefreshReason::IdentityMismatch
            }
        };

        Ok(self.refresh(reason).await?.into_records())
    }

    /// Get an access token for calling a discovered capability.
    pub async fn access_token_for(
        &self,
        record: &DiscoveryRecord,
    ) -> Result<String, AcquireTokenSilentError> {
        self.authenticator
            .acquire_token_silent(record.service_resource_id())
            .await
    }

    /// Load the cached set.
    async fn load(&self) -> Result<Option<CachedDiscoverySet>, Error<Provider>> {
        self.store.load().await.map_err(Error::StorageLoad)
    }

    /// Check whether the cached set belongs to the user currently signed in
    /// for the given resource.
    async fn is_current_owner(
        &self,
        cached: &CachedDiscoverySet,
        resource_id: &str,
    ) -> Result<bool, Error<Provider>> {
        let token = self.authenticator.acquire_token(resource_id).await?;

        let matches = cached.is_owned_by(&token.user_id);
        if !matches {
            tracing::debug!(
                cached_owner = cached.owner_identity(),
                current_user = %token.user_id,
                "discovery cache belongs to another user"
            );
        }
        Ok(matches)
    }

    /// Rediscover every capability and replace the cached set.
    ///
    /// Nothing is written unless both authentication and discovery succeed.
    async fn refresh(&self, reason: RefreshReason) -> Result<CachedDiscoverySet, Error<Provider>> {
        tracing::info!(reason = reason.as_str(), "refreshing discovery cache");

        let token = self
            .authenticator
            .acquire_token(&self.discovery_resource_id)
            .await?;

        let records = self
            .provider
            .discover_all(&token.access_token)
            .await
            .map_err(Error::DiscoveryUnavailable)?;

        let set = CachedDiscoverySet::new(token.user_id, records);
        self.store.save(&set).await.map_err(Error::StorageSave)?;

        tracing::info!(
            owner_identity = set.owner_identity(),
            records = set.records().len(),
            "discovery cache refreshed"
        );

        Ok(set)
    }
}
