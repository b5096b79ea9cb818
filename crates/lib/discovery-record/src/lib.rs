//! Capability discovery data types.
//!
//! A [`DiscoveryRecord`] describes how to reach one capability of the cloud
//! API, and a [`CachedDiscoverySet`] binds a complete set of them to the
//! identity they were discovered for.

use std::collections::HashMap;

/// Well-known capabilities exposed by the discovery service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Mail API.
    Mail,

    /// Calendar API.
    Calendar,

    /// Contacts API.
    Contacts,

    /// Personal file storage API.
    MyFiles,
}

impl Capability {
    /// All well-known capabilities.
    pub const ALL: [Self; 4] = [Self::Mail, Self::Calendar, Self::Contacts, Self::MyFiles];

    /// The canonical capability name, as used for the record map keys.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mail => "Mail",
            Self::Calendar => "Calendar",
            Self::Contacts => "Contacts",
            Self::MyFiles => "MyFiles",
        }
    }
}

impl core::fmt::Display for Capability {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The given name is not one of the well-known capabilities.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown capability \"{0}\"")]
pub struct UnknownCapabilityError(pub String);

impl core::str::FromStr for Capability {
    type Err = UnknownCapabilityError;

    /// Parse a capability name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|capability| capability.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCapabilityError(s.to_owned()))
    }
}

/// Errors returned while constructing a [`DiscoveryRecord`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRecordError {
    /// The service endpoint is not a valid absolute URI.
    #[error("invalid service endpoint \"{endpoint}\": {source}")]
    Endpoint {
        /// The offending endpoint text.
        endpoint: String,

        /// Underlying URL parse error.
        #[source]
        source: url::ParseError,
    },

    /// The service resource ID is empty.
    #[error("service resource id is empty")]
    EmptyResourceId,

    /// The API version is empty.
    #[error("api version is empty")]
    EmptyApiVersion,
}

/// Endpoint metadata for a single capability.
///
/// Immutable once constructed; all fields are guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryRecord {
    /// Absolute endpoint for calling the capability's API.
    service_endpoint: url::Url,

    /// Resource the access token for this endpoint has to be scoped to.
    service_resource_id: String,

    /// Version tag of the capability's API surface.
    api_version: String,
}

impl DiscoveryRecord {
    /// Construct a record from an already parsed endpoint.
    pub fn new(
        service_endpoint: url::Url,
        service_resource_id: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Result<Self, InvalidRecordError> {
        let service_resource_id = service_resource_id.into();
        if service_resource_id.is_empty() {
            return Err(InvalidRecordError::EmptyResourceId);
        }

        let api_version = api_version.into();
        if api_version.is_empty() {
            return Err(InvalidRecordError::EmptyApiVersion);
        }

        Ok(Self {
            service_endpoint,
            service_resource_id,
            api_version,
        })
    }

    /// Construct a record from the textual endpoint form.
    pub fn parse(
        service_endpoint: &str,
        service_resource_id: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Result<Self, InvalidRecordError> {
        let endpoint =
            url::Url::parse(service_endpoint).map_err(|source| InvalidRecordError::Endpoint {
                endpoint: service_endpoint.to_owned(),
                source,
            })?;
        Self::new(endpoint, service_resource_id, api_version)
    }

    /// Absolute endpoint for calling the capability's API.
    pub fn service_endpoint(&self) -> &url::Url {
        &self.service_endpoint
    }

    /// Resource the access token for this endpoint has to be scoped to.
    pub fn service_resource_id(&self) -> &str {
        &self.service_resource_id
    }

    /// Version tag of the capability's API surface.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }
}

/// Capability name to record mapping.
pub type Records = HashMap<String, DiscoveryRecord>;

/// A complete discovery result bound to the identity it was resolved for.
///
/// Only ever produced whole by a discovery refresh (or by decoding a
/// persisted one); there is no way to patch an existing set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedDiscoverySet {
    /// Unique identifier of the user this set was resolved for.
    owner_identity: String,

    /// The discovered capabilities.
    records: Records,
}

impl CachedDiscoverySet {
    /// Bind a full set of records to an owner identity.
    pub fn new(owner_identity: impl Into<String>, records: Records) -> Self {
        Self {
            owner_identity: owner_identity.into(),
            records,
        }
    }

    /// Unique identifier of the user this set was resolved for.
    pub fn owner_identity(&self) -> &str {
        &self.owner_identity
    }

    /// Whether the set was resolved for the given user.
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_identity == user_id
    }

    /// All discovered capabilities.
    pub fn records(&self) -> &Records {
        &self.records
    }

    /// Look up the record for a capability name.
    pub fn get(&self, capability: &str) -> Option<&DiscoveryRecord> {
        self.records.get(capability)
    }

    /// Take the records out of the set.
    pub fn into_records(self) -> Records {
        self.records
    }
}
