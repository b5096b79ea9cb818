//! Discovery service response parsing.

use discovery_record::{DiscoveryRecord, InvalidRecordError, Records};

/// Body of the `services` response.
#[derive(Debug, serde::Deserialize)]
struct ServicesResponse {
    /// Service entries.
    value: Vec<ServiceInfo>,
}

/// A single service entry; fields not listed are ignored.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceInfo {
    /// Capability name.
    capability: String,

    /// Endpoint to call the capability at.
    service_endpoint_uri: String,

    /// Resource to scope the access token to.
    service_resource_id: String,

    /// API version.
    service_api_version: String,
}

/// Errors returned while parsing the `services` response.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The body is not the expected JSON document.
    #[error("invalid JSON: {0}")]
    Json(#[source] serde_json::Error),

    /// A service entry is not a valid discovery record.
    #[error("invalid entry for capability \"{capability}\": {source}")]
    InvalidRecord {
        /// The capability of the offending entry.
        capability: String,

        /// The validation failure.
        #[source]
        source: InvalidRecordError,
    },

    /// The same capability is listed twice.
    #[error("duplicate capability \"{0}\"")]
    DuplicateCapability(String),
}

/// Parse the `services` response body into discovery records.
pub fn parse(body: &[u8]) -> Result<Records, ParseError> {
    let response: ServicesResponse = serde_json::from_slice(body).map_err(ParseError::Json)?;

    let mut records = Records::with_capacity(response.value.len());
    for info in response.value {
        let ServiceInfo {
            capability,
            service_endpoint_uri,
            service_resource_id,
            service_api_version,
        } = info;

        let record = match DiscoveryRecord::parse(
            &service_endpoint_uri,
            service_resource_id,
            service_api_version,
        ) {
            Ok(record) => record,
            Err(source) => return Err(ParseError::InvalidRecord { capability, source }),
        };

        if records.contains_key(&capability) {
            return Err(ParseError::DuplicateCapability(capability));
        }
        records.insert(capability, record);
    }

    Ok(records)
}
