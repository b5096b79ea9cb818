//! Discovery provider interface.

use discovery_record::Records;

/// Abstract discovery provider interface.
pub trait DiscoveryProvider: Send + Sync {
    /// The error type for the discovery operation.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch every capability reachable by the user the access token was
    /// issued to, in a single round trip.
    fn discover_all<'a>(
        &'a self,
        access_token: &'a str,
    ) -> impl std::future::Future<Output = Result<Records, Self::Error>> + Send + 'a;
}
