//! Deterministic stand-ins for the authenticator and discovery provider.

use std::sync::{Arc, Mutex};

use authenticator_core::{
    AcquireTokenError, AcquireTokenSilentError, AuthenticatedToken, Authenticator,
};
use discovery_provider_core::DiscoveryProvider;
use discovery_record::{DiscoveryRecord, Records};

/// Shared state of a [`FakeAuthenticator`].
#[derive(Debug, Default)]
struct AuthState {
    /// The user every successful acquisition resolves to.
    user_id: String,

    /// When set, every full acquisition fails with this error.
    failure: Option<AcquireTokenError>,

    /// Resources passed to full acquisitions, in call order.
    acquired: Vec<String>,

    /// Resources passed to silent acquisitions, in call order.
    acquired_silently: Vec<String>,
}

/// Authenticator that signs in as a configurable user.
#[derive(Debug, Clone, Default)]
pub struct FakeAuthenticator {
    /// State shared with clones kept by the test.
    state: Arc<Mutex<AuthState>>,
}

impl FakeAuthenticator {
    /// An authenticator signed in as the given user.
    pub fn signed_in(user_id: &str) -> Self {
        let authenticator = Self::default();
        authenticator.switch_user(user_id);
        authenticator
    }

    /// Change the signed-in user.
    pub fn switch_user(&self, user_id: &str) {
        self.state.lock().unwrap().user_id = user_id.to_owned();
    }

    /// Make every following full acquisition fail.
    pub fn fail_with(&self, error: AcquireTokenError) {
        self.state.lock().unwrap().failure = Some(error);
    }

    /// Resources passed to full acquisitions so far.
    pub fn acquired(&self) -> Vec<String> {
        self.state.lock().unwrap().acquired.clone()
    }

    /// Resources passed to silent acquisitions so far.
    pub fn acquired_silently(&self) -> Vec<String> {
        self.state.lock().unwrap().acquired_silently.clone()
    }
}

impl Authenticator for FakeAuthenticator {
    async fn acquire_token<'a>(
        &'a self,
        resource_id: &'a str,
    ) -> Result<AuthenticatedToken, AcquireTokenError> {
        let mut state = self.state.lock().unwrap();
        state.acquired.push(resource_id.to_owned());

        if let Some(error) = &state.failure {
            return Err(error.clone());
        }

        Ok(AuthenticatedToken {
            access_token: format!("token:{}:{resource_id}", state.user_id),
            user_id: state.user_id.clone(),
        })
    }

    async fn acquire_token_silent<'a>(
        &'a self,
        resource_id: &'a str,
    ) -> Result<String, AcquireTokenSilentError> {
        let mut state = self.state.lock().unwrap();
        state.acquired_silently.push(resource_id.to_owned());

        Ok(format!("silent:{}:{resource_id}", state.user_id))
    }
}

/// Error returned by a failing [`FakeProvider`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("fake discovery failure: {0}")]
pub struct FakeDiscoveryError(pub String);

/// Shared state of a [`FakeProvider`].
#[derive(Debug)]
struct ProviderState {
    /// What the next discovery returns.
    outcome: Result<Records, FakeDiscoveryError>,

    /// Access tokens passed to discovery calls, in call order.
    tokens: Vec<String>,
}

/// Discovery provider returning a configurable result.
#[derive(Debug, Clone)]
pub struct FakeProvider {
    /// State shared with clones kept by the test.
    state: Arc<Mutex<ProviderState>>,
}

impl FakeProvider {
    /// A provider that discovers the given records.
    pub fn returning(records: Records) -> Self {
        Self {
            state: Arc::new(Mutex::new(ProviderState {
                outcome: Ok(records),
                tokens: Vec::new(),
            })),
        }
    }

    /// Make every following discovery fail.
    pub fn fail_with(&self, message: &str) {
        self.state.lock().unwrap().outcome = Err(FakeDiscoveryError(message.to_owned()));
    }

    /// Number of discovery calls so far.
    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().tokens.len()
    }

    /// Access tokens passed to discovery calls so far.
    pub fn tokens(&self) -> Vec<String> {
        self.state.lock().unwrap().tokens.clone()
    }
}

impl DiscoveryProvider for FakeProvider {
    type Error = FakeDiscoveryError;

    async fn discover_all<'a>(&'a self, access_token: &'a str) -> Result<Records, Self::Error> {
        let mut state = self.state.lock().unwrap();
        state.tokens.push(access_token.to_owned());
        state.outcome.clone()
    }
}

/// A record for the given capability on a per-capability host.
pub fn record(capability: &str) -> DiscoveryRecord {
    let host = format!("{}.example.com", capability.to_lowercase());
    DiscoveryRecord::parse(
        &format!("https://{host}/api/v1.0"),
        format!("https://{host}/"),
        "v1.0",
    )
    .unwrap()
}

/// Records for the given capabilities.
pub fn records(capabilities: &[&str]) -> Records {
    capabilities
        .iter()
        .map(|capability| ((*capability).to_owned(), record(capability)))
        .collect()
}
