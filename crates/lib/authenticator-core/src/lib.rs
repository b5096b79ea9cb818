//! Authenticator interface.

/// A token obtained by a full acquisition, bound to the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedToken {
    /// The access token.
    pub access_token: String,

    /// Stable unique identifier of the user the token was issued to.
    pub user_id: String,
}

/// Errors returned by a full token acquisition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AcquireTokenError {
    /// The user canceled the interactive sign-in.
    #[error("sign-in canceled by the user")]
    Canceled,

    /// The authenticator reported a failure.
    #[error("authentication failed ({code}): {description}")]
    Failed {
        /// Machine-readable error code.
        code: String,

        /// Human-readable error description.
        description: String,
    },
}

/// The silent token acquisition failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("silent authentication failed ({code}): {description}")]
pub struct AcquireTokenSilentError {
    /// Machine-readable error code.
    pub code: String,

    /// Human-readable error description.
    pub description: String,
}

/// Abstract authenticator interface.
pub trait Authenticator: Send + Sync {
    /// Acquire a token for the given resource, establishing the user identity.
    ///
    /// May complete silently from cached credentials or prompt the user.
    fn acquire_token<'a>(
        &'a self,
        resource_id: &'a str,
    ) -> impl std::future::Future<Output = Result<AuthenticatedToken, AcquireTokenError>> + Send + 'a;

    /// Acquire an access token for the given resource without prompting.
    fn acquire_token_silent<'a>(
        &'a self,
        resource_id: &'a str,
    ) -> impl std::future::Future<Output = Result<String, AcquireTokenSilentError>> + Send + 'a;
}
