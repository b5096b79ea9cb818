//! Authenticator serving pre-issued access tokens.
//!
//! Useful where sign-in happens out of band and the tokens are handed to the
//! application through configuration. It never prompts and never cancels.

use std::collections::HashMap;

use authenticator_core::{
    AcquireTokenError, AcquireTokenSilentError, AuthenticatedToken, Authenticator,
};

/// Error code reported when no token is configured for a resource.
pub const NO_TOKEN_FOR_RESOURCE: &str = "no_token_for_resource";

/// Authenticator backed by a fixed set of per-resource tokens.
#[derive(Debug, Clone)]
pub struct StaticAuthenticator {
    /// Unique identifier of the user the tokens were issued to.
    user_id: String,

    /// Access tokens keyed by resource ID.
    access_tokens: HashMap<String, String>,
}

impl StaticAuthenticator {
    /// Create an authenticator for the given user and tokens.
    pub fn new(user_id: impl Into<String>, access_tokens: HashMap<String, String>) -> Self {
        Self {
            user_id: user_id.into(),
            access_tokens,
        }
    }

    /// Look up the token for a resource.
    fn token(&self, resource_id: &str) -> Option<&String> {
        let token = self.access_tokens.get(resource_id);
        if token.is_none() {
            tracing::debug!(resource_id, "no static access token for resource");
        }
        token
    }
}

/// Describe the missing token.
fn missing_token_description(resource_id: &str) -> String {
    format!("no access token configured for resource {resource_id}")
}

impl Authenticator for StaticAuthenticator {
    async fn acquire_token<'a>(
        &'a self,
        resource_id: &'a str,
    ) -> Result<AuthenticatedToken, AcquireTokenError> {
        let access_token = self
            .token(resource_id)
            .ok_or_else(|| AcquireTokenError::Failed {
                code: NO_TOKEN_FOR_RESOURCE.to_owned(),
                description: missing_token_description(resource_id),
            })?;

        Ok(AuthenticatedToken {
            access_token: access_token.clone(),
            user_id: self.user_id.clone(),
        })
    }

    async fn acquire_token_silent<'a>(
        &'a self,
        resource_id: &'a str,
    ) -> Result<String, AcquireTokenSilentError> {
        self.token(resource_id)
            .cloned()
            .ok_or_else(|| AcquireTokenSilentError {
                code: NO_TOKEN_FOR_RESOURCE.to_owned(),
                description: missing_token_description(resource_id),
            })
    }
}
