//! Authentication: turning a raw token into an [`AuthContext`] with trusted claims.

use crate::{AuthError, ClaimSet, Keystore, TokenVerifier};

/// Authentication information associated with a request.
///
/// A context holds at most one claim set and at most one raw token. Contexts are never mutated
/// by the crate; authentication produces a new context derived from the provided one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthContext {
    claims: Option<ClaimSet>,
    token: Option<String>,
}

impl AuthContext {
    /// Creates a context without authentication information.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the claims associated with the request, if any.
    pub fn claims(&self) -> Option<&ClaimSet> {
        self.claims.as_ref()
    }

    /// Returns the raw token associated with the request, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Derives a context containing the specified claims. The raw token is dropped.
    #[must_use]
    pub fn with_claims(&self, claims: ClaimSet) -> Self {
        Self {
            claims: Some(claims),
            token: None,
        }
    }

    /// Derives a context containing the specified raw token and claims.
    #[must_use]
    pub fn with_auth_info(&self, token: impl Into<String>, claims: ClaimSet) -> Self {
        Self {
            claims: Some(claims),
            token: Some(token.into()),
        }
    }
}

/// Authentication logic.
///
/// Authentication is not authorization; implementations only establish which claims
/// the request carries. Any `Fn(&AuthContext, &str, &dyn Keystore) -> Result<AuthContext, AuthError>`
/// closure is an authenticator.
pub trait Authenticate {
    /// Authenticates `token` using the keys in `store`. On success, returns a context derived
    /// from `context` containing the token claims.
    fn authenticate(
        &self,
        context: &AuthContext,
        token: &str,
        store: &dyn Keystore,
    ) -> Result<AuthContext, AuthError>;
}

impl<F> Authenticate for F
where
    F: Fn(&AuthContext, &str, &dyn Keystore) -> Result<AuthContext, AuthError>,
{
    fn authenticate(
        &self,
        context: &AuthContext,
        token: &str,
        store: &dyn Keystore,
    ) -> Result<AuthContext, AuthError> {
        self(context, token, store)
    }
}

/// Default authenticator verifying tokens with a [`TokenVerifier`].
///
/// An empty token is authenticated with an empty claim set; rejecting such requests
/// is left to the authorizer.
#[derive(Debug, Clone, Default)]
pub struct DefaultAuthenticator {
    verifier: TokenVerifier,
}

impl DefaultAuthenticator {
    /// Creates an authenticator with the specified verifier.
    pub fn new(verifier: TokenVerifier) -> Self {
        Self { verifier }
    }
}

impl Authenticate for DefaultAuthenticator {
    fn authenticate(
        &self,
        context: &AuthContext,
        token: &str,
        store: &dyn Keystore,
    ) -> Result<AuthContext, AuthError> {
        if token.is_empty() {
            tracing::debug!("no token provided; authenticating with empty claims");
            return Ok(context.with_claims(ClaimSet::new()));
        }
        let claims = self.verifier.verify(token, store)?;
        Ok(context.with_auth_info(token, claims))
    }
}
