//! Authentication followed by authorization.

use http::HeaderMap;

use std::fmt;

use crate::{
    AuthContext, AuthError, Authenticate, Authorize, DefaultAuthenticator, Keystore,
    ScopeAuthorizer, TokenExtractor,
};

/// Request rejected by [`Secure`].
#[derive(Debug)]
pub struct Rejection {
    /// Context at the moment of rejection. If authentication has succeeded, but authorization
    /// has failed, this is the authenticated context; otherwise, it is the original one.
    pub context: AuthContext,
    /// Reason of the rejection.
    pub error: AuthError,
}

impl fmt::Display for Rejection {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, formatter)
    }
}

impl std::error::Error for Rejection {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Security check that authenticates a request with a shared keystore, and then
/// authorizes it against required scopes.
///
/// # Examples
///
/// ```
/// # use jwt_gate::{claims, issue_token, AuthContext, ErrorKind, Key, NamedKeystore, Keystore, Secure};
/// let store = NamedKeystore::new();
/// store.trust("alice", Key::hmac(b"alice's secret"))?;
/// let secure = Secure::new(store);
///
/// let claims = claims!["iss", "alice", "sub", "bob", "scopes", ["read"]];
/// let token = issue_token(&Key::hmac(b"alice's secret"), &claims)?;
/// let context = secure.check(&AuthContext::new(), &token, &["read".to_owned()])?;
/// assert_eq!(context.claims().unwrap().subject(), "bob");
///
/// let rejection = secure
///     .check(&AuthContext::new(), &token, &["write".to_owned()])
///     .unwrap_err();
/// assert_eq!(rejection.error.kind(), ErrorKind::AuthorizationFailed);
/// // The authenticated context is still available.
/// assert_eq!(rejection.context.token(), Some(token.as_str()));
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Secure<S, A = DefaultAuthenticator, Z = ScopeAuthorizer> {
    store: S,
    authenticator: A,
    authorizer: Z,
    extractor: TokenExtractor,
}

impl<S: Keystore> Secure<S> {
    /// Creates a check with the default authentication and authorization logic.
    pub fn new(store: S) -> Self {
        Self::with(store, DefaultAuthenticator::default(), ScopeAuthorizer::default())
    }
}

impl<S, A, Z> Secure<S, A, Z>
where
    S: Keystore,
    A: Authenticate,
    Z: Authorize,
{
    /// Creates a check with custom authentication and authorization logic.
    pub fn with(store: S, authenticator: A, authorizer: Z) -> Self {
        Self {
            store,
            authenticator,
            authorizer,
            extractor: TokenExtractor::default(),
        }
    }

    /// Sets the extractor used by [`Self::check_headers()`].
    #[must_use]
    pub fn with_extractor(mut self, extractor: TokenExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Returns the keystore used for authentication.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Authenticates `token` and authorizes the resulting context against `required_scopes`.
    pub fn check(
        &self,
        context: &AuthContext,
        token: &str,
        required_scopes: &[String],
    ) -> Result<AuthContext, Rejection> {
        let authenticated = self
            .authenticator
            .authenticate(context, token, &self.store)
            .map_err(|error| Rejection {
                context: context.clone(),
                error,
            })?;

        match self.authorizer.authorize(&authenticated, required_scopes) {
            Ok(()) => Ok(authenticated),
            Err(error) => Err(Rejection {
                context: authenticated,
                error,
            }),
        }
    }

    /// Extracts the token from request `headers` and performs [`Self::check()`]. An absent
    /// token is treated as an empty one.
    pub fn check_headers(
        &self,
        context: &AuthContext,
        headers: &HeaderMap,
        required_scopes: &[String],
    ) -> Result<AuthContext, Rejection> {
        let token = self.extractor.extract(headers).map_err(|error| Rejection {
            context: context.clone(),
            error,
        })?;
        self.check(context, token.as_deref().unwrap_or_default(), required_scopes)
    }
}
