//! Scope-based authorization.

use crate::{error::AuthorizationFailure, AuthContext, AuthError};

/// Name of the private claim storing token scopes by default.
pub const DEFAULT_SCOPES_CLAIM: &str = "scopes";

/// Authorization logic.
///
/// Any `Fn(&AuthContext, &[String]) -> Result<(), AuthError>` closure is an authorizer.
pub trait Authorize {
    /// Checks whether the request described by `context` may perform an operation
    /// requiring `required_scopes`.
    fn authorize(&self, context: &AuthContext, required_scopes: &[String]) -> Result<(), AuthError>;
}

impl<F> Authorize for F
where
    F: Fn(&AuthContext, &[String]) -> Result<(), AuthError>,
{
    fn authorize(&self, context: &AuthContext, required_scopes: &[String]) -> Result<(), AuthError> {
        self(context, required_scopes)
    }
}

/// Default authorizer comparing scopes held by the token with the required ones.
///
/// Held scopes are read from a claim (by default, [`DEFAULT_SCOPES_CLAIM`]) containing
/// either a single string or an array of strings. Every required scope must be held
/// verbatim (scopes are case-sensitive); holding extra scopes is fine.
///
/// Authentication is required even if no scopes are required: a context without claims,
/// or with an empty claim set, is rejected.
///
/// # Examples
///
/// ```
/// # use jwt_gate::{claims, AuthContext, Authorize, ScopeAuthorizer};
/// let context = AuthContext::new().with_claims(claims!["scopes", ["read", "write"]]);
/// let authorizer = ScopeAuthorizer::default();
/// assert!(authorizer.authorize(&context, &["read".to_owned()]).is_ok());
/// assert!(authorizer.authorize(&context, &["admin".to_owned()]).is_err());
/// assert!(authorizer.authorize(&AuthContext::new(), &[]).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ScopeAuthorizer {
    scopes_claim: String,
}

impl Default for ScopeAuthorizer {
    fn default() -> Self {
        Self {
            scopes_claim: DEFAULT_SCOPES_CLAIM.to_owned(),
        }
    }
}

impl ScopeAuthorizer {
    /// Creates an authorizer reading scopes from the specified claim. This can be used
    /// to interoperate with third parties using a collision-resistant claim name.
    pub fn with_scopes_claim(claim: impl Into<String>) -> Self {
        Self {
            scopes_claim: claim.into(),
        }
    }

    /// Returns the name of the claim holding scopes.
    pub fn scopes_claim(&self) -> &str {
        &self.scopes_claim
    }
}

impl Authorize for ScopeAuthorizer {
    fn authorize(&self, context: &AuthContext, required_scopes: &[String]) -> Result<(), AuthError> {
        let claims = match context.claims() {
            Some(claims) if !claims.is_empty() => claims,
            _ => {
                tracing::debug!("rejected request without claims");
                return Err(AuthError::authorization(
                    AuthorizationFailure::AuthenticationRequired,
                ));
            }
        };

        let held = claims.strings(&self.scopes_claim);
        if let Some(missing) = required_scopes.iter().find(|&scope| !held.contains(scope)) {
            tracing::debug!(
                subject = %claims.subject(),
                missing_scope = missing.as_str(),
                "rejected request with insufficient scopes"
            );
            return Err(AuthError::authorization(AuthorizationFailure::MissingScopes {
                held,
                required: required_scopes.to_vec(),
            }));
        }
        Ok(())
    }
}
