//! Token verification: from a raw token string to trusted claims.

use chrono::{DateTime, Utc};

use crate::{
    AuthError, ClaimSet, Keystore, TimeOptions, TokenMetadata, UntrustedToken, ValidationError,
};

/// Verifier of raw tokens against a [`Keystore`].
///
/// Verification proceeds as follows:
///
/// 1. The token is parsed, and its claims are inspected without verification
///    to determine the issuer (`iss` claim; an absent claim is treated as an empty string).
/// 2. The key trusted for the issuer is retrieved from the keystore.
/// 3. The signature algorithm is chosen based on the key family; the `alg` field
///    of the token header must match it.
/// 4. The signature is checked.
/// 5. `exp` and `nbf` claims are checked against the current time, if present.
///
/// Any error is annotated with [`TokenMetadata`] describing the offending token.
///
/// # Examples
///
/// ```
/// # use jwt_gate::{claims, issue_token, Key, SingleKeystore, TokenVerifier};
/// let key = Key::hmac(b"super_secret_key_donut_steel");
/// let token = issue_token(&key, &claims!["iss", "alice", "sub", "bob"])?;
///
/// let store = SingleKeystore::new(key);
/// let claims = TokenVerifier::default().verify(&token, &store)?;
/// assert_eq!(claims.subject(), "bob");
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct TokenVerifier<F = fn() -> DateTime<Utc>> {
    time_options: TimeOptions<F>,
}

/// Uses the default [`TimeOptions`]: zero leeway and the system clock.
impl Default for TokenVerifier {
    fn default() -> Self {
        Self::new(TimeOptions::default())
    }
}

impl<F: Fn() -> DateTime<Utc>> TokenVerifier<F> {
    /// Creates a verifier with the specified time options.
    pub fn new(time_options: TimeOptions<F>) -> Self {
        Self { time_options }
    }

    /// Returns time options used by this verifier.
    pub fn time_options(&self) -> &TimeOptions<F> {
        &self.time_options
    }

    /// Verifies `raw_token` using keys from `store` and returns its claims.
    pub fn verify(&self, raw_token: &str, store: &dyn Keystore) -> Result<ClaimSet, AuthError> {
        self.verify_inner(raw_token, store).map_err(|err| {
            tracing::debug!(kind = %err.kind(), error = %err, "token verification failed");
            err.with_metadata(TokenMetadata::from_token(raw_token))
        })
    }

    fn verify_inner(&self, raw_token: &str, store: &dyn Keystore) -> Result<ClaimSet, AuthError> {
        let token = UntrustedToken::new(raw_token)?;
        let claims = token.claims_unverified()?;
        let issuer = claims.issuer();
        let key = store
            .get(&issuer)
            .ok_or_else(|| AuthError::untrusted_issuer(&issuer))?;

        key.verify_integrity(&token).map_err(|err| {
            if let ValidationError::AlgorithmMismatch { .. } = &err {
                tracing::debug!(
                    issuer = issuer.as_str(),
                    family = %key.family(),
                    alg = token.algorithm(),
                    "token algorithm does not match key trusted for issuer"
                );
            }
            err
        })?;

        claims
            .validate_expiration(&self.time_options)?
            .validate_maturity(&self.time_options)?;
        tracing::debug!(
            issuer = issuer.as_str(),
            alg = token.algorithm(),
            "verified token"
        );
        Ok(claims)
    }
}
