//! Token creation.

use crate::{ClaimSet, CreationError, Header, Key};

/// Creates a token with the specified claims and signs it with `key`.
///
/// The signature algorithm is determined by the key family, in the same way as during
/// verification. The token header has `typ` set to `JWT`.
///
/// # Errors
///
/// Returns [`CreationError::UnsupportedKey`] if the key cannot sign tokens (i.e., it is
/// a public key).
///
/// # Examples
///
/// ```
/// # use chrono::{Duration, Utc};
/// # use jwt_gate::{claims, issue_token, Key, TimeOptions, UntrustedToken};
/// let alice_key = Key::hmac(b"alice's secret");
/// let claims = claims!["iss", "alice", "sub", "bob", "scopes", ["read", "write"]]
///     .set_duration_and_issuance(&TimeOptions::default(), Duration::hours(1));
/// let token = issue_token(&alice_key, &claims)?;
///
/// let token = UntrustedToken::new(&token)?;
/// assert_eq!(token.algorithm(), "HS256");
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
pub fn issue_token(key: &Key, claims: &ClaimSet) -> Result<String, CreationError> {
    issue_token_with_header(key, &Header::empty().with_token_type("JWT"), claims)
}

/// Same as [`issue_token()`], but with a custom header. The `alg` field is always
/// set based on the key family.
pub fn issue_token_with_header(
    key: &Key,
    header: &Header,
    claims: &ClaimSet,
) -> Result<String, CreationError> {
    let token = key.sign_token(header, claims).map_err(|err| {
        tracing::warn!(family = %key.family(), error = %err, "cannot issue token");
        err
    })?;
    tracing::debug!(
        alg = key.algorithm_name(),
        issuer = %claims.issuer(),
        "issued token"
    );
    Ok(token)
}
