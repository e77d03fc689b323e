//! Fixtures for testing code that consumes authenticated requests.
//!
//! **Never** trust [`TEST_KEY`] outside of tests; it is public knowledge.

use crate::{issue_token, ClaimSet, Key, SingleKeystore};

/// Static HMAC secret used to sign and verify test tokens.
pub const TEST_KEY: &[u8] = b"jwt-gate test key; do not trust in production";

/// Returns [`TEST_KEY`] wrapped in a [`Key`].
pub fn test_key() -> Key {
    Key::hmac(TEST_KEY)
}

/// Returns a keystore trusting [`TEST_KEY`] for all issuers.
pub fn test_keystore() -> SingleKeystore {
    SingleKeystore::new(test_key())
}

/// Creates a token with the specified claims signed with [`TEST_KEY`].
///
/// # Panics
///
/// Panics if the token cannot be created.
///
/// # Examples
///
/// ```
/// # use jwt_gate::{claims, testing, TokenVerifier};
/// let token = testing::test_token(&claims!["sub", "bob", "scopes", ["read"]]);
/// let claims = TokenVerifier::default().verify(&token, &testing::test_keystore())?;
/// assert_eq!(claims.subject(), "bob");
/// # Ok::<_, jwt_gate::AuthError>(())
/// ```
pub fn test_token(claims: &ClaimSet) -> String {
    issue_token(&test_key(), claims)
        .unwrap_or_else(|err| panic!("cannot create test token: {err}"))
}
