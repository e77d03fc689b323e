//! Authentication and authorization of requests carrying [JSON web tokens (JWT)][JWT].
//!
//! Given a bearer token and a set of trusted keys, the crate verifies the token signature
//! and validity period, exposes the claims carried by the token, and decides whether the scopes
//! claimed by the token satisfy the scopes required by the requested operation.
//!
//! # Design choices
//!
//! - Keys are trusted per issuer. A [`Keystore`] maps the `iss` claim of a token to a [`Key`];
//!   a token from an issuer without a trusted key is rejected.
//! - The signature algorithm is a function of the key family and is never taken from the token
//!   header: HMAC secrets imply `HS256`, RSA keys imply `RS256`, and ECDSA keys on the P-256
//!   curve imply `ES256`. A token declaring another algorithm is rejected. This eliminates
//!   the possibility of [algorithm switching attacks][switching].
//! - Claims are exposed via [`ClaimSet`] with lenient, total accessors that never panic.
//! - Errors are classified by [`ErrorKind`] (invalid token, failed authentication, failed
//!   authorization, or unsupported configuration), which maps onto HTTP status codes.
//! - Pluggable logic is expressed via traits ([`Keystore`], [`Authenticate`], [`Authorize`]);
//!   closures with matching signatures implement the latter two.
//!
//! # Logging
//!
//! The crate emits [`tracing`] events: `debug` for verification and authorization outcomes,
//! `info` for changes in trusted keys. Keys, raw tokens and signatures are never logged.
//!
//! # Examples
//!
//! Basic token lifecycle.
//!
//! ```
//! use chrono::Duration;
//! use jwt_gate::{prelude::*, claims, issue_token, Key, NamedKeystore, ScopeAuthorizer};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Alice issues a token for Bob valid for one hour.
//! let alice_key = Key::hmac(b"alice's secret");
//! let claims = claims!["iss", "alice", "sub", "bob", "scopes", ["read"]]
//!     .set_duration_and_issuance(&TimeOptions::default(), Duration::hours(1));
//! let token = issue_token(&alice_key, &claims)?;
//!
//! // A service trusting Alice authenticates the token...
//! let store = NamedKeystore::new();
//! store.trust("alice", alice_key)?;
//! let context = DefaultAuthenticator::default()
//!     .authenticate(&AuthContext::new(), &token, &store)?;
//! assert_eq!(context.claims().unwrap().subject(), "bob");
//!
//! // ...and authorizes operations based on the token scopes.
//! let authorizer = ScopeAuthorizer::default();
//! authorizer.authorize(&context, &["read".to_owned()])?;
//! assert!(authorizer.authorize(&context, &["write".to_owned()]).is_err());
//! # Ok(())
//! # }
//! ```
//!
//! [JWT]: https://jwt.io/
//! [switching]: https://auth0.com/blog/critical-vulnerabilities-in-json-web-token-libraries/

#![doc(html_root_url = "https://docs.rs/jwt-gate/0.1.0")]
#![warn(missing_debug_implementations, missing_docs, bare_trait_objects)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]

pub mod alg;
mod authenticate;
mod authorize;
mod claims;
mod error;
mod extract;
mod issuer;
mod key;
mod keystore;
mod secure;
pub mod testing;
mod token;
mod traits;
mod verifier;

/// Prelude to neatly import all necessary stuff from the crate.
pub mod prelude {
    pub use crate::{
        AuthContext, Authenticate as _, Authorize as _, ClaimSet, DefaultAuthenticator,
        Keystore as _, TimeOptions, TokenVerifier,
    };
}

pub use crate::{
    authenticate::{AuthContext, Authenticate, DefaultAuthenticator},
    authorize::{Authorize, ScopeAuthorizer, DEFAULT_SCOPES_CLAIM},
    claims::{ClaimSet, TimeOptions},
    error::{
        AuthError, AuthorizationFailure, Claim, CreationError, ErrorKind, InvalidToken,
        ParseError, ValidationError,
    },
    extract::TokenExtractor,
    issuer::{issue_token, issue_token_with_header},
    key::{Key, KeyFamily},
    keystore::{Keystore, NamedKeystore, SingleKeystore},
    secure::{Rejection, Secure},
    token::{Header, SegmentDump, TokenMetadata, UntrustedToken},
    traits::{Algorithm, AlgorithmExt, AlgorithmSignature, Validator},
    verifier::TokenVerifier,
};

#[doc(hidden)]
pub mod __private {
    pub use serde_json::{to_value, Value};
}

#[cfg(doctest)]
doc_comment::doctest!("../README.md");
