//! Implementations of JWT signing / verification algorithms.
//!
//! The crate supports exactly one algorithm per key family; the algorithm is never chosen
//! based on the token header.
//!
//! | Key family | Algorithm | Backend |
//! |------------|-----------|---------|
//! | HMAC secret | `HS256` | [`hmac`] + [`sha2`] |
//! | RSA | `RS256` (PKCS#1 v1.5) | [`rsa`] with blinding |
//! | ECDSA on P-256 | `ES256` | [`p256`] |
//!
//! [`hmac`]: https://docs.rs/hmac/
//! [`sha2`]: https://docs.rs/sha2/
//! [`rsa`]: https://docs.rs/rsa/
//! [`p256`]: https://docs.rs/p256/

mod hmacs;
mod p256;
mod rsa;

pub use self::hmacs::{Hs256, Hs256Key, Hs256Signature};
pub use self::p256::{Es256, EcdsaSigningKey, EcdsaVerifyingKey};
pub use self::rsa::{Rs256, RsaPrivateKey, RsaPublicKey, RsaSignature};
