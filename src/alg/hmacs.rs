//! `HS256` algorithm based on HMAC-SHA256.

use anyhow::ensure;
use hmac::{
    digest::{generic_array::GenericArray, CtOutput},
    Hmac, Mac,
};
use rand_core::{CryptoRng, RngCore};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use std::{borrow::Cow, fmt, num::NonZeroUsize};

use crate::{Algorithm, AlgorithmSignature};

/// Block size of SHA-256; also the recommended length of generated keys.
const BLOCK_SIZE: usize = 64;

/// Signature produced by the [`Hs256`] algorithm. Compared in constant time.
#[derive(Clone, PartialEq, Eq)]
pub struct Hs256Signature(CtOutput<Hmac<Sha256>>);

impl fmt::Debug for Hs256Signature {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_tuple("Hs256Signature").field(&"_").finish()
    }
}

impl AlgorithmSignature for Hs256Signature {
    const LENGTH: Option<NonZeroUsize> = NonZeroUsize::new(32);

    fn try_from_slice(bytes: &[u8]) -> anyhow::Result<Self> {
        ensure!(bytes.len() == 32, "Invalid signature length");
        let bytes = GenericArray::clone_from_slice(bytes);
        Ok(Self(CtOutput::new(bytes)))
    }

    fn as_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Owned(self.0.clone().into_bytes().to_vec())
    }
}

/// Signing / verifying key for the `HS256` algorithm. Zeroed on drop.
///
/// Keys are compared in constant time.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Hs256Key(Vec<u8>);

impl fmt::Debug for Hs256Key {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_tuple("Hs256Key").field(&"_").finish()
    }
}

impl PartialEq for Hs256Key {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_slice().ct_eq(other.0.as_slice()).into()
    }
}

impl Eq for Hs256Key {}

impl Hs256Key {
    /// Generates a random key using a cryptographically secure RNG.
    pub fn generate<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        let mut key = Self(vec![0; BLOCK_SIZE]);
        rng.fill_bytes(&mut key.0);
        key
    }

    /// Creates a key from the specified `bytes`. Any length is accepted.
    pub fn new(bytes: impl AsRef<[u8]>) -> Self {
        Self(bytes.as_ref().to_vec())
    }

    /// Computes HMAC with this key and the specified `message`.
    fn hmac(&self, message: &[u8]) -> CtOutput<Hmac<Sha256>> {
        let mut hmac = <Hmac<Sha256> as Mac>::new_from_slice(&self.0)
            .expect("HMACs work with any key size");
        hmac.update(message);
        hmac.finalize()
    }
}

impl From<&[u8]> for Hs256Key {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl AsRef<[u8]> for Hs256Key {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// `HS256` signing algorithm.
///
/// See [RFC 7518] for the algorithm specification.
///
/// [RFC 7518]: https://tools.ietf.org/html/rfc7518#section-3.2
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Hs256;

impl Algorithm for Hs256 {
    type SigningKey = Hs256Key;
    type VerifyingKey = Hs256Key;
    type Signature = Hs256Signature;

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("HS256")
    }

    fn sign(&self, signing_key: &Self::SigningKey, message: &[u8]) -> Self::Signature {
        Hs256Signature(signing_key.hmac(message))
    }

    fn verify_signature(
        &self,
        signature: &Self::Signature,
        verifying_key: &Self::VerifyingKey,
        message: &[u8],
    ) -> bool {
        verifying_key.hmac(message) == signature.0
    }
}
