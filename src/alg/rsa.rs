//! `RS256` algorithm: RSA signatures with PKCS#1 v1.5 padding and SHA-256.

pub use rsa::{RsaPrivateKey, RsaPublicKey};

use rsa::Pkcs1v15Sign;
use sha2::{Digest, Sha256};

use std::borrow::Cow;

use crate::{Algorithm, AlgorithmSignature};

/// RSA signature.
#[derive(Debug)]
pub struct RsaSignature(Vec<u8>);

impl AlgorithmSignature for RsaSignature {
    fn try_from_slice(bytes: &[u8]) -> anyhow::Result<Self> {
        match bytes.len() {
            256 | 384 | 512 => Ok(RsaSignature(bytes.to_vec())),
            _ => Err(anyhow::anyhow!("Unsupported signature length")),
        }
    }

    fn as_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(&self.0)
    }
}

/// Integrity algorithm using [RSA] digital signatures with PKCS#1 v1.5 padding
/// and the SHA-256 hash function. See [RFC 7518] for more details.
///
/// Signing uses blinding with the OS-provided RNG.
///
/// [RSA]: https://en.wikipedia.org/wiki/RSA_(cryptosystem)
/// [RFC 7518]: https://www.rfc-editor.org/rfc/rfc7518.html#section-3.3
#[derive(Debug, Clone, Copy, Default)]
pub struct Rs256;

impl Rs256 {
    fn padding_scheme() -> Pkcs1v15Sign {
        Pkcs1v15Sign::new::<Sha256>()
    }
}

impl Algorithm for Rs256 {
    type SigningKey = RsaPrivateKey;
    type VerifyingKey = RsaPublicKey;
    type Signature = RsaSignature;

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("RS256")
    }

    fn sign(&self, signing_key: &Self::SigningKey, message: &[u8]) -> Self::Signature {
        let digest = Sha256::digest(message);
        RsaSignature(
            signing_key
                .sign_with_rng(&mut rand_core::OsRng, Self::padding_scheme(), &digest)
                .expect("Unexpected RSA signature failure"),
        )
    }

    fn verify_signature(
        &self,
        signature: &Self::Signature,
        verifying_key: &Self::VerifyingKey,
        message: &[u8],
    ) -> bool {
        let digest = Sha256::digest(message);
        verifying_key
            .verify(Self::padding_scheme(), &digest, &signature.0)
            .is_ok()
    }
}
