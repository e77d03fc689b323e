//! Algorithm traits defined by the crate.

use base64ct::{Base64UrlUnpadded, Encoding};

use std::{borrow::Cow, num::NonZeroUsize};

use crate::{
    token::CompleteHeader, ClaimSet, CreationError, Header, UntrustedToken, ValidationError,
};

/// Signature for a certain JWT signing [`Algorithm`].
///
/// We require that signature can be restored from a byte slice,
/// and can be represented as a byte slice.
pub trait AlgorithmSignature: Sized {
    /// Constant byte length of signatures supported by the [`Algorithm`], or `None` if
    /// the signature length is variable.
    ///
    /// - If this value is `Some(_)`, the signature will be first checked for its length
    ///   during token verification. An [`InvalidSignatureLen`] error will be raised if the length
    ///   is invalid. [`Self::try_from_slice()`] will thus always receive a slice with
    ///   the expected length.
    /// - If this value is `None`, no length check is performed before calling
    ///   [`Self::try_from_slice()`].
    ///
    /// [`InvalidSignatureLen`]: crate::ValidationError::InvalidSignatureLen
    const LENGTH: Option<NonZeroUsize> = None;

    /// Attempts to restore a signature from a byte slice. This method may fail
    /// if the slice is malformed.
    fn try_from_slice(slice: &[u8]) -> anyhow::Result<Self>;

    /// Represents this signature as bytes.
    fn as_bytes(&self) -> Cow<'_, [u8]>;
}

/// JWT signing algorithm.
pub trait Algorithm {
    /// Key used when issuing new tokens.
    type SigningKey;
    /// Key used when verifying tokens. May coincide with [`Self::SigningKey`] for symmetric
    /// algorithms (e.g., `HS256`).
    type VerifyingKey;
    /// Signature produced by the algorithm.
    type Signature: AlgorithmSignature;

    /// Returns the name of this algorithm, as mentioned in the `alg` field of the JWT header.
    fn name(&self) -> Cow<'static, str>;

    /// Signs a `message` with the `signing_key`.
    fn sign(&self, signing_key: &Self::SigningKey, message: &[u8]) -> Self::Signature;

    /// Verifies the `message` against the `signature` and `verifying_key`.
    fn verify_signature(
        &self,
        signature: &Self::Signature,
        verifying_key: &Self::VerifyingKey,
        message: &[u8],
    ) -> bool;
}

/// Automatically implemented extensions of the `Algorithm` trait.
pub trait AlgorithmExt: Algorithm {
    /// Creates a new token and serializes it to string.
    fn token(
        &self,
        header: &Header,
        claims: &ClaimSet,
        signing_key: &Self::SigningKey,
    ) -> Result<String, CreationError>;

    /// Creates a JWT validator for the specified verifying key.
    /// The validator can then be used to validate one or more tokens.
    fn validator<'a>(&'a self, verifying_key: &'a Self::VerifyingKey) -> Validator<'a, Self>;
}

impl<A: Algorithm> AlgorithmExt for A {
    fn token(
        &self,
        header: &Header,
        claims: &ClaimSet,
        signing_key: &Self::SigningKey,
    ) -> Result<String, CreationError> {
        let complete_header = CompleteHeader {
            algorithm: self.name(),
            content_type: None,
            inner: header.clone(),
        };
        let header = serde_json::to_string(&complete_header).map_err(CreationError::Header)?;
        let mut buffer = Vec::new();
        encode_base64_buf(&header, &mut buffer);

        let claims = serde_json::to_string(claims).map_err(CreationError::Claims)?;
        buffer.push(b'.');
        encode_base64_buf(&claims, &mut buffer);

        let signature = self.sign(signing_key, &buffer);
        buffer.push(b'.');
        encode_base64_buf(signature.as_bytes(), &mut buffer);

        // SAFETY: safe by construction: base64 alphabet and `.` char are valid UTF-8.
        Ok(unsafe { String::from_utf8_unchecked(buffer) })
    }

    fn validator<'a>(&'a self, verifying_key: &'a Self::VerifyingKey) -> Validator<'a, Self> {
        Validator {
            algorithm: self,
            verifying_key,
        }
    }
}

/// Validator for a certain signing [`Algorithm`] associated with a specific verifying key.
/// Produced by the [`AlgorithmExt::validator()`] method.
#[derive(Debug)]
pub struct Validator<'a, A: Algorithm + ?Sized> {
    algorithm: &'a A,
    verifying_key: &'a A::VerifyingKey,
}

impl<A: Algorithm + ?Sized> Clone for Validator<'_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A: Algorithm + ?Sized> Copy for Validator<'_, A> {}

impl<A: Algorithm + ?Sized> Validator<'_, A> {
    /// Checks the token integrity against a verifying key enclosed in this validator.
    /// Claims are not deserialized.
    pub fn verify_integrity(self, token: &UntrustedToken<'_>) -> Result<(), ValidationError> {
        let expected_alg = self.algorithm.name();
        if expected_alg != token.algorithm() {
            return Err(ValidationError::AlgorithmMismatch {
                expected: expected_alg.into_owned(),
                actual: token.algorithm().to_owned(),
            });
        }

        let signature = token.signature_bytes();
        if let Some(expected_len) = A::Signature::LENGTH {
            if signature.len() != expected_len.get() {
                return Err(ValidationError::InvalidSignatureLen {
                    expected: expected_len.get(),
                    actual: signature.len(),
                });
            }
        }

        let signature =
            A::Signature::try_from_slice(signature).map_err(ValidationError::MalformedSignature)?;
        if self
            .algorithm
            .verify_signature(&signature, self.verifying_key, token.signed_data)
        {
            Ok(())
        } else {
            Err(ValidationError::InvalidSignature)
        }
    }

}

fn encode_base64_buf(source: impl AsRef<[u8]>, buffer: &mut Vec<u8>) {
    let source = source.as_ref();
    let previous_len = buffer.len();
    let encoded_len = Base64UrlUnpadded::encoded_len(source);
    buffer.resize(previous_len + encoded_len, 0);
    Base64UrlUnpadded::encode(source, &mut buffer[previous_len..])
        .expect("miscalculated base64-encoded length; this should never happen");
}
