//! Keys trusted for verification and used for signing.

use std::fmt;

use crate::{
    alg::{
        EcdsaSigningKey, EcdsaVerifyingKey, Es256, Hs256, Hs256Key, Rs256, RsaPrivateKey,
        RsaPublicKey,
    },
    AlgorithmExt, ClaimSet, CreationError, Header, UntrustedToken, ValidationError,
};

/// Family of a [`Key`]. The family alone determines the signature algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum KeyFamily {
    /// Shared HMAC secret; tokens use `HS256`.
    Hmac,
    /// RSA key; tokens use `RS256`.
    Rsa,
    /// ECDSA key on the P-256 curve; tokens use `ES256`.
    Ecdsa,
}

impl KeyFamily {
    /// Returns the JWT algorithm name used with keys of this family.
    pub fn algorithm_name(self) -> &'static str {
        match self {
            Self::Hmac => "HS256",
            Self::Rsa => "RS256",
            Self::Ecdsa => "ES256",
        }
    }
}

impl fmt::Display for KeyFamily {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Hmac => "HMAC secret",
            Self::Rsa => "RSA key",
            Self::Ecdsa => "ECDSA key",
        })
    }
}

/// Signing or verification key.
///
/// Private keys can both sign and verify tokens; public keys can only verify them.
/// Equality is checked in constant time for HMAC secrets.
///
/// The `Debug` implementation does not output key material.
#[derive(Clone, PartialEq)]
#[non_exhaustive]
pub enum Key {
    /// HMAC secret.
    Hmac(Hs256Key),
    /// RSA private key.
    RsaPrivate(RsaPrivateKey),
    /// RSA public key.
    RsaPublic(RsaPublicKey),
    /// ECDSA private key on the P-256 curve.
    EcdsaPrivate(EcdsaSigningKey),
    /// ECDSA public key on the P-256 curve.
    EcdsaPublic(EcdsaVerifyingKey),
}

impl fmt::Debug for Key {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = match self {
            Self::Hmac(_) => "Hmac",
            Self::RsaPrivate(_) => "RsaPrivate",
            Self::RsaPublic(_) => "RsaPublic",
            Self::EcdsaPrivate(_) => "EcdsaPrivate",
            Self::EcdsaPublic(_) => "EcdsaPublic",
        };
        formatter.debug_tuple(variant).field(&"_").finish()
    }
}

impl Key {
    /// Creates an HMAC key from the specified secret.
    pub fn hmac(secret: impl AsRef<[u8]>) -> Self {
        Self::Hmac(Hs256Key::new(secret))
    }

    /// Returns the family of this key.
    pub fn family(&self) -> KeyFamily {
        match self {
            Self::Hmac(_) => KeyFamily::Hmac,
            Self::RsaPrivate(_) | Self::RsaPublic(_) => KeyFamily::Rsa,
            Self::EcdsaPrivate(_) | Self::EcdsaPublic(_) => KeyFamily::Ecdsa,
        }
    }

    /// Returns the JWT algorithm name used with this key.
    pub fn algorithm_name(&self) -> &'static str {
        self.family().algorithm_name()
    }

    /// Checks whether this key can sign tokens.
    pub fn can_sign(&self) -> bool {
        matches!(
            self,
            Self::Hmac(_) | Self::RsaPrivate(_) | Self::EcdsaPrivate(_)
        )
    }

    /// Returns the verification-only counterpart of this key. HMAC secrets are returned as-is.
    #[must_use]
    pub fn to_public(&self) -> Self {
        match self {
            Self::RsaPrivate(key) => Self::RsaPublic(key.to_public_key()),
            Self::EcdsaPrivate(key) => Self::EcdsaPublic(*key.verifying_key()),
            other => other.clone(),
        }
    }

    /// Creates and signs a token with the algorithm implied by the key family.
    pub(crate) fn sign_token(
        &self,
        header: &Header,
        claims: &ClaimSet,
    ) -> Result<String, CreationError> {
        match self {
            Self::Hmac(key) => Hs256.token(header, claims, key),
            Self::RsaPrivate(key) => Rs256.token(header, claims, key),
            Self::EcdsaPrivate(key) => Es256.token(header, claims, key),
            Self::RsaPublic(_) | Self::EcdsaPublic(_) => {
                Err(CreationError::UnsupportedKey(self.family()))
            }
        }
    }

    /// Checks token integrity with the algorithm implied by the key family.
    pub(crate) fn verify_integrity(&self, token: &UntrustedToken<'_>) -> Result<(), ValidationError> {
        match self {
            Self::Hmac(key) => Hs256.validator(key).verify_integrity(token),
            Self::RsaPrivate(key) => {
                let public_key = key.to_public_key();
                Rs256.validator(&public_key).verify_integrity(token)
            }
            Self::RsaPublic(key) => Rs256.validator(key).verify_integrity(token),
            Self::EcdsaPrivate(key) => Es256.validator(key.verifying_key()).verify_integrity(token),
            Self::EcdsaPublic(key) => Es256.validator(key).verify_integrity(token),
        }
    }
}

impl From<Hs256Key> for Key {
    fn from(key: Hs256Key) -> Self {
        Self::Hmac(key)
    }
}

impl From<RsaPrivateKey> for Key {
    fn from(key: RsaPrivateKey) -> Self {
        Self::RsaPrivate(key)
    }
}

impl From<RsaPublicKey> for Key {
    fn from(key: RsaPublicKey) -> Self {
        Self::RsaPublic(key)
    }
}

impl From<EcdsaSigningKey> for Key {
    fn from(key: EcdsaSigningKey) -> Self {
        Self::EcdsaPrivate(key)
    }
}

impl From<EcdsaVerifyingKey> for Key {
    fn from(key: EcdsaVerifyingKey) -> Self {
        Self::EcdsaPublic(key)
    }
}
