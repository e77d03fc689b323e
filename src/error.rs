//! Error handling.

use std::fmt;

use crate::{key::KeyFamily, token::TokenMetadata};

/// Errors that may occur during token parsing.
#[derive(Debug)]
#[non_exhaustive]
pub enum ParseError {
    /// Token has invalid structure.
    ///
    /// Valid tokens must consist of 3 base64url-encoded parts (header, claims, and signature)
    /// separated by periods.
    InvalidTokenStructure,
    /// Cannot decode base64.
    InvalidBase64Encoding,
    /// Token header cannot be parsed.
    MalformedHeader(serde_json::Error),
    /// [Content type][cty] mentioned in the token header is not supported.
    ///
    /// The only supported content type is JSON (used by default).
    ///
    /// [cty]: https://tools.ietf.org/html/rfc7515#section-4.1.10
    UnsupportedContentType(String),
    /// Value of the header carrying the token is not a bare token or `<scheme> <token>`.
    MalformedCredentials,
}

impl fmt::Display for ParseError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTokenStructure => formatter.write_str("invalid token structure"),
            Self::InvalidBase64Encoding => formatter.write_str("invalid base64 decoding"),
            Self::MalformedHeader(err) => write!(formatter, "malformed token header: {err}"),
            Self::UnsupportedContentType(ty) => write!(formatter, "unsupported content type: {ty}"),
            Self::MalformedCredentials => {
                formatter.write_str("malformed credentials in the authorization header")
            }
        }
    }
}

impl From<base64ct::Error> for ParseError {
    fn from(_: base64ct::Error) -> Self {
        Self::InvalidBase64Encoding
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MalformedHeader(err) => Some(err),
            _ => None,
        }
    }
}

/// Identifier of a time-related claim checked during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Claim {
    /// `exp` claim (expiration time).
    Expiration,
    /// `nbf` claim (valid not before).
    NotBefore,
}

impl Claim {
    /// Returns the registered name of the claim.
    pub fn name(self) -> &'static str {
        match self {
            Self::Expiration => "exp",
            Self::NotBefore => "nbf",
        }
    }
}

impl fmt::Display for Claim {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

/// Errors that can occur during token validation.
#[derive(Debug)]
#[non_exhaustive]
pub enum ValidationError {
    /// Algorithm mentioned in the token header differs from the one implied by the trusted key.
    AlgorithmMismatch {
        /// Expected algorithm name.
        expected: String,
        /// Actual algorithm in the token.
        actual: String,
    },
    /// Token signature has invalid byte length.
    InvalidSignatureLen {
        /// Expected signature length.
        expected: usize,
        /// Actual signature length.
        actual: usize,
    },
    /// Token signature is malformed.
    MalformedSignature(anyhow::Error),
    /// Token signature has failed verification.
    InvalidSignature,
    /// Token claims cannot be deserialized from JSON.
    MalformedClaims(serde_json::Error),
    /// Time-related claim is present, but cannot be interpreted as a timestamp.
    MalformedTimestamp(Claim),
    /// Token has expired.
    Expired,
    /// Token is not yet valid as per `nbf` claim.
    NotMature,
}

impl ValidationError {
    /// Checks whether this error concerns the validity period of an otherwise sound token.
    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Expired | Self::NotMature)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlgorithmMismatch { expected, actual } => write!(
                formatter,
                "token algorithm ({actual}) differs from expected ({expected})"
            ),
            Self::InvalidSignatureLen { expected, actual } => write!(
                formatter,
                "invalid signature length: expected {expected} bytes, got {actual} bytes"
            ),
            Self::MalformedSignature(err) => write!(formatter, "malformed token signature: {err}"),
            Self::InvalidSignature => formatter.write_str("signature has failed verification"),
            Self::MalformedClaims(err) => write!(formatter, "cannot deserialize claims: {err}"),
            Self::MalformedTimestamp(claim) => {
                write!(formatter, "claim `{claim}` is not a valid timestamp")
            }
            Self::Expired => formatter.write_str("token is expired"),
            Self::NotMature => formatter.write_str("token is not valid yet"),
        }
    }
}

impl std::error::Error for ValidationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MalformedSignature(err) => Some(err.as_ref()),
            Self::MalformedClaims(err) => Some(err),
            _ => None,
        }
    }
}

/// Errors that can occur during token creation.
#[derive(Debug)]
#[non_exhaustive]
pub enum CreationError {
    /// Token header cannot be serialized.
    Header(serde_json::Error),
    /// Token claims cannot be serialized into JSON.
    Claims(serde_json::Error),
    /// The key cannot be used to sign tokens (e.g., it is a public key).
    UnsupportedKey(KeyFamily),
}

impl fmt::Display for CreationError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header(err) => write!(formatter, "cannot serialize header: {err}"),
            Self::Claims(err) => write!(formatter, "cannot serialize claims: {err}"),
            Self::UnsupportedKey(family) => {
                write!(formatter, "unsupported key type for signing: {family}")
            }
        }
    }
}

impl std::error::Error for CreationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Header(err) | Self::Claims(err) => Some(err),
            Self::UnsupportedKey(_) => None,
        }
    }
}

/// Classification of [`AuthError`]s.
///
/// The kind is preserved end-to-end so that framework glue can map it onto
/// a transport-specific response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Configuration or token uses a capability the crate does not support.
    Unsupported,
    /// Token is malformed, its signature does not verify, or its issuer is not trusted.
    InvalidToken,
    /// Token is sound, but is expired or not valid yet.
    AuthenticationFailed,
    /// Claims are missing or do not hold the required scopes.
    AuthorizationFailed,
}

impl ErrorKind {
    /// Returns a short machine-readable code for this kind.
    pub fn code(self) -> &'static str {
        match self {
            Self::Unsupported => "unsupported",
            Self::InvalidToken => "invalid_token",
            Self::AuthenticationFailed => "authentication_failed",
            Self::AuthorizationFailed => "authorization_failed",
        }
    }

    /// Returns the conventional HTTP status code for this kind.
    pub fn http_status(self) -> http::StatusCode {
        match self {
            Self::Unsupported => http::StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidToken | Self::AuthenticationFailed => http::StatusCode::UNAUTHORIZED,
            Self::AuthorizationFailed => http::StatusCode::FORBIDDEN,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.code())
    }
}

/// Cause of an [`ErrorKind::InvalidToken`] error.
#[derive(Debug)]
#[non_exhaustive]
pub enum InvalidToken {
    /// Token could not be parsed.
    Parse(ParseError),
    /// Token integrity or claims could not be validated.
    Validation(ValidationError),
    /// No key is trusted for the issuer of the token.
    UntrustedIssuer(String),
}

impl fmt::Display for InvalidToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => fmt::Display::fmt(err, formatter),
            Self::Validation(err) => fmt::Display::fmt(err, formatter),
            Self::UntrustedIssuer(issuer) => write!(formatter, "untrusted issuer {issuer}"),
        }
    }
}

/// Cause of an [`ErrorKind::AuthorizationFailed`] error.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AuthorizationFailure {
    /// No claims are available; the request was not authenticated.
    AuthenticationRequired,
    /// The held scopes do not satisfy the required ones.
    MissingScopes {
        /// Scopes held by the token.
        held: Vec<String>,
        /// Scopes required by the operation.
        required: Vec<String>,
    },
    /// Custom authorization logic rejected the request.
    Custom(String),
}

impl fmt::Display for AuthorizationFailure {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AuthenticationRequired => formatter.write_str("authentication required"),
            Self::MissingScopes { held, required } => write!(
                formatter,
                "missing scopes (held: {held:?}, required: {required:?})"
            ),
            Self::Custom(message) => formatter.write_str(message),
        }
    }
}

/// Classified error produced by authentication and authorization.
#[derive(Debug)]
#[non_exhaustive]
pub enum AuthError {
    /// Server-side misconfiguration: the keystore or key cannot be used as requested.
    Unsupported(String),
    /// Token is malformed, forged, or comes from an untrusted issuer.
    InvalidToken {
        /// What went wrong.
        cause: InvalidToken,
        /// Decoded header / claims of the offending token, for diagnostics.
        metadata: Option<TokenMetadata>,
    },
    /// Token is well-formed and trusted, but fails temporal checks.
    AuthenticationFailed {
        /// What went wrong; either [`ValidationError::Expired`]
        /// or [`ValidationError::NotMature`].
        cause: ValidationError,
        /// Decoded header / claims of the offending token, for diagnostics.
        metadata: Option<TokenMetadata>,
    },
    /// Claims do not authorize the requested operation.
    AuthorizationFailed(AuthorizationFailure),
}

impl AuthError {
    pub(crate) fn untrusted_issuer(issuer: &str) -> Self {
        Self::InvalidToken {
            cause: InvalidToken::UntrustedIssuer(issuer.to_owned()),
            metadata: None,
        }
    }

    pub(crate) fn authorization(failure: AuthorizationFailure) -> Self {
        Self::AuthorizationFailed(failure)
    }

    /// Creates an authorization failure with a custom message. Useful for custom
    /// [`Authorize`](crate::Authorize) implementations.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::AuthorizationFailed(AuthorizationFailure::Custom(message.into()))
    }

    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unsupported(_) => ErrorKind::Unsupported,
            Self::InvalidToken { .. } => ErrorKind::InvalidToken,
            Self::AuthenticationFailed { .. } => ErrorKind::AuthenticationFailed,
            Self::AuthorizationFailed(_) => ErrorKind::AuthorizationFailed,
        }
    }

    /// Returns diagnostic metadata about the token that caused this error, if any.
    pub fn metadata(&self) -> Option<&TokenMetadata> {
        match self {
            Self::InvalidToken { metadata, .. } | Self::AuthenticationFailed { metadata, .. } => {
                metadata.as_ref()
            }
            _ => None,
        }
    }

    /// Attaches diagnostic metadata to token-related errors. Other errors are returned as-is.
    #[must_use]
    pub fn with_metadata(self, new_metadata: TokenMetadata) -> Self {
        match self {
            Self::InvalidToken { cause, .. } => Self::InvalidToken {
                cause,
                metadata: Some(new_metadata),
            },
            Self::AuthenticationFailed { cause, .. } => Self::AuthenticationFailed {
                cause,
                metadata: Some(new_metadata),
            },
            other => other,
        }
    }

    /// Returns the issuer named by an untrusted-issuer error.
    pub fn untrusted_issuer_name(&self) -> Option<&str> {
        match self {
            Self::InvalidToken {
                cause: InvalidToken::UntrustedIssuer(issuer),
                ..
            } => Some(issuer),
            _ => None,
        }
    }

    /// Returns scopes held and required for a [`AuthorizationFailure::MissingScopes`] error.
    pub fn scopes(&self) -> Option<(&[String], &[String])> {
        match self {
            Self::AuthorizationFailed(AuthorizationFailure::MissingScopes { held, required }) => {
                Some((held, required))
            }
            _ => None,
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported(message) => write!(formatter, "unsupported: {message}"),
            Self::InvalidToken { cause, .. } => write!(formatter, "invalid token: {cause}"),
            Self::AuthenticationFailed { cause, .. } => {
                write!(formatter, "authentication failed: {cause}")
            }
            Self::AuthorizationFailed(failure) => {
                write!(formatter, "authorization failed: {failure}")
            }
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidToken {
                cause: InvalidToken::Parse(err),
                ..
            } => Some(err),
            Self::InvalidToken {
                cause: InvalidToken::Validation(err),
                ..
            }
            | Self::AuthenticationFailed { cause: err, .. } => Some(err),
            _ => None,
        }
    }
}

impl From<ParseError> for AuthError {
    fn from(err: ParseError) -> Self {
        Self::InvalidToken {
            cause: InvalidToken::Parse(err),
            metadata: None,
        }
    }
}

impl From<ValidationError> for AuthError {
    fn from(err: ValidationError) -> Self {
        if err.is_temporal() {
            Self::AuthenticationFailed {
                cause: err,
                metadata: None,
            }
        } else {
            Self::InvalidToken {
                cause: InvalidToken::Validation(err),
                metadata: None,
            }
        }
    }
}

impl From<CreationError> for AuthError {
    fn from(err: CreationError) -> Self {
        Self::Unsupported(err.to_string())
    }
}
