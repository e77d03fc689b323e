//! `UntrustedToken` and closely related types.

use base64ct::{Base64UrlUnpadded, Encoding};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use smallvec::{smallvec, SmallVec};

use std::{borrow::Cow, fmt};

use crate::{ClaimSet, ParseError, ValidationError};

/// Maximum "reasonable" signature size in bytes.
const SIGNATURE_SIZE: usize = 128;

/// JWT header.
///
/// See [RFC 7515](https://tools.ietf.org/html/rfc7515#section-4.1) for the description
/// of the fields. Since header values are provided by the adversary in the case of an attack,
/// none of them is used to select the verifying key or the algorithm; the key is chosen
/// based on the issuer, and the algorithm based on the key.
///
/// A `Header` can be created using `Default` implementation, which does not set any fields.
/// For added fluency, you may use `with_*` methods:
///
/// ```
/// # use jwt_gate::Header;
/// let header = Header::empty().with_key_id("my-key-id").with_token_type("JWT");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Header {
    /// Identifier of the key that has signed the token. This field is renamed to [`kid`]
    /// for serialization.
    ///
    /// [`kid`]: https://www.rfc-editor.org/rfc/rfc7515.html#section-4.1.4
    #[serde(rename = "kid", default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,

    /// Application-specific [token type]. This field is renamed to `typ` for serialization.
    ///
    /// [token type]: https://tools.ietf.org/html/rfc7519#section-5.1
    #[serde(rename = "typ", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl Header {
    /// Creates an empty header.
    pub const fn empty() -> Self {
        Self {
            key_id: None,
            token_type: None,
        }
    }

    /// Sets the `key_id` field for this header.
    #[must_use]
    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    /// Sets the `token_type` field for this header.
    #[must_use]
    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = Some(token_type.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CompleteHeader<'a> {
    #[serde(rename = "alg")]
    pub algorithm: Cow<'a, str>,
    #[serde(rename = "cty", default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(flatten)]
    pub inner: Header,
}

/// Parsed, but unvalidated token.
///
/// The header is parsed eagerly; claims are kept serialized until they are requested.
#[derive(Debug, Clone)]
pub struct UntrustedToken<'a> {
    pub(crate) signed_data: &'a [u8],
    header: Header,
    algorithm: String,
    serialized_claims: Vec<u8>,
    signature: SmallVec<[u8; SIGNATURE_SIZE]>,
}

impl<'a> TryFrom<&'a str> for UntrustedToken<'a> {
    type Error = ParseError;

    fn try_from(s: &'a str) -> Result<Self, Self::Error> {
        let token_parts: Vec<_> = s.splitn(4, '.').collect();
        let [header, claims, signature] = token_parts[..] else {
            return Err(ParseError::InvalidTokenStructure);
        };

        let header = Base64UrlUnpadded::decode_vec(header)?;
        let serialized_claims = Base64UrlUnpadded::decode_vec(claims)?;
        let mut decoded_signature = smallvec![0; 3 * (signature.len() + 3) / 4];
        let signature_len = Base64UrlUnpadded::decode(signature, &mut decoded_signature[..])?.len();
        decoded_signature.truncate(signature_len);

        let header: CompleteHeader<'_> =
            serde_json::from_slice(&header).map_err(ParseError::MalformedHeader)?;
        match &header.content_type {
            None => { /* JSON by default */ }
            Some(s) if s.eq_ignore_ascii_case("json") => {}
            Some(s) => return Err(ParseError::UnsupportedContentType(s.clone())),
        }

        // The signed data is everything before the last period; the split above
        // guarantees that there are exactly two periods.
        let signed_len = s.len() - signature.len() - 1;
        Ok(Self {
            signed_data: &s.as_bytes()[..signed_len],
            header: header.inner,
            algorithm: header.algorithm.into_owned(),
            serialized_claims,
            signature: decoded_signature,
        })
    }
}

impl<'a> UntrustedToken<'a> {
    /// Creates an untrusted token from a string. This is a shortcut for calling the [`TryFrom`]
    /// conversion.
    pub fn new<S: AsRef<str> + ?Sized>(s: &'a S) -> Result<Self, ParseError> {
        Self::try_from(s.as_ref())
    }

    /// Gets the token header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Gets the integrity algorithm declared by the token. This value is provided
    /// by the token author and must not be trusted.
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Returns signature bytes from the token. These bytes are **not** guaranteed to form a valid
    /// signature.
    pub fn signature_bytes(&self) -> &[u8] {
        &self.signature
    }

    /// Deserializes claims without verifying the token integrity.
    ///
    /// Claims must form a JSON object; any other JSON value is rejected.
    pub fn claims_unverified(&self) -> Result<ClaimSet, ValidationError> {
        serde_json::from_slice(&self.serialized_claims).map_err(ValidationError::MalformedClaims)
    }
}

/// Decoded form of a single token segment used in [`TokenMetadata`].
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum SegmentDump {
    /// Segment is valid base64url and contains JSON.
    Json(Value),
    /// Segment is valid base64url, but its contents are not JSON.
    Text(String),
    /// Segment could not be decoded; this is the raw segment string.
    Raw(String),
}

impl SegmentDump {
    fn decode(segment: &str) -> Self {
        match Base64UrlUnpadded::decode_vec(segment) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(value) => Self::Json(value),
                Err(_) => Self::Text(String::from_utf8_lossy(&bytes).into_owned()),
            },
            Err(_) => Self::Raw(segment.to_owned()),
        }
    }
}

impl fmt::Display for SegmentDump {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(value) => fmt::Display::fmt(value, formatter),
            Self::Text(text) => write!(formatter, "{text:?}"),
            Self::Raw(raw) => write!(formatter, "raw({raw})"),
        }
    }
}

/// Diagnostic information about a token attached to errors.
///
/// Contains the header and claims segments of the token, decoded as far as possible.
/// The signature segment is never retained.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenMetadata {
    /// Token header.
    pub header: SegmentDump,
    /// Token claims; `None` if the token has no claims segment.
    pub claims: Option<SegmentDump>,
}

impl TokenMetadata {
    /// Extracts metadata from a raw token string. This never fails.
    pub fn from_token(token: &str) -> Self {
        let mut segments = token.splitn(3, '.');
        let header = SegmentDump::decode(segments.next().unwrap_or_default());
        let claims = segments.next().map(SegmentDump::decode);
        Self { header, claims }
    }
}

impl fmt::Display for TokenMetadata {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "header: {}", self.header)?;
        if let Some(claims) = &self.claims {
            write!(formatter, ", claims: {claims}")?;
        }
        Ok(())
    }
}
