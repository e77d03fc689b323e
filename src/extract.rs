//! Extraction of raw tokens from HTTP headers.

use http::{header, HeaderMap, HeaderName};

use crate::{AuthError, ParseError};

/// Extractor of bearer tokens from a request header.
///
/// The header value is either a bare token, or a `<scheme> <token>` pair (e.g.,
/// `Bearer eyJhbGciOi...`); the scheme word is not validated.
#[derive(Debug, Clone)]
pub struct TokenExtractor {
    header: HeaderName,
}

/// Reads tokens from the `Authorization` header.
impl Default for TokenExtractor {
    fn default() -> Self {
        Self {
            header: header::AUTHORIZATION,
        }
    }
}

impl TokenExtractor {
    /// Creates an extractor reading tokens from the specified header.
    pub fn with_header(header: HeaderName) -> Self {
        Self { header }
    }

    /// Returns the name of the header the tokens are read from.
    pub fn header(&self) -> &HeaderName {
        &self.header
    }

    /// Extracts a token from `headers`. Returns `Ok(None)` if the header is absent or empty.
    ///
    /// # Errors
    ///
    /// Returns an [`InvalidToken`](crate::ErrorKind::InvalidToken) error if the header value
    /// contains more than two words or non-visible ASCII chars.
    pub fn extract(&self, headers: &HeaderMap) -> Result<Option<String>, AuthError> {
        let Some(value) = headers.get(&self.header) else {
            return Ok(None);
        };
        let value = value
            .to_str()
            .map_err(|_| ParseError::MalformedCredentials)?;

        let words: Vec<_> = value.split_ascii_whitespace().collect();
        match words[..] {
            [] => Ok(None),
            [token] | [_, token] => Ok(Some(token.to_owned())),
            _ => {
                tracing::debug!(header = %self.header, "malformed credentials");
                Err(ParseError::MalformedCredentials.into())
            }
        }
    }
}
