use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Claim, ValidationError};

/// Time-related validation options.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub struct TimeOptions<F = fn() -> DateTime<Utc>> {
    /// Leeway to use during validation. Widens both the expiration and maturity windows.
    pub leeway: Duration,
    /// Source of the current timestamps.
    pub clock_fn: F,
}

impl<F: Fn() -> DateTime<Utc>> TimeOptions<F> {
    /// Creates options based on the specified time leeway and clock function.
    pub fn new(leeway: Duration, clock_fn: F) -> Self {
        Self { leeway, clock_fn }
    }
}

impl TimeOptions {
    /// Creates options based on the specified time leeway. The clock source is [`Utc::now()`].
    pub fn from_leeway(leeway: Duration) -> Self {
        Self {
            leeway,
            clock_fn: Utc::now,
        }
    }
}

/// Zero leeway with the [`Utc::now()`] clock.
impl Default for TimeOptions {
    fn default() -> Self {
        Self::from_leeway(Duration::zero())
    }
}

/// Claims encoded in a token.
///
/// This is an unordered map from claim names to arbitrary JSON values. Values are untyped
/// at rest; accessors such as [`Self::bool()`] or [`Self::int()`] coerce them leniently,
/// never fail and never panic, degrading to a zero value (`false`, `0`, an empty string, etc.)
/// if the claim is absent or cannot be converted.
///
/// Registered claims used by the crate are `iss`, `sub`, `iat`, `nbf` and `exp`
/// (see [RFC 7519]). Timestamps are seconds since the Unix epoch.
///
/// # Examples
///
/// ```
/// # use jwt_gate::{claims, ClaimSet};
/// let claims = claims!["iss", "alice", "sub", "bob", "admin", "true", "scopes", ["read"]];
/// assert_eq!(claims.issuer(), "alice");
/// assert!(claims.bool("admin"));
/// assert_eq!(claims.strings("scopes"), ["read"]);
/// assert_eq!(claims.int("missing"), 0);
/// ```
///
/// [RFC 7519]: https://tools.ietf.org/html/rfc7519#section-4.1
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(Map<String, Value>);

impl ClaimSet {
    /// Creates an empty claim set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a claim set from alternating names and values: `[name0, value0, name1, value1, ..]`.
    /// A trailing name without a value is ignored.
    ///
    /// # Panics
    ///
    /// Panics if any name position holds a non-string value.
    pub fn from_alternating<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let mut values = values.into_iter();
        let mut map = Map::new();
        while let Some(name) = values.next() {
            let Value::String(name) = name else {
                panic!("claim name must be a string, got {name}");
            };
            if let Some(value) = values.next() {
                map.insert(name, value);
            }
        }
        Self(map)
    }

    /// Inserts a claim, returning the previous value with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// Gets the raw value of a claim.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Checks whether the claim with the specified name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Returns the number of claims.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks whether this set has no claims.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over claim names and raw values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Returns the underlying JSON map.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    /// Coerces a claim to a boolean.
    ///
    /// - JSON `true` is `true`
    /// - strings are `true` iff their first letter is `t` or `T`
    /// - numbers are `true` iff they are strictly positive
    ///
    /// Everything else, including an absent claim, is `false`.
    pub fn bool(&self, name: &str) -> bool {
        match self.get(name) {
            Some(Value::Bool(value)) => *value,
            Some(Value::String(s)) => s.starts_with(['t', 'T']),
            Some(Value::Number(number)) => number.as_f64().map_or(false, |value| value > 0.0),
            _ => false,
        }
    }

    /// Coerces a claim to an integer. Floating-point numbers are truncated toward zero,
    /// and out-of-range values saturate. Strings containing integer or floating-point numbers
    /// (surrounding whitespace is ignored) are parsed. Everything else is `0`.
    pub fn int(&self, name: &str) -> i64 {
        self.get(name).and_then(numeric_value).unwrap_or(0)
    }

    /// Coerces a claim to a string. Strings are returned verbatim; an absent or `null` claim
    /// is an empty string. Other values are represented with their JSON text (e.g., `42`
    /// becomes `"42"`).
    pub fn string(&self, name: &str) -> String {
        match self.get(name) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Coerces a claim to a list of strings. A single string becomes a one-element list;
    /// an array consisting solely of strings is returned as-is. Everything else is an empty list.
    pub fn strings(&self, name: &str) -> Vec<String> {
        match self.get(name) {
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(str::to_owned))
                .collect::<Option<Vec<_>>>()
                .unwrap_or_default(),
            _ => Vec::new(),
        }
    }

    /// Coerces a claim to a timestamp (seconds since the Unix epoch, in any numeric encoding
    /// including numeric strings). Returns `None` if the claim is absent, cannot be parsed,
    /// or is out of range.
    pub fn time(&self, name: &str) -> Option<DateTime<Utc>> {
        self.get(name)
            .and_then(numeric_value)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// Returns the `iss` claim as a string.
    pub fn issuer(&self) -> String {
        self.string("iss")
    }

    /// Returns the `sub` claim as a string.
    pub fn subject(&self) -> String {
        self.string("sub")
    }

    /// Returns the `iat` claim as a timestamp.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.time("iat")
    }

    /// Returns the `nbf` claim as a timestamp.
    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        self.time("nbf")
    }

    /// Returns the `exp` claim as a timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.time("exp")
    }

    /// Atomically sets `iat` and `exp` claims: first to the current time as per `options`,
    /// and the second to match the specified `duration` of the token.
    #[must_use]
    pub fn set_duration_and_issuance<F>(mut self, options: &TimeOptions<F>, duration: Duration) -> Self
    where
        F: Fn() -> DateTime<Utc>,
    {
        let issued_at = (options.clock_fn)();
        self.insert("iat", issued_at.timestamp());
        self.insert("exp", (issued_at + duration).timestamp());
        self
    }

    /// Sets the `nbf` claim.
    #[must_use]
    pub fn set_not_before(mut self, moment: DateTime<Utc>) -> Self {
        self.insert("nbf", moment.timestamp());
        self
    }

    /// Strict form of timestamp extraction. A claim that is present, but is not a valid
    /// timestamp, is an error.
    fn checked_time(&self, claim: Claim) -> Result<Option<DateTime<Utc>>, ValidationError> {
        let Some(value) = self.get(claim.name()) else {
            return Ok(None);
        };
        numeric_value(value)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(Some)
            .ok_or(ValidationError::MalformedTimestamp(claim))
    }

    /// Validates the expiration claim.
    ///
    /// This method will return an error if the `exp` claim is not in the future
    /// (subject to the provided `options`), or is present but malformed. An absent claim
    /// imposes no constraint.
    pub fn validate_expiration<F>(&self, options: &TimeOptions<F>) -> Result<&Self, ValidationError>
    where
        F: Fn() -> DateTime<Utc>,
    {
        let Some(expiration) = self.checked_time(Claim::Expiration)? else {
            return Ok(self);
        };
        // Out-of-range deadlines saturate: beyond the latest representable moment
        // for a positive leeway, before the earliest one otherwise.
        let is_expired = match expiration.checked_add_signed(options.leeway) {
            Some(deadline) => (options.clock_fn)() >= deadline,
            None => options.leeway < Duration::zero(),
        };
        if is_expired {
            Err(ValidationError::Expired)
        } else {
            Ok(self)
        }
    }

    /// Validates the maturity time (`nbf` claim).
    ///
    /// This method will return an error if the `nbf` claim is in the future
    /// (subject to the provided `options`), or is present but malformed. An absent claim
    /// imposes no constraint.
    pub fn validate_maturity<F>(&self, options: &TimeOptions<F>) -> Result<&Self, ValidationError>
    where
        F: Fn() -> DateTime<Utc>,
    {
        let Some(not_before) = self.checked_time(Claim::NotBefore)? else {
            return Ok(self);
        };
        let is_immature = match not_before.checked_sub_signed(options.leeway) {
            Some(start) => (options.clock_fn)() < start,
            None => options.leeway < Duration::zero(),
        };
        if is_immature {
            Err(ValidationError::NotMature)
        } else {
            Ok(self)
        }
    }
}

impl From<Map<String, Value>> for ClaimSet {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<S: Into<String>> FromIterator<(S, Value)> for ClaimSet {
    fn from_iter<I: IntoIterator<Item = (S, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(name, value)| (name.into(), value)).collect())
    }
}

impl IntoIterator for ClaimSet {
    type Item = (String, Value);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Lenient numeric conversion shared by integer and timestamp accessors.
fn numeric_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => {
            if let Some(value) = number.as_i64() {
                Some(value)
            } else if number.is_u64() {
                Some(i64::MAX)
            } else {
                number.as_f64().map(truncate_float)
            }
        }
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|value| value.is_finite()).map(truncate_float))
        }
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation)] // intentional; `as` saturates
fn truncate_float(value: f64) -> i64 {
    value.trunc() as i64
}

/// Builds a [`ClaimSet`] from alternating names and values.
///
/// Names must evaluate to strings; values may be anything implementing [`Serialize`].
///
/// # Panics
///
/// Panics if a name is not a string, or if a value cannot be serialized to JSON.
///
/// # Examples
///
/// ```
/// # use jwt_gate::claims;
/// let claims = claims!["iss", "alice", "sub", "bob", "scopes", ["read", "write"]];
/// assert_eq!(claims.subject(), "bob");
/// assert_eq!(claims.strings("scopes"), ["read", "write"]);
/// ```
///
/// [`Serialize`]: serde::Serialize
#[macro_export]
macro_rules! claims {
    ($($name:expr, $value:expr),* $(,)?) => {
        $crate::ClaimSet::from_alternating([
            $(
                $crate::__private::Value::from($name),
                $crate::__private::to_value(&$value).expect("claim value cannot be serialized"),
            )*
        ])
    };
}
