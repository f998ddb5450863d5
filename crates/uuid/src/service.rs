//! Internal implementation of merged-record identifiers.

use crate::{UserIdError, UserIdResult};
use rand::rngs::OsRng;
use rand::Rng;
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Length of a short identifier in hex characters.
const SHORT_LEN: usize = 6;

/// Length of a canonical identifier in hex characters.
const CANONICAL_LEN: usize = 32;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// How new identifiers are generated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UserIdScheme {
    /// 6 lowercase hex characters.
    #[default]
    Short,
    /// 32 lowercase hex characters backed by a v4 UUID.
    Canonical,
}

impl UserIdScheme {
    /// Number of hex characters produced by this scheme.
    pub fn hex_len(self) -> usize {
        match self {
            UserIdScheme::Short => SHORT_LEN,
            UserIdScheme::Canonical => CANONICAL_LEN,
        }
    }
}

impl FromStr for UserIdScheme {
    type Err = UserIdError;

    /// Parses `short` or `canonical` (case-insensitive, surrounding whitespace ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(UserIdScheme::Short),
            "canonical" => Ok(UserIdScheme::Canonical),
            other => Err(UserIdError::InvalidInput(format!(
                "unknown user id scheme '{}', expected 'short' or 'canonical'",
                other
            ))),
        }
    }
}

impl fmt::Display for UserIdScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserIdScheme::Short => write!(f, "short"),
            UserIdScheme::Canonical => write!(f, "canonical"),
        }
    }
}

/// Identifier minted for a merged record.
///
/// Once constructed the contained string is guaranteed to be either 6 or 32 lowercase
/// hexadecimal characters.
///
/// # Construction
/// - [`UserId::generate`] mints a fresh identifier.
/// - [`UserId::parse`] validates an externally supplied identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    /// Generates a new identifier using `scheme`.
    pub fn generate(scheme: UserIdScheme) -> Self {
        match scheme {
            UserIdScheme::Short => {
                let mut rng = OsRng;
                let id = (0..SHORT_LEN)
                    .map(|_| HEX_DIGITS[rng.gen_range(0..HEX_DIGITS.len())] as char)
                    .collect();
                Self(id)
            }
            UserIdScheme::Canonical => Self(Uuid::new_v4().simple().to_string()),
        }
    }

    /// Validates and wraps an identifier string.
    ///
    /// # Errors
    ///
    /// Returns [`UserIdError::InvalidInput`] unless `input` is exactly 6 or 32 lowercase hex
    /// characters.
    pub fn parse(input: &str) -> UserIdResult<Self> {
        if Self::is_valid(input) {
            return Ok(Self(input.to_owned()));
        }
        Err(UserIdError::InvalidInput(format!(
            "user id must be 6 or 32 lowercase hex characters, got: '{}'",
            input
        )))
    }

    /// Returns true if `input` has the shape of a short or canonical identifier.
    pub fn is_valid(input: &str) -> bool {
        (input.len() == SHORT_LEN || input.len() == CANONICAL_LEN)
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// The scheme this identifier was generated with, inferred from its length.
    pub fn scheme(&self) -> UserIdScheme {
        if self.0.len() == SHORT_LEN {
            UserIdScheme::Short
        } else {
            UserIdScheme::Canonical
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = UserIdError;

    /// Equivalent to [`UserId::parse`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserId::parse(s)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for UserId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        UserId::parse(&s).map_err(serde::de::Error::custom)
    }
}
