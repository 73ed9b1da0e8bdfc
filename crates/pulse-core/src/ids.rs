//! Identifier types for pulse.
//!
//! This module provides the opaque `ClientId` that clients present when
//! polling for commands, and the `SessionToken` issued to authenticated
//! operators.

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Maximum accepted length of a client identifier, in characters.
pub const MAX_CLIENT_ID_LEN: usize = 64;

/// Number of random bytes drawn when minting a fresh identifier.
const MINT_ENTROPY_BYTES: usize = 16;

/// An opaque client identifier.
///
/// Client IDs are restricted to `[A-Za-z0-9_-]` and at most
/// [`MAX_CLIENT_ID_LEN`] characters. Freshly minted IDs are 32 hex
/// characters drawn from the OS CSPRNG; the identifier doubles as the
/// bearer credential for the read path, so unguessability matters.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientId(String);

impl ClientId {
    /// Parse a `ClientId` from caller-supplied input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, too long, or contains
    /// characters outside `[A-Za-z0-9_-]`.
    pub fn parse(s: &str) -> Result<Self, IdError> {
        if s.is_empty() {
            return Err(IdError::Empty);
        }
        if s.len() > MAX_CLIENT_ID_LEN {
            return Err(IdError::TooLong {
                max: MAX_CLIENT_ID_LEN,
                got: s.len(),
            });
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(IdError::InvalidCharacter);
        }
        Ok(Self(s.to_string()))
    }

    /// Mint a fresh random `ClientId`.
    ///
    /// Draws 16 bytes from the OS CSPRNG and hex-encodes them. Collision
    /// checking against existing records is the registry's responsibility.
    #[must_use]
    pub fn random() -> Self {
        let mut bytes = [0u8; MINT_ENTROPY_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Mint a time-plus-random composite identifier.
    ///
    /// Fallback for the (astronomically unlikely) case where repeated
    /// random draws keep colliding. Still within the restricted charset
    /// and still subject to a uniqueness check before acceptance.
    #[must_use]
    pub fn composite() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let mut bytes = [0u8; 4];
        OsRng.fill_bytes(&mut bytes);
        Self(format!("{nanos:x}-{}", hex::encode(bytes)))
    }

    /// Return the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the identifier bytes, for use as a storage key.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClientId({})", self.0)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ClientId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ClientId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ClientId> for String {
    fn from(id: ClientId) -> Self {
        id.0
    }
}

impl AsRef<[u8]> for ClientId {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

/// How many random draws to attempt before falling back to a composite id.
const MINT_MAX_ATTEMPTS: usize = 10;

/// Mint a `ClientId` that is unique according to the supplied predicate.
///
/// Draws fixed-width random identifiers, checking each against `exists`;
/// after [`MINT_MAX_ATTEMPTS`] collisions it switches to time-plus-random
/// composites, which are still checked before acceptance. The caller must
/// hold whatever lock makes the check-then-insert race-free.
///
/// # Errors
///
/// Propagates any error returned by the `exists` predicate.
pub fn mint_unique<E>(
    mut exists: impl FnMut(&ClientId) -> Result<bool, E>,
) -> Result<ClientId, E> {
    for _ in 0..MINT_MAX_ATTEMPTS {
        let candidate = ClientId::random();
        if !exists(&candidate)? {
            return Ok(candidate);
        }
    }
    loop {
        let candidate = ClientId::composite();
        if !exists(&candidate)? {
            return Ok(candidate);
        }
    }
}

/// An opaque operator session token based on UUID v4.
///
/// Session tokens are randomly generated on each successful login and
/// presented as bearer credentials on the admin surface.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionToken(uuid::Uuid);

impl SessionToken {
    /// Create a `SessionToken` from a UUID.
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a new random `SessionToken`.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Return the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl FromStr for SessionToken {
    type Err = IdError;

    /// Parse a `SessionToken` from a UUID string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid = uuid::Uuid::parse_str(s).map_err(|_| IdError::InvalidUuid)?;
        Ok(Self(uuid))
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Deliberately elided: tokens are credentials.
        write!(f, "SessionToken(..)")
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for SessionToken {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SessionToken> for String {
    fn from(token: SessionToken) -> Self {
        token.0.to_string()
    }
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input string is empty.
    #[error("identifier is empty")]
    Empty,

    /// The input exceeds the maximum length.
    #[error("identifier too long: maximum {max} characters, got {got}")]
    TooLong {
        /// The maximum allowed length.
        max: usize,
        /// The actual length.
        got: usize,
    },

    /// The input contains characters outside `[A-Za-z0-9_-]`.
    #[error("identifier contains invalid characters")]
    InvalidCharacter,

    /// The input is not a valid UUID.
    #[error("invalid UUID format")]
    InvalidUuid,
}
