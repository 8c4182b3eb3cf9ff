//! Value objects for the user domain.

use common::InvalidArgumentError;
use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const LOGIN_MIN_LENGTH: usize = 3;
const LOGIN_MAX_LENGTH: usize = 64;
const PASSWORD_MIN_LENGTH: usize = 8;

const PASSWORD_HASH_PREFIX: &str = "user-password:";
const LOGIN_FINGERPRINT_SALT: &str = "user-login-fingerprint:";

/// Block order applied to the login digest, as indices of 8-character blocks.
const FINGERPRINT_BLOCK_ORDER: [usize; 4] = [0, 3, 2, 1];
const FINGERPRINT_BLOCK_LEN: usize = 8;

/// A user's login name.
///
/// Surrounding whitespace is trimmed. The remainder must be 3 to 64 ASCII
/// letters, digits, or one of `.`, `_`, `-`, `@`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Login(String);

impl Login {
    /// Creates a login, validating its format.
    pub fn new(login: impl Into<String>) -> Result<Self, InvalidArgumentError> {
        let raw = login.into();
        let trimmed = raw.trim();

        let invalid = |reason| InvalidArgumentError::InvalidLogin {
            value: raw.clone(),
            reason,
        };

        if trimmed.len() < LOGIN_MIN_LENGTH {
            return Err(invalid("too short"));
        }
        if trimmed.len() > LOGIN_MAX_LENGTH {
            return Err(invalid("too long"));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '@'))
        {
            return Err(invalid("unsupported character"));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Returns the login as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Login {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Login {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A plain-text password as supplied by the caller.
///
/// Never stored or published; only its [`PasswordHash`] is.
#[derive(Clone)]
pub struct Password(String);

impl Password {
    /// Creates a password, requiring at least 8 characters.
    pub fn new(password: impl Into<String>) -> Result<Self, InvalidArgumentError> {
        let password = password.into();
        if password.chars().count() < PASSWORD_MIN_LENGTH {
            return Err(InvalidArgumentError::WeakPassword {
                min_length: PASSWORD_MIN_LENGTH,
            });
        }
        Ok(Self(password))
    }

    /// Returns the plain-text password.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Deterministic digest of a password, carried on events.
///
/// Equal passwords always produce equal hashes, which is what lets a
/// password change be refused when nothing changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hashes a password.
    pub fn from_password(password: &Password) -> Self {
        let digest = Sha256::new()
            .chain_update(PASSWORD_HASH_PREFIX)
            .chain_update(password.expose())
            .finalize();
        Self(hex::encode(digest))
    }

    /// Returns true if `password` hashes to this value.
    pub fn matches(&self, password: &Password) -> bool {
        *self == Self::from_password(password)
    }

    /// Returns the hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Stable lookup key derived from a login.
///
/// The MD5 hex digest of a salted login, rearranged as four 8-character
/// blocks in the order 0, 3, 2, 1. Not a credential.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoginFingerprint(String);

impl LoginFingerprint {
    /// Computes the fingerprint of a login.
    pub fn of(login: &Login) -> Self {
        let digest = Md5::new()
            .chain_update(LOGIN_FINGERPRINT_SALT)
            .chain_update(login.as_str())
            .finalize();
        let hex = hex::encode(digest);

        let fingerprint = FINGERPRINT_BLOCK_ORDER
            .iter()
            .map(|&block| {
                let start = block * FINGERPRINT_BLOCK_LEN;
                &hex[start..start + FINGERPRINT_BLOCK_LEN]
            })
            .collect();
        Self(fingerprint)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LoginFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
