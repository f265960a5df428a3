//! Type-safe wrappers using the new-type pattern.
//!
//! Store lookup inputs are validated at construction so the signing
//! pipeline never has to re-check them.

use std::fmt;
use std::str::FromStr;

use crate::infra::error::{SignError, SignResult};

/// Which system-level scope a named certificate store belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StoreScope {
    /// Per-user store of the calling user.
    CurrentUser,
    /// Machine-wide store shared by all users.
    LocalMachine,
}

impl fmt::Display for StoreScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreScope::CurrentUser => write!(f, "current-user"),
            StoreScope::LocalMachine => write!(f, "local-machine"),
        }
    }
}

/// Key type the caller expects the located certificate to carry.
///
/// Selects the padding scheme and the signature post-processing; there is
/// no fallback from one to the other at signing time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Rsa,
    Ecdsa,
}

impl KeyKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyKind::Rsa => "rsa",
            KeyKind::Ecdsa => "ecdsa",
        }
    }
}

impl FromStr for KeyKind {
    type Err = SignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rsa" => Ok(KeyKind::Rsa),
            "ecdsa" | "ec" => Ok(KeyKind::Ecdsa),
            other => Err(SignError::InvalidInput(format!(
                "unknown key type '{other}' (expected 'rsa' or 'ecdsa')"
            ))),
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Provider class of an acquired private key handle.
///
/// Reported by the store provider on acquisition; only modern-provider
/// keys are usable for signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySpec {
    ModernProvider,
    LegacyProvider,
}

impl fmt::Display for KeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySpec::ModernProvider => write!(f, "modern provider"),
            KeySpec::LegacyProvider => write!(f, "legacy provider"),
        }
    }
}

/// Validated name of a certificate store.
///
/// Store names are matched case-insensitively by providers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreName(String);

impl StoreName {
    pub fn new(name: impl AsRef<str>) -> SignResult<Self> {
        let name = name.as_ref();
        if name.trim().is_empty() {
            return Err(SignError::InvalidInput(
                "store name must not be empty".to_string(),
            ));
        }
        Ok(StoreName(name.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical lookup key used by providers.
    #[must_use]
    pub fn normalized(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl fmt::Display for StoreName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StoreName {
    type Err = SignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Validated subject substring used to locate a certificate.
///
/// Matching is case-insensitive against the certificate subject's
/// RFC 4514 string rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectFilter(String);

impl SubjectFilter {
    pub fn new(subject: impl AsRef<str>) -> SignResult<Self> {
        let subject = subject.as_ref();
        if subject.trim().is_empty() {
            return Err(SignError::InvalidInput(
                "subject filter must not be empty".to_string(),
            ));
        }
        Ok(SubjectFilter(subject.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive substring match against a rendered subject name.
    #[must_use]
    pub fn matches(&self, rendered_subject: &str) -> bool {
        rendered_subject
            .to_ascii_lowercase()
            .contains(&self.0.to_ascii_lowercase())
    }
}

impl fmt::Display for SubjectFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SubjectFilter {
    type Err = SignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
