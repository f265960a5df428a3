//! Identity configuration files.
//!
//! Lets the surrounding library keep signing-identity settings in a TOML
//! file instead of hardcoding them. File values are plain strings and
//! booleans; loading validates them into the typed [`IdentityConfig`].

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::types::{KeyKind, StoreName, StoreScope, SubjectFilter};
use crate::infra::error::{SignError, SignResult};
use crate::services::session::IdentityConfig;

/// On-disk representation of a signing identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfigFile {
    /// Name of the certificate store to open.
    pub store_name: String,

    /// Open the machine-wide store instead of the per-user store.
    #[serde(default)]
    pub local_machine_store: bool,

    /// Subject substring used to locate the certificate.
    pub subject: String,

    /// Expected key type: "rsa" or "ecdsa".
    pub key_type: String,

    /// Emit step-by-step pipeline tracing at debug level.
    #[serde(default)]
    pub trace: bool,
}

impl IdentityConfigFile {
    /// Load a configuration file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> SignResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SignError::ConfigurationError(format!(
                "failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            SignError::ConfigurationError(format!(
                "failed to parse config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Validate the file contents into a typed identity configuration.
    pub fn into_identity_config(self) -> SignResult<IdentityConfig> {
        let store_name = StoreName::new(&self.store_name)
            .map_err(|e| SignError::ConfigurationError(e.to_string()))?;
        let subject = SubjectFilter::new(&self.subject)
            .map_err(|e| SignError::ConfigurationError(e.to_string()))?;
        let key_kind: KeyKind = self
            .key_type
            .parse()
            .map_err(|e: SignError| SignError::ConfigurationError(e.to_string()))?;
        let scope = if self.local_machine_store {
            StoreScope::LocalMachine
        } else {
            StoreScope::CurrentUser
        };

        Ok(IdentityConfig::new(store_name, scope, subject, key_kind).with_trace(self.trace))
    }

    /// Serialize back to TOML, for writing template files.
    pub fn to_toml(&self) -> SignResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| SignError::ConfigurationError(format!("failed to serialize config: {e}")))
    }
}
