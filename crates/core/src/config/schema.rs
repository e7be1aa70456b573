//! Configuration schema definitions
//!
//! Tool configuration: output defaults and the signing identities that
//! build descriptors may reference by name.

use serde::{Deserialize, Serialize};

/// Name of the built-in Android debug signing identity
pub const DEBUG_IDENTITY: &str = "debug";

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigSchema {
    /// `[general]` section
    #[serde(default)]
    pub general: GeneralConfig,

    /// `[signing]` section
    #[serde(default)]
    pub signing: SigningConfig,
}

/// General tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Default plan format: json, toml or gradle
    #[serde(default = "default_output_format")]
    pub output_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_format: default_output_format(),
        }
    }
}

fn default_output_format() -> String {
    "json".to_string()
}

/// Signing identities available to descriptors
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SigningConfig {
    /// Provide the built-in `debug` identity backed by the Android debug keystore
    #[serde(default = "default_true")]
    pub include_debug: bool,

    /// Declared identities
    #[serde(default)]
    pub identities: Vec<SigningIdentityConfig>,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            include_debug: true,
            identities: Vec::new(),
        }
    }
}

impl SigningConfig {
    /// All identities, the built-in debug identity first when enabled.
    ///
    /// A declared identity named `debug` replaces the built-in one.
    pub fn resolved_identities(&self) -> Vec<SigningIdentityConfig> {
        let overrides_debug = self.identities.iter().any(|i| i.name == DEBUG_IDENTITY);
        let mut all = Vec::with_capacity(self.identities.len() + 1);
        if self.include_debug && !overrides_debug {
            all.push(SigningIdentityConfig::debug());
        }
        all.extend(self.identities.iter().cloned());
        all
    }
}

fn default_true() -> bool {
    true
}

/// A named reference to signing key material managed outside this tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SigningIdentityConfig {
    /// Name descriptors use in their `signing` key
    pub name: String,

    /// Opaque key material reference (keystore path, env var, vault URI, ...)
    pub key_ref: String,
}

impl SigningIdentityConfig {
    /// The Android SDK debug keystore identity
    pub fn debug() -> Self {
        Self {
            name: DEBUG_IDENTITY.to_string(),
            key_ref: "~/.android/debug.keystore".to_string(),
        }
    }

    /// Key reference with `~` and `$VARS` expanded, for display only.
    ///
    /// Falls back to the raw reference when expansion fails.
    pub fn expanded_key_ref(&self) -> String {
        shellexpand::full(&self.key_ref)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| self.key_ref.clone())
    }
}
