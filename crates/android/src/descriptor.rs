//! Build descriptor data model
//!
//! Typed representation of the configuration that describes how one
//! Android application is packaged.

use buildplan_core::config::{SigningConfig, SigningIdentityConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Java language / bytecode compatibility level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum JavaVersion {
    /// Java 8 (`1.8`)
    #[serde(rename = "1.8")]
    Java8,
    /// Java 11
    #[serde(rename = "11")]
    Java11,
    /// Java 17
    #[serde(rename = "17")]
    Java17,
    /// Java 21
    #[serde(rename = "21")]
    Java21,
}

impl JavaVersion {
    /// Canonical string form (`1.8`, `11`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Java8 => "1.8",
            Self::Java11 => "11",
            Self::Java17 => "17",
            Self::Java21 => "21",
        }
    }

    /// Gradle `JavaVersion` constant name
    pub fn gradle_constant(&self) -> &'static str {
        match self {
            Self::Java8 => "VERSION_1_8",
            Self::Java11 => "VERSION_11",
            Self::Java17 => "VERSION_17",
            Self::Java21 => "VERSION_21",
        }
    }

    /// Parse from a numeric feature release (8, 11, 17, 21)
    pub fn from_release(release: u64) -> Option<Self> {
        match release {
            8 => Some(Self::Java8),
            11 => Some(Self::Java11),
            17 => Some(Self::Java17),
            21 => Some(Self::Java21),
            _ => None,
        }
    }
}

impl fmt::Display for JavaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JavaVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let base = trimmed.strip_prefix("JavaVersion.").unwrap_or(trimmed);
        let version = base
            .strip_prefix("VERSION_")
            .map_or_else(|| base.to_string(), |v| v.replace('_', "."));

        match version.as_str() {
            "1.8" | "8" => Ok(Self::Java8),
            "11" => Ok(Self::Java11),
            "17" => Ok(Self::Java17),
            "21" => Ok(Self::Java21),
            _ => Err(format!(
                "unsupported Java version `{s}` (expected 1.8, 11, 17 or 21)"
            )),
        }
    }
}

/// Build variant type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildType {
    /// Debuggable development build
    Debug,
    /// Optimized build for distribution
    Release,
}

impl BuildType {
    /// Lowercase name as used in Gradle `buildTypes`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    /// Whether minification is enabled when the descriptor does not say
    pub fn default_minify(&self) -> bool {
        matches!(self, Self::Release)
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Self::Debug),
            "release" => Ok(Self::Release),
            _ => Err(format!("unknown build type `{s}` (expected debug or release)")),
        }
    }
}

/// Packaged artifact kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Installable APK
    Apk,
    /// Android App Bundle
    Aab,
}

impl ArtifactKind {
    /// Lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Apk => "apk",
            Self::Aab => "aab",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apk" => Ok(Self::Apk),
            "aab" | "bundle" => Ok(Self::Aab),
            _ => Err(format!("unknown artifact `{s}` (expected apk or aab)")),
        }
    }
}

/// Dependency resolution scope (Gradle configuration name)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DependencyScope {
    /// `implementation`
    #[default]
    Implementation,
    /// `api`
    Api,
    /// `compileOnly`
    CompileOnly,
    /// `runtimeOnly`
    RuntimeOnly,
    /// `testImplementation`
    TestImplementation,
    /// `androidTestImplementation`
    AndroidTestImplementation,
    /// `coreLibraryDesugaring`, the desugared JDK library
    CoreLibraryDesugaring,
}

impl DependencyScope {
    /// All scopes, in declaration order
    pub const ALL: [DependencyScope; 7] = [
        Self::Implementation,
        Self::Api,
        Self::CompileOnly,
        Self::RuntimeOnly,
        Self::TestImplementation,
        Self::AndroidTestImplementation,
        Self::CoreLibraryDesugaring,
    ];

    /// Gradle configuration name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Implementation => "implementation",
            Self::Api => "api",
            Self::CompileOnly => "compileOnly",
            Self::RuntimeOnly => "runtimeOnly",
            Self::TestImplementation => "testImplementation",
            Self::AndroidTestImplementation => "androidTestImplementation",
            Self::CoreLibraryDesugaring => "coreLibraryDesugaring",
        }
    }
}

impl fmt::Display for DependencyScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DependencyScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|scope| scope.as_str() == s)
            .ok_or_else(|| format!("unknown dependency scope `{s}`"))
    }
}

/// A library reference: `group:artifact:version` plus scope
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencyReference {
    /// Maven group (`androidx.core`)
    pub group: String,
    /// Artifact name (`core-ktx`)
    pub artifact: String,
    /// Version (`1.13.1`)
    pub version: String,
    /// Gradle configuration the dependency is added to
    pub scope: DependencyScope,
}

impl DependencyReference {
    /// Split a coordinate string into its parts.
    ///
    /// Missing parts are left empty; well-formedness is checked by the validator.
    pub fn from_coordinate(coordinate: &str, scope: DependencyScope) -> Self {
        let mut parts = coordinate.splitn(3, ':');
        let mut next = || parts.next().unwrap_or_default().to_string();
        let group = next();
        let artifact = next();
        let version = next();
        Self {
            group,
            artifact,
            version,
            scope,
        }
    }

    /// `group:artifact:version`
    pub fn coordinate(&self) -> String {
        format!("{}:{}:{}", self.group, self.artifact, self.version)
    }
}

impl fmt::Display for DependencyReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.scope, self.coordinate())
    }
}

/// Typed build configuration for one application
///
/// Produced by the parser; never mutated once validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDescriptor {
    /// Package name installed on devices
    pub application_id: String,
    /// Namespace for generated `R` and `BuildConfig` classes
    pub namespace: String,
    /// Lowest supported API level
    pub min_sdk: u32,
    /// API level the app is tested against
    pub target_sdk: u32,
    /// API level compiled against
    pub compile_sdk: u32,
    /// Pinned SDK build-tools version
    pub build_tools_version: Option<String>,
    /// Pinned NDK version
    pub ndk_version: Option<String>,
    /// Source and target compatibility
    pub java_version: JavaVersion,
    /// Kotlin JVM bytecode target
    pub jvm_target: JavaVersion,
    /// Enable Java library desugaring
    pub core_library_desugaring: bool,
    /// Debug or release variant
    pub build_type: BuildType,
    /// APK or app bundle
    pub artifact: ArtifactKind,
    /// Monotonic version code
    pub version_code: u32,
    /// User-visible version string
    pub version_name: String,
    /// Name of the signing identity to use
    pub signing: String,
    /// Enable code shrinking
    pub minify: bool,
    /// ProGuard rule files applied when minifying
    pub proguard_files: Vec<String>,
    /// Library dependencies in declaration order
    pub dependencies: Vec<DependencyReference>,
}

/// Named reference to signing key material
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigningIdentity {
    /// Name descriptors reference
    pub name: String,
    /// Opaque; never dereferenced by this crate
    pub key_ref: String,
}

impl From<SigningIdentityConfig> for SigningIdentity {
    fn from(config: SigningIdentityConfig) -> Self {
        Self {
            name: config.name,
            key_ref: config.key_ref,
        }
    }
}

/// Set of signing identities a descriptor may reference
#[derive(Debug, Clone, Default)]
pub struct SigningRegistry {
    identities: BTreeMap<String, SigningIdentity>,
}

impl SigningRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry built from tool configuration
    pub fn from_config(config: &SigningConfig) -> Self {
        config
            .resolved_identities()
            .into_iter()
            .map(SigningIdentity::from)
            .collect()
    }

    /// Add or replace an identity
    #[must_use]
    pub fn with_identity(mut self, name: impl Into<String>, key_ref: impl Into<String>) -> Self {
        self.insert(SigningIdentity {
            name: name.into(),
            key_ref: key_ref.into(),
        });
        self
    }

    /// Add or replace an identity
    pub fn insert(&mut self, identity: SigningIdentity) {
        self.identities.insert(identity.name.clone(), identity);
    }

    /// Look up an identity by name
    pub fn resolve(&self, name: &str) -> Option<&SigningIdentity> {
        self.identities.get(name)
    }

    /// Declared identity names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.identities.keys().map(String::as_str)
    }
}

impl FromIterator<SigningIdentity> for SigningRegistry {
    fn from_iter<I: IntoIterator<Item = SigningIdentity>>(iter: I) -> Self {
        let mut registry = Self::new();
        for identity in iter {
            registry.insert(identity);
        }
        registry
    }
}
