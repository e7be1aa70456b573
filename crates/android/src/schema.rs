//! Option schema
//!
//! Enumerates the recognized descriptor keys, their value types, legal
//! ranges and defaults, and checks a single untyped value against them.
//! Cross-field rules live in [`crate::validate`].

use crate::descriptor::{ArtifactKind, BuildType, DependencyReference, DependencyScope, JavaVersion};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::ops::RangeInclusive;

/// Legal Android API levels
pub const SDK_RANGE: RangeInclusive<u64> = 1..=99;

/// Reverse-domain identifier with at least two segments (`com.example.app`)
static APPLICATION_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_]*(\.[A-Za-z][A-Za-z0-9_]*)+$").expect("valid regex")
});

/// Dotted numeric version with an optional pre-release suffix (`34.0.0`, `35.0.0-rc1`)
static TOOL_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d+(\.\d+){0,3}(-[0-9A-Za-z]+)?$").expect("valid regex")
});

/// A recognized descriptor key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "&'static str")]
pub enum KeyName {
    /// `applicationId`
    ApplicationId,
    /// `namespace`
    Namespace,
    /// `minSdk`
    MinSdk,
    /// `targetSdk`
    TargetSdk,
    /// `compileSdk`
    CompileSdk,
    /// `buildToolsVersion`
    BuildToolsVersion,
    /// `ndkVersion`
    NdkVersion,
    /// `javaVersion`
    JavaVersion,
    /// `jvmTarget`
    JvmTarget,
    /// `coreLibraryDesugaring`
    CoreLibraryDesugaring,
    /// `buildType`
    BuildType,
    /// `artifact`
    Artifact,
    /// `versionCode`
    VersionCode,
    /// `versionName`
    VersionName,
    /// `signing`
    Signing,
    /// `minify`
    Minify,
    /// `proguardFiles`
    ProguardFiles,
    /// `dependencies`
    Dependencies,
}

impl KeyName {
    /// Every key, in documentation order
    pub const ALL: [KeyName; 18] = [
        Self::ApplicationId,
        Self::Namespace,
        Self::MinSdk,
        Self::TargetSdk,
        Self::CompileSdk,
        Self::BuildToolsVersion,
        Self::NdkVersion,
        Self::JavaVersion,
        Self::JvmTarget,
        Self::CoreLibraryDesugaring,
        Self::BuildType,
        Self::Artifact,
        Self::VersionCode,
        Self::VersionName,
        Self::Signing,
        Self::Minify,
        Self::ProguardFiles,
        Self::Dependencies,
    ];

    /// Key as written in descriptor documents
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApplicationId => "applicationId",
            Self::Namespace => "namespace",
            Self::MinSdk => "minSdk",
            Self::TargetSdk => "targetSdk",
            Self::CompileSdk => "compileSdk",
            Self::BuildToolsVersion => "buildToolsVersion",
            Self::NdkVersion => "ndkVersion",
            Self::JavaVersion => "javaVersion",
            Self::JvmTarget => "jvmTarget",
            Self::CoreLibraryDesugaring => "coreLibraryDesugaring",
            Self::BuildType => "buildType",
            Self::Artifact => "artifact",
            Self::VersionCode => "versionCode",
            Self::VersionName => "versionName",
            Self::Signing => "signing",
            Self::Minify => "minify",
            Self::ProguardFiles => "proguardFiles",
            Self::Dependencies => "dependencies",
        }
    }

    /// Look up a key by its document spelling
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.as_str() == key)
    }

    /// Whether the descriptor must set this key
    pub fn is_required(&self) -> bool {
        matches!(
            self,
            Self::ApplicationId | Self::MinSdk | Self::TargetSdk | Self::CompileSdk | Self::Signing
        )
    }

    /// Schema entry for this key
    pub fn spec(&self) -> KeySpec {
        let (value_type, default, description) = match self {
            Self::ApplicationId => (
                "reverse-domain string",
                None,
                "Unique application identifier",
            ),
            Self::Namespace => (
                "reverse-domain string",
                Some("applicationId"),
                "Namespace for generated R and BuildConfig classes",
            ),
            Self::MinSdk => ("integer 1..=99", None, "Lowest supported API level"),
            Self::TargetSdk => ("integer 1..=99", None, "API level the app is tested against"),
            Self::CompileSdk => ("integer 1..=99", None, "API level to compile against"),
            Self::BuildToolsVersion => ("version string", None, "Android build-tools version"),
            Self::NdkVersion => ("version string", None, "Android NDK version"),
            Self::JavaVersion => (
                "1.8 | 11 | 17 | 21",
                Some("1.8"),
                "Java source and target compatibility",
            ),
            Self::JvmTarget => (
                "1.8 | 11 | 17 | 21",
                Some("javaVersion"),
                "Kotlin JVM bytecode target",
            ),
            Self::CoreLibraryDesugaring => (
                "boolean",
                Some("false"),
                "Enable core library desugaring",
            ),
            Self::BuildType => ("debug | release", Some("release"), "Build variant type"),
            Self::Artifact => ("apk | aab", Some("apk"), "Packaged artifact kind"),
            Self::VersionCode => ("integer >= 1", Some("1"), "Monotonic version code"),
            Self::VersionName => ("string", Some("1.0.0"), "User-visible version name"),
            Self::Signing => ("identity name", None, "Signing identity to sign with"),
            Self::Minify => (
                "boolean",
                Some("true for release, false for debug"),
                "Enable code shrinking",
            ),
            Self::ProguardFiles => (
                "array of strings",
                Some("proguard-android.txt, proguard-rules.pro when minify"),
                "ProGuard / R8 rule files",
            ),
            Self::Dependencies => (
                "array of coordinates or {coordinate, scope} tables",
                Some("[]"),
                "Library dependencies",
            ),
        };

        KeySpec {
            key: *self,
            value_type,
            required: self.is_required(),
            default,
            description,
        }
    }
}

impl fmt::Display for KeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<KeyName> for &'static str {
    fn from(key: KeyName) -> Self {
        key.as_str()
    }
}

/// Documentation for one recognized key
#[derive(Debug, Clone, Serialize)]
pub struct KeySpec {
    /// Key name
    pub key: KeyName,
    /// Accepted values, for display
    pub value_type: &'static str,
    /// Whether the descriptor must set the key
    pub required: bool,
    /// Default applied when the key is absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<&'static str>,
    /// One-line description
    pub description: &'static str,
}

/// The set of recognized keys
pub fn recognized_keys() -> BTreeSet<KeyName> {
    KeyName::ALL.into_iter().collect()
}

/// Schema entries for every key, in documentation order
pub fn key_specs() -> Vec<KeySpec> {
    KeyName::ALL.iter().map(KeyName::spec).collect()
}

/// Default ProGuard rule files for minified builds
pub fn default_proguard_files() -> Vec<String> {
    vec![
        "proguard-android.txt".to_string(),
        "proguard-rules.pro".to_string(),
    ]
}

/// A value that passed its key's type and range check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedValue {
    /// Reverse-domain identifier
    Identifier(String),
    /// API level
    Sdk(u32),
    /// Dotted tool version
    ToolVersion(String),
    /// Java compatibility level
    Java(JavaVersion),
    /// Boolean switch
    Flag(bool),
    /// Build variant
    BuildType(BuildType),
    /// Artifact kind
    Artifact(ArtifactKind),
    /// Positive version code
    VersionCode(u32),
    /// Non-empty free text without control characters
    Text(String),
    /// File names
    Files(Vec<String>),
    /// Dependency references
    Dependencies(Vec<DependencyReference>),
}

/// Why a single value was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// JSON type does not match the key's type
    WrongType {
        /// Type the key accepts
        expected: &'static str,
        /// Type found in the document
        found: &'static str,
    },
    /// Right type, outside the legal range
    InvalidValue(String),
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongType { expected, found } => write!(f, "expected {expected}, found {found}"),
            Self::InvalidValue(message) => f.write_str(message),
        }
    }
}

/// Check one value against its key's schema
pub fn validate(key: KeyName, value: &Value) -> Result<TypedValue, ValueError> {
    match key {
        KeyName::ApplicationId | KeyName::Namespace => {
            let s = expect_str(value)?;
            if APPLICATION_ID.is_match(s) {
                Ok(TypedValue::Identifier(s.to_string()))
            } else {
                Err(ValueError::InvalidValue(format!(
                    "`{s}` is not a reverse-domain identifier such as com.example.app"
                )))
            }
        }
        KeyName::MinSdk | KeyName::TargetSdk | KeyName::CompileSdk => {
            let level = expect_integer(value, &SDK_RANGE)?;
            Ok(TypedValue::Sdk(level))
        }
        KeyName::BuildToolsVersion | KeyName::NdkVersion => {
            let s = expect_str(value)?;
            if TOOL_VERSION.is_match(s) {
                Ok(TypedValue::ToolVersion(s.to_string()))
            } else {
                Err(ValueError::InvalidValue(format!(
                    "`{s}` is not a version such as 34.0.0"
                )))
            }
        }
        KeyName::JavaVersion | KeyName::JvmTarget => java_version(value).map(TypedValue::Java),
        KeyName::CoreLibraryDesugaring | KeyName::Minify => {
            expect_bool(value).map(TypedValue::Flag)
        }
        KeyName::BuildType => expect_str(value)?
            .parse()
            .map(TypedValue::BuildType)
            .map_err(ValueError::InvalidValue),
        KeyName::Artifact => expect_str(value)?
            .parse()
            .map(TypedValue::Artifact)
            .map_err(ValueError::InvalidValue),
        KeyName::VersionCode => {
            let code = expect_integer(value, &(1..=u64::from(u32::MAX)))?;
            Ok(TypedValue::VersionCode(code))
        }
        KeyName::VersionName | KeyName::Signing => {
            let s = expect_str(value)?;
            if s.trim().is_empty() {
                Err(ValueError::InvalidValue("must not be empty".to_string()))
            } else if has_control(s) {
                Err(ValueError::InvalidValue(
                    "must not contain control characters".to_string(),
                ))
            } else {
                Ok(TypedValue::Text(s.to_string()))
            }
        }
        KeyName::ProguardFiles => proguard_files(value).map(TypedValue::Files),
        KeyName::Dependencies => dependencies(value).map(TypedValue::Dependencies),
    }
}

fn has_control(s: &str) -> bool {
    s.chars().any(char::is_control)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "table",
    }
}

fn wrong_type(expected: &'static str, value: &Value) -> ValueError {
    ValueError::WrongType {
        expected,
        found: type_name(value),
    }
}

fn expect_str(value: &Value) -> Result<&str, ValueError> {
    value.as_str().ok_or_else(|| wrong_type("string", value))
}

fn expect_bool(value: &Value) -> Result<bool, ValueError> {
    value.as_bool().ok_or_else(|| wrong_type("boolean", value))
}

fn expect_integer(value: &Value, range: &RangeInclusive<u64>) -> Result<u32, ValueError> {
    let Value::Number(n) = value else {
        return Err(wrong_type("integer", value));
    };
    if n.is_f64() {
        return Err(wrong_type("integer", value));
    }

    let out_of_range = || {
        ValueError::InvalidValue(format!(
            "{n} is outside {}..={}",
            range.start(),
            range.end()
        ))
    };

    let v = n.as_u64().ok_or_else(out_of_range)?;
    if !range.contains(&v) {
        return Err(out_of_range());
    }
    u32::try_from(v).map_err(|_| out_of_range())
}

fn java_version(value: &Value) -> Result<JavaVersion, ValueError> {
    match value {
        Value::String(s) => s.parse().map_err(ValueError::InvalidValue),
        Value::Number(n) if !n.is_f64() => n
            .as_u64()
            .and_then(JavaVersion::from_release)
            .ok_or_else(|| {
                ValueError::InvalidValue(format!(
                    "unsupported Java version `{n}` (expected 1.8, 11, 17 or 21)"
                ))
            }),
        // `1.8` written as a bare TOML/JSON float
        Value::Number(n) if n.as_f64() == Some(1.8) => Ok(JavaVersion::Java8),
        other => Err(wrong_type("string", other)),
    }
}

fn proguard_files(value: &Value) -> Result<Vec<String>, ValueError> {
    let items = value
        .as_array()
        .ok_or_else(|| wrong_type("array of strings", value))?;

    items
        .iter()
        .map(|item| match item.as_str() {
            Some(s) if s.trim().is_empty() => Err(ValueError::InvalidValue(
                "file names must not be empty".to_string(),
            )),
            Some(s) if has_control(s) => Err(ValueError::InvalidValue(
                "file names must not contain control characters".to_string(),
            )),
            Some(s) => Ok(s.to_string()),
            None => Err(wrong_type("array of strings", item)),
        })
        .collect()
}

fn dependencies(value: &Value) -> Result<Vec<DependencyReference>, ValueError> {
    const EXPECTED: &str = "array of coordinates or {coordinate, scope} tables";

    let items = value.as_array().ok_or_else(|| wrong_type(EXPECTED, value))?;

    items
        .iter()
        .map(|item| match item {
            Value::String(coordinate) => Ok(DependencyReference::from_coordinate(
                coordinate,
                DependencyScope::default(),
            )),
            Value::Object(table) => {
                if let Some(field) = table
                    .keys()
                    .find(|k| k.as_str() != "coordinate" && k.as_str() != "scope")
                {
                    return Err(ValueError::InvalidValue(format!(
                        "unknown dependency field `{field}`"
                    )));
                }

                let coordinate = match table.get("coordinate") {
                    Some(Value::String(s)) => s,
                    Some(other) => return Err(wrong_type("string", other)),
                    None => {
                        return Err(ValueError::InvalidValue(
                            "dependency table needs a `coordinate`".to_string(),
                        ));
                    }
                };

                let scope = match table.get("scope") {
                    Some(Value::String(s)) => s.parse().map_err(ValueError::InvalidValue)?,
                    Some(other) => return Err(wrong_type("string", other)),
                    None => DependencyScope::default(),
                };

                Ok(DependencyReference::from_coordinate(coordinate, scope))
            }
            other => Err(wrong_type(EXPECTED, other)),
        })
        .collect()
}
