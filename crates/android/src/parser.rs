//! Descriptor parser
//!
//! Turns a raw key/value document into a [`BuildDescriptor`]. Unknown keys
//! are rejected, required keys must be present, and optional keys fall
//! back to their documented defaults.

use crate::descriptor::{ArtifactKind, BuildDescriptor, BuildType, JavaVersion};
use crate::error::{ParseError, ParseErrorKind};
use crate::schema::{self, KeyName, TypedValue, ValueError};
use buildplan_core::{Error, ErrorCode, Result, ResultExt};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, trace};

/// Untyped descriptor document: key to JSON-model value, sorted by key
pub type RawConfig = BTreeMap<String, Value>;

/// Descriptor document syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// TOML table
    Toml,
    /// JSON object
    Json,
}

impl InputFormat {
    /// Infer the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Toml => "toml",
            Self::Json => "json",
        })
    }
}

/// Read a descriptor document into its raw key/value form
///
/// The document must be a table (TOML) or an object (JSON) at the top level.
pub fn read_raw(content: &str, format: InputFormat) -> Result<RawConfig> {
    let value: Value = match format {
        InputFormat::Toml => toml::from_str(content)?,
        InputFormat::Json => serde_json::from_str(content)?,
    };

    match value {
        Value::Object(map) => Ok(map.into_iter().collect()),
        other => Err(Error::parse(format!(
            "Descriptor must be a {} of options, found {}",
            if format == InputFormat::Toml { "table" } else { "object" },
            match other {
                Value::Array(_) => "an array",
                _ => "a scalar",
            }
        ))),
    }
}

/// Read a descriptor file, inferring the format from its extension
pub fn load_raw(path: &Path, format: Option<InputFormat>) -> Result<RawConfig> {
    let format = match format.or_else(|| InputFormat::from_path(path)) {
        Some(f) => f,
        None => {
            return Err(Error::new(
                ErrorCode::UnsupportedFormat,
                format!("Cannot infer descriptor format of {}", path.display()),
            )
            .with_suggestion("Use a .toml or .json extension or pass --input-format"));
        }
    };

    if !path.exists() {
        return Err(Error::file_not_found(path));
    }

    debug!(path = %path.display(), format = %format, "Reading descriptor");
    let content = std::fs::read_to_string(path)?;
    read_raw(&content, format).context(path.display().to_string())
}

fn value_error(key: KeyName, err: ValueError) -> ParseError {
    let kind = match err {
        ValueError::WrongType { .. } => ParseErrorKind::WrongType,
        ValueError::InvalidValue(_) => ParseErrorKind::InvalidValue,
    };
    ParseError::new(kind, key.as_str(), err.to_string())
}

/// Typed values keyed by option, produced by checking every present key
struct Fields(BTreeMap<KeyName, TypedValue>);

impl Fields {
    fn take(&mut self, key: KeyName) -> Option<TypedValue> {
        self.0.remove(&key)
    }

    fn required(&mut self, key: KeyName) -> std::result::Result<TypedValue, ParseError> {
        self.take(key)
            .ok_or_else(|| ParseError::missing_key(key.as_str()))
    }

    fn identifier(&mut self, key: KeyName) -> Option<String> {
        match self.take(key)? {
            TypedValue::Identifier(s) | TypedValue::ToolVersion(s) | TypedValue::Text(s) => {
                Some(s)
            }
            _ => None,
        }
    }

    fn sdk(&mut self, key: KeyName) -> std::result::Result<u32, ParseError> {
        match self.required(key)? {
            TypedValue::Sdk(level) => Ok(level),
            _ => Err(ParseError::missing_key(key.as_str())),
        }
    }

    fn text(&mut self, key: KeyName) -> std::result::Result<String, ParseError> {
        self.identifier(key)
            .ok_or_else(|| ParseError::missing_key(key.as_str()))
    }

    fn java(&mut self, key: KeyName) -> Option<JavaVersion> {
        match self.take(key)? {
            TypedValue::Java(v) => Some(v),
            _ => None,
        }
    }

    fn flag(&mut self, key: KeyName) -> Option<bool> {
        match self.take(key)? {
            TypedValue::Flag(b) => Some(b),
            _ => None,
        }
    }
}

/// Parse a raw document into a descriptor
///
/// Keys are visited in sorted order. Unknown keys are reported first, then
/// missing required keys, then per-key type and range errors.
pub fn parse_descriptor(raw: &RawConfig) -> std::result::Result<BuildDescriptor, ParseError> {
    if let Some(unknown) = raw.keys().find(|k| KeyName::from_key(k).is_none()) {
        debug!(key = %unknown, "Rejecting unknown descriptor key");
        return Err(ParseError::unknown_key(unknown));
    }

    if let Some(missing) = KeyName::ALL
        .iter()
        .filter(|k| k.is_required() && !raw.contains_key(k.as_str()))
        .min_by_key(|k| k.as_str())
    {
        return Err(ParseError::missing_key(missing.as_str()));
    }

    let mut typed = BTreeMap::new();
    for (name, value) in raw {
        let Some(key) = KeyName::from_key(name) else {
            continue;
        };
        let checked = schema::validate(key, value).map_err(|e| value_error(key, e))?;
        trace!(key = %key, value = ?checked, "Accepted descriptor value");
        typed.insert(key, checked);
    }
    let mut fields = Fields(typed);

    let application_id = fields.text(KeyName::ApplicationId)?;
    let namespace = fields
        .identifier(KeyName::Namespace)
        .unwrap_or_else(|| application_id.clone());

    let java_version = fields
        .java(KeyName::JavaVersion)
        .unwrap_or(JavaVersion::Java8);
    let jvm_target = fields.java(KeyName::JvmTarget).unwrap_or(java_version);

    let build_type = match fields.take(KeyName::BuildType) {
        Some(TypedValue::BuildType(t)) => t,
        _ => BuildType::Release,
    };
    let artifact = match fields.take(KeyName::Artifact) {
        Some(TypedValue::Artifact(a)) => a,
        _ => ArtifactKind::Apk,
    };
    let version_code = match fields.take(KeyName::VersionCode) {
        Some(TypedValue::VersionCode(c)) => c,
        _ => 1,
    };

    let minify = fields
        .flag(KeyName::Minify)
        .unwrap_or_else(|| build_type.default_minify());
    let proguard_files = match fields.take(KeyName::ProguardFiles) {
        Some(TypedValue::Files(files)) => files,
        _ if minify => schema::default_proguard_files(),
        _ => Vec::new(),
    };
    let dependencies = match fields.take(KeyName::Dependencies) {
        Some(TypedValue::Dependencies(deps)) => deps,
        _ => Vec::new(),
    };

    let descriptor = BuildDescriptor {
        application_id,
        namespace,
        min_sdk: fields.sdk(KeyName::MinSdk)?,
        target_sdk: fields.sdk(KeyName::TargetSdk)?,
        compile_sdk: fields.sdk(KeyName::CompileSdk)?,
        build_tools_version: fields.identifier(KeyName::BuildToolsVersion),
        ndk_version: fields.identifier(KeyName::NdkVersion),
        java_version,
        jvm_target,
        core_library_desugaring: fields.flag(KeyName::CoreLibraryDesugaring).unwrap_or(false),
        build_type,
        artifact,
        version_code,
        version_name: fields
            .identifier(KeyName::VersionName)
            .unwrap_or_else(|| "1.0.0".to_string()),
        signing: fields.text(KeyName::Signing)?,
        minify,
        proguard_files,
        dependencies,
    };

    debug!(
        application_id = %descriptor.application_id,
        build_type = %descriptor.build_type,
        dependencies = descriptor.dependencies.len(),
        "Parsed build descriptor"
    );

    Ok(descriptor)
}

impl BuildDescriptor {
    /// Raw form using the schema's key names, every default made explicit
    ///
    /// Parsing the result yields a descriptor equal to `self`.
    pub fn to_raw(&self) -> RawConfig {
        let mut raw = RawConfig::new();
        let mut set = |key: KeyName, value: Value| {
            raw.insert(key.as_str().to_string(), value);
        };

        set(KeyName::ApplicationId, json!(self.application_id));
        set(KeyName::Namespace, json!(self.namespace));
        set(KeyName::MinSdk, json!(self.min_sdk));
        set(KeyName::TargetSdk, json!(self.target_sdk));
        set(KeyName::CompileSdk, json!(self.compile_sdk));
        if let Some(version) = &self.build_tools_version {
            set(KeyName::BuildToolsVersion, json!(version));
        }
        if let Some(version) = &self.ndk_version {
            set(KeyName::NdkVersion, json!(version));
        }
        set(KeyName::JavaVersion, json!(self.java_version.as_str()));
        set(KeyName::JvmTarget, json!(self.jvm_target.as_str()));
        set(
            KeyName::CoreLibraryDesugaring,
            json!(self.core_library_desugaring),
        );
        set(KeyName::BuildType, json!(self.build_type.as_str()));
        set(KeyName::Artifact, json!(self.artifact.as_str()));
        set(KeyName::VersionCode, json!(self.version_code));
        set(KeyName::VersionName, json!(self.version_name));
        set(KeyName::Signing, json!(self.signing));
        set(KeyName::Minify, json!(self.minify));
        set(KeyName::ProguardFiles, json!(self.proguard_files));
        set(
            KeyName::Dependencies,
            Value::Array(
                self.dependencies
                    .iter()
                    .map(|dep| {
                        json!({
                            "coordinate": dep.coordinate(),
                            "scope": dep.scope.as_str(),
                        })
                    })
                    .collect(),
            ),
        );

        raw
    }
}
