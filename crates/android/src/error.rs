//! Descriptor parse and validation errors
//!
//! Both carry the offending key or field so the caller can point at the
//! line to fix. They convert into [`buildplan_core::Error`] at the
//! pipeline boundary, which maps them onto distinct exit codes.

use buildplan_core::{Error, ErrorCode};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Why a descriptor could not be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParseErrorKind {
    /// A required key is absent
    MissingKey,
    /// A value has the wrong JSON type
    WrongType,
    /// A key is not part of the option schema
    UnknownKey,
    /// A value is outside its legal range or form
    InvalidValue,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MissingKey => "missing key",
            Self::WrongType => "wrong type",
            Self::UnknownKey => "unknown key",
            Self::InvalidValue => "invalid value",
        })
    }
}

/// Malformed, missing, or unknown configuration entry
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{kind} `{key}`: {message}")]
pub struct ParseError {
    /// What went wrong
    pub kind: ParseErrorKind,
    /// Offending key as written in the document
    pub key: String,
    /// Detail for the user
    pub message: String,
}

impl ParseError {
    /// Error of the given kind for `key`
    pub fn new(kind: ParseErrorKind, key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
            message: message.into(),
        }
    }

    /// Required `key` is absent
    pub fn missing_key(key: &str) -> Self {
        Self::new(ParseErrorKind::MissingKey, key, "required key is not set")
    }

    /// `key` is not a recognized option
    pub fn unknown_key(key: &str) -> Self {
        Self::new(ParseErrorKind::UnknownKey, key, "not a recognized option")
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        let code = match err.kind {
            ParseErrorKind::MissingKey => ErrorCode::MissingKey,
            ParseErrorKind::WrongType => ErrorCode::WrongType,
            ParseErrorKind::UnknownKey => ErrorCode::UnknownKey,
            ParseErrorKind::InvalidValue => ErrorCode::InvalidValue,
        };
        let suggestion = match err.kind {
            ParseErrorKind::MissingKey => format!("Add `{}` to the descriptor", err.key),
            ParseErrorKind::UnknownKey => {
                "Run `buildplan keys` to list recognized options".to_string()
            }
            ParseErrorKind::WrongType | ParseErrorKind::InvalidValue => {
                format!("Fix the value of `{}`", err.key)
            }
        };

        Error::new(code, err.to_string())
            .with_context(format!("key `{}`", err.key))
            .with_suggestion(suggestion)
            .with_source(err)
    }
}

/// Which cross-field rule a descriptor broke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationErrorKind {
    /// `minSdk <= targetSdk <= compileSdk` does not hold
    SdkOrdering,
    /// `signing` names no known identity
    UnknownSigningIdentity,
    /// A dependency is not `group:artifact:version`
    MalformedDependency,
    /// Desugaring flag without a desugaring dependency, or the reverse
    DesugaringMismatch,
    /// Minification is on but no ProGuard files are listed
    MissingProguardRules,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SdkOrdering => "SDK ordering",
            Self::UnknownSigningIdentity => "unknown signing identity",
            Self::MalformedDependency => "malformed dependency",
            Self::DesugaringMismatch => "desugaring mismatch",
            Self::MissingProguardRules => "missing ProGuard rules",
        })
    }
}

/// Syntactically valid descriptor that is semantically wrong
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{kind} in `{field}`: {message}")]
pub struct ValidationError {
    /// Which rule was broken
    pub kind: ValidationErrorKind,
    /// Offending field (`minSdk`, `dependencies[2]`, ...)
    pub field: String,
    /// Detail for the user
    pub message: String,
}

impl ValidationError {
    /// Error of the given kind for `field`
    pub fn new(
        kind: ValidationErrorKind,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        let (code, suggestion) = match err.kind {
            ValidationErrorKind::SdkOrdering => (
                ErrorCode::SdkOrdering,
                "Keep minSdk <= targetSdk <= compileSdk",
            ),
            ValidationErrorKind::UnknownSigningIdentity => (
                ErrorCode::UnknownSigningIdentity,
                "Declare the identity under [[signing.identities]] in .buildplan.toml",
            ),
            ValidationErrorKind::MalformedDependency => (
                ErrorCode::MalformedDependency,
                "Use the form group:artifact:version",
            ),
            ValidationErrorKind::DesugaringMismatch => (
                ErrorCode::DesugaringMismatch,
                "Enable coreLibraryDesugaring together with a coreLibraryDesugaring dependency",
            ),
            ValidationErrorKind::MissingProguardRules => (
                ErrorCode::MissingProguardRules,
                "List at least one file in proguardFiles or disable minify",
            ),
        };

        Error::new(code, err.to_string())
            .with_context(format!("field `{}`", err.field))
            .with_suggestion(suggestion)
            .with_source(err)
    }
}
