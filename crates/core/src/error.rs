//! Error handling with context and recovery suggestions
//!
//! This module provides structured error types with:
//! - Detailed error context (the offending key or field)
//! - Recovery suggestions
//! - Error codes for programmatic handling
//! - Serializable error reports
//! - A distinguishing process exit code per error category

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // IO errors (2xxx)
    /// Reading or writing a file failed
    IoError = 2000,
    /// Input file does not exist
    FileNotFound = 2001,
    /// Input file is not readable
    PermissionDenied = 2002,

    // Configuration errors (3xxx)
    /// Tool configuration could not be read
    ConfigError = 3000,
    /// Explicit `--config` path does not exist
    ConfigNotFound = 3001,
    /// Tool configuration is not valid TOML for the schema
    ConfigParseError = 3002,
    /// A configuration value is out of its domain
    InvalidConfigValue = 3004,

    // Descriptor parse errors (4xxx)
    /// Descriptor document is malformed
    ParseError = 4000,
    /// Required descriptor key is absent
    MissingKey = 4001,
    /// Descriptor value has the wrong type
    WrongType = 4002,
    /// Descriptor key is not recognized
    UnknownKey = 4003,
    /// Descriptor value is outside its legal range
    InvalidValue = 4004,
    /// Document syntax cannot be determined or is not supported
    UnsupportedFormat = 4005,

    // Descriptor validation errors (5xxx)
    /// `minSdk <= targetSdk <= compileSdk` does not hold
    SdkOrdering = 5001,
    /// Signing reference names no known identity
    UnknownSigningIdentity = 5002,
    /// Dependency coordinate is not `group:artifact:version`
    MalformedDependency = 5003,
    /// Desugaring flag and desugaring dependency disagree
    DesugaringMismatch = 5004,
    /// Minified build lists no ProGuard files
    MissingProguardRules = 5005,

    // Plan emission errors (6xxx)
    /// Plan could not be produced
    EmitError = 6000,
    /// Plan could not be serialized
    SerializationFailed = 6001,
}

impl ErrorCode {
    /// Get the numeric code
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a human-readable category
    pub fn category(&self) -> &'static str {
        match self.code() / 1000 {
            2 => "IO",
            3 => "Configuration",
            4 => "Parse",
            5 => "Validation",
            6 => "Emit",
            _ => "Unknown",
        }
    }

    /// Process exit code for errors of this category
    pub fn exit_code(&self) -> i32 {
        match self.code() / 1000 {
            2 => exit_codes::IO_ERROR,
            3 => exit_codes::CONFIG_ERROR,
            4 => exit_codes::PARSE_ERROR,
            5 => exit_codes::VALIDATION_ERROR,
            _ => exit_codes::FAILURE,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

/// Main error type with rich context
#[derive(Error, Debug)]
pub struct Error {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional context
    pub context: Option<String>,
    /// Recovery suggestion
    pub suggestion: Option<String>,
    /// Source error
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, "\n  Context: {ctx}")?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {suggestion}")?;
        }
        Ok(())
    }
}

impl Error {
    /// Create a new error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    /// Add context to the error
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a recovery suggestion
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add a source error
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        self.code.exit_code()
    }

    /// Convert to a serializable report
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code,
            code_str: self.code.to_string(),
            category: self.code.category().to_string(),
            message: self.message.clone(),
            context: self.context.clone(),
            suggestion: self.suggestion.clone(),
            source: self.source.as_ref().map(ToString::to_string),
        }
    }

    // Convenience constructors

    /// A file that was expected to exist is missing
    pub fn file_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            ErrorCode::FileNotFound,
            format!("File not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Check that the file exists and you have read permissions")
    }

    /// Configuration file given explicitly but absent
    pub fn config_not_found(path: impl AsRef<std::path::Path>) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Create a .buildplan.toml file or use --config to specify a path")
    }

    /// Descriptor parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseError, message)
    }

    /// Plan emission error
    pub fn emit(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::EmitError, message)
    }
}

/// Serializable error report for logging and machine-readable output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Symbolic code (`UNKNOWN_KEY`)
    pub code: ErrorCode,
    /// Numeric code (`E4003`)
    pub code_str: String,
    /// Error category
    pub category: String,
    /// Human-readable message
    pub message: String,
    /// Offending key, field or file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Recovery suggestion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Underlying error message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Exit codes for CLI commands
pub mod exit_codes {
    /// Command completed
    pub const SUCCESS: i32 = 0;
    /// Generic failure, including command-line usage errors
    pub const FAILURE: i32 = 1;
    /// Descriptor failed cross-field validation
    pub const VALIDATION_ERROR: i32 = 2;
    /// Tool configuration is missing or malformed
    pub const CONFIG_ERROR: i32 = 3;
    /// Descriptor could not be parsed
    pub const PARSE_ERROR: i32 = 4;
    /// Descriptor or output file could not be accessed
    pub const IO_ERROR: i32 = 5;
}

// Implement From for common error types

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            _ => ErrorCode::IoError,
        };
        Error::new(code, err.to_string()).with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::new(ErrorCode::ParseError, format!("JSON parse error: {err}")).with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(ErrorCode::ParseError, format!("TOML parse error: {err}")).with_source(err)
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::new(
            ErrorCode::SerializationFailed,
            format!("TOML serialization error: {err}"),
        )
        .with_source(err)
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Attach context to the error, if any
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}
