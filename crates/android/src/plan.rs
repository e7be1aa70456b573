//! Plan emitter
//!
//! Turns a validated descriptor into the normalized build plan handed to
//! Gradle. Emitting never runs the packaging tool.

use crate::descriptor::SigningIdentity;
use crate::gradle;
use crate::parser::RawConfig;
use crate::validate::ValidatedDescriptor;
use buildplan_core::{Error, ErrorCode, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Version of the plan document layout
pub const PLAN_FORMAT_VERSION: u32 = 1;

/// Normalized build plan for one packaging run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildPlan {
    /// Layout version, [`PLAN_FORMAT_VERSION`]
    pub format_version: u32,
    /// Gradle task producing the artifact (`assembleRelease`, `bundleDebug`, ...)
    pub gradle_task: String,
    /// Resolved signing identity
    pub signing: SigningIdentity,
    /// Descriptor fields under their option names, defaults made explicit
    pub descriptor: RawConfig,
}

/// Plan output syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanFormat {
    /// Pretty-printed JSON
    Json,
    /// TOML document
    Toml,
    /// Gradle Kotlin DSL fragment
    Gradle,
}

impl FromStr for PlanFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            "gradle" | "kts" => Ok(Self::Gradle),
            other => Err(Error::new(
                ErrorCode::InvalidConfigValue,
                format!("Unknown plan format: {other}"),
            )
            .with_suggestion("Use json, toml or gradle")),
        }
    }
}

impl fmt::Display for PlanFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Toml => "toml",
            Self::Gradle => "gradle",
        })
    }
}

/// Emit the build plan for a validated descriptor
pub fn emit(validated: &ValidatedDescriptor) -> BuildPlan {
    let descriptor = validated.descriptor();
    let plan = BuildPlan {
        format_version: PLAN_FORMAT_VERSION,
        gradle_task: gradle::task_name(descriptor.build_type, descriptor.artifact),
        signing: validated.signing_identity().clone(),
        descriptor: descriptor.to_raw(),
    };

    debug!(task = %plan.gradle_task, "Emitted build plan");
    plan
}

impl BuildPlan {
    /// Pretty-printed JSON document
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            Error::new(
                ErrorCode::SerializationFailed,
                format!("JSON serialization error: {e}"),
            )
            .with_source(e)
        })
    }

    /// TOML document
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Gradle Kotlin DSL `android { }` and `dependencies { }` blocks
    pub fn to_gradle(&self) -> Result<String> {
        gradle::render(self)
    }

    /// Serialize in the requested format
    pub fn render(&self, format: PlanFormat) -> Result<String> {
        match format {
            PlanFormat::Json => self.to_json(),
            PlanFormat::Toml => self.to_toml(),
            PlanFormat::Gradle => self.to_gradle(),
        }
    }

    /// Read back a JSON or TOML plan document
    pub fn from_document(content: &str, format: PlanFormat) -> Result<Self> {
        match format {
            PlanFormat::Json => Ok(serde_json::from_str(content)?),
            PlanFormat::Toml => Ok(toml::from_str(content)?),
            PlanFormat::Gradle => Err(Error::new(
                ErrorCode::UnsupportedFormat,
                "Gradle plans cannot be read back",
            )),
        }
    }
}
