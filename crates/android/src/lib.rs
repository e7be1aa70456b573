//! Android build descriptor loader
//!
//! This crate turns a declarative packaging descriptor into a build plan
//! for the Android Gradle Plugin:
//! - Option schema: recognized keys, value types and defaults
//! - Descriptor parsing from TOML or JSON documents
//! - Cross-field validation (SDK ordering, signing, dependencies)
//! - Plan emission as JSON, TOML or Gradle Kotlin DSL
//!
//! # Example
//!
//! ```rust,no_run
//! use buildplan_android::descriptor::SigningRegistry;
//! use buildplan_android::parser::{read_raw, InputFormat};
//! use buildplan_android::pipeline;
//!
//! let raw = read_raw(
//!     r#"
//! applicationId = "com.example.app"
//! minSdk = 21
//! targetSdk = 36
//! compileSdk = 36
//! signing = "debug"
//! "#,
//!     InputFormat::Toml,
//! )?;
//! let registry = SigningRegistry::new().with_identity("debug", "~/.android/debug.keystore");
//! let plan = pipeline::build_plan(&raw, &registry)?;
//! println!("{}", plan.to_json()?);
//! # Ok::<(), buildplan_core::Error>(())
//! ```

#![warn(missing_docs)]

pub mod descriptor;
pub mod error;
pub mod gradle;
pub mod parser;
pub mod pipeline;
pub mod plan;
pub mod schema;
pub mod validate;

pub use descriptor::{BuildDescriptor, SigningIdentity, SigningRegistry};
pub use error::{ParseError, ParseErrorKind, ValidationError, ValidationErrorKind};
pub use plan::{BuildPlan, PlanFormat};
