//! Core utilities for buildplan
//!
//! This crate provides the functionality shared by the descriptor pipeline
//! and the command line front end:
//!
//! - **Error handling**: Errors with codes, context, and recovery suggestions
//! - **Exit codes**: One distinguishing process exit code per error category
//! - **Configuration**: TOML-based tool configuration (signing identities, output defaults)
//!
//! # Example
//!
//! ```rust,no_run
//! use buildplan_core::config::Config;
//!
//! let config = Config::load(None).expect("Invalid configuration");
//! for identity in &config.schema.signing.identities {
//!     println!("{} -> {}", identity.name, identity.key_ref);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;

pub use error::{Error, ErrorCode, Result, ResultExt};
