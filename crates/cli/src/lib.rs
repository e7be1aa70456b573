//! CLI utilities for buildplan
//!
//! Provides shared CLI functionality:
//! - Status messages
//! - Error reporting (human and JSON)
//! - Value formatting

#![warn(missing_docs)]

pub mod output;
